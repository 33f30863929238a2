use super::ports::AuthError;
use jsonwebtoken::{Algorithm, DecodingKey};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Verification key document served by the IdP `token_key` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenKey {
    #[serde(default)]
    pub alg: String,
    /// PEM-encoded public key, or the shared secret for HMAC keys
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub kty: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

/// A decoded key ready for JWT signature checks
#[derive(Clone)]
pub struct VerificationKey {
    pub algorithm: Algorithm,
    pub key: DecodingKey,
}

impl VerificationKey {
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Self {
        Self {
            algorithm,
            key: DecodingKey::from_secret(secret),
        }
    }

    pub fn rsa_pem(algorithm: Algorithm, pem: &[u8]) -> Result<Self, AuthError> {
        Ok(Self {
            algorithm,
            key: DecodingKey::from_rsa_pem(pem)
                .map_err(|e| AuthError::TokenKey(format!("Invalid RSA key: {e}")))?,
        })
    }
}

impl TokenKey {
    fn algorithm(&self) -> Result<Algorithm, AuthError> {
        // Older UAA releases report Java algorithm names
        match self.alg.as_str() {
            "" if self.value.starts_with("-----BEGIN") || self.n.is_some() => Ok(Algorithm::RS256),
            "" => Ok(Algorithm::HS256),
            "SHA256withRSA" => Ok(Algorithm::RS256),
            "HMACSHA256" => Ok(Algorithm::HS256),
            other => other
                .parse()
                .map_err(|_| AuthError::TokenKey(format!("Unsupported algorithm: {other}"))),
        }
    }

    pub fn to_verification_key(&self) -> Result<VerificationKey, AuthError> {
        let algorithm = self.algorithm()?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                if self.value.is_empty() {
                    return Err(AuthError::TokenKey("Retrieved token key is empty".into()));
                }
                Ok(VerificationKey::hmac(algorithm, self.value.as_bytes()))
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => {
                if !self.value.is_empty() {
                    return VerificationKey::rsa_pem(algorithm, self.value.as_bytes());
                }
                match (&self.n, &self.e) {
                    (Some(n), Some(e)) => Ok(VerificationKey {
                        algorithm,
                        key: DecodingKey::from_rsa_components(n, e).map_err(|e| {
                            AuthError::TokenKey(format!("Invalid RSA components: {e}"))
                        })?,
                    }),
                    _ => Err(AuthError::TokenKey("Retrieved token key is empty".into())),
                }
            }
            Algorithm::ES256 | Algorithm::ES384 => {
                if self.value.is_empty() {
                    return Err(AuthError::TokenKey("Retrieved token key is empty".into()));
                }
                Ok(VerificationKey {
                    algorithm,
                    key: DecodingKey::from_ec_pem(self.value.as_bytes())
                        .map_err(|e| AuthError::TokenKey(format!("Invalid EC key: {e}")))?,
                })
            }
            other => Err(AuthError::TokenKey(format!(
                "Unsupported algorithm: {other:?}"
            ))),
        }
    }
}

/// Lazily fetches the IdP signing key once and keeps it for the life of the process.
///
/// A failed fetch is not cached; the next caller retries.
pub struct TokenKeyProvider {
    url: String,
    http_client: Client,
    key: OnceCell<Arc<VerificationKey>>,
}

impl TokenKeyProvider {
    pub fn new(url: String, http_client: Client) -> Self {
        Self {
            url,
            http_client,
            key: OnceCell::new(),
        }
    }

    /// Provider with a pre-configured key that never contacts the IdP
    pub fn with_static_key(key: VerificationKey) -> Self {
        Self {
            url: String::new(),
            http_client: Client::new(),
            key: OnceCell::new_with(Some(Arc::new(key))),
        }
    }

    pub async fn get(&self) -> Result<Arc<VerificationKey>, AuthError> {
        self.key
            .get_or_try_init(|| self.fetch())
            .await
            .map(Arc::clone)
    }

    async fn fetch(&self) -> Result<Arc<VerificationKey>, AuthError> {
        debug!(url = %self.url, "Fetching token signing key");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Failed to fetch token key: {e}")))?;

        if !response.status().is_success() {
            error!(status = %response.status(), "Token key endpoint returned an error");
            return Err(AuthError::TokenKey(format!(
                "token_key returned status: {}",
                response.status()
            )));
        }

        let token_key: TokenKey = response.json().await.map_err(|e| {
            error!("Failed to parse token key: {}", e);
            AuthError::TokenKey(format!("Failed to parse token key: {e}"))
        })?;

        let key = token_key.to_verification_key()?;
        info!(alg = ?key.algorithm, "Retrieved token signing key");
        Ok(Arc::new(key))
    }
}
