use super::ports::{AuthError, Profile, StoredToken};
use crate::common::build_http_client;
use config::AuthConfig;
use oauth2::{
    basic::{BasicClient, BasicTokenResponse},
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, TokenResponse, TokenUrl,
};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

// Type alias for a fully configured OAuth client
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// Authorization-code client for the configured identity provider
pub struct OAuthManager {
    client: ConfiguredClient,
    http_client: Client,
    login_url: String,
    userinfo_url: String,
}

impl OAuthManager {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let http_client = build_http_client(config.skip_tls_verify)
            .map_err(|e| AuthError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Self::with_http_client(config, http_client)
    }

    fn with_http_client(config: &AuthConfig, http_client: Client) -> Result<Self, AuthError> {
        let auth_url = AuthUrl::new(config.authorize_endpoint())
            .map_err(|e| AuthError::ConfigError(format!("Invalid auth URL: {e}")))?;

        let token_url = TokenUrl::new(config.token_endpoint())
            .map_err(|e| AuthError::ConfigError(format!("Invalid token URL: {e}")))?;

        let redirect_url = RedirectUrl::new(config.callback_url.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid redirect URL: {e}")))?;

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let scope = config.scopes.join(" ");
        let login_url = Url::parse_with_params(
            &config.authorize_endpoint(),
            &[
                ("client_id", config.client_id.as_str()),
                ("redirect_uri", config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| AuthError::ConfigError(format!("Invalid auth URL: {e}")))?
        .to_string();

        Ok(Self {
            client,
            http_client,
            login_url,
            userinfo_url: config.userinfo_endpoint(),
        })
    }

    /// Link that starts the authorization-code flow at the IdP
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Exchange an authorization code for a token at the IdP token endpoint
    pub async fn exchange_code(&self, code: String) -> Result<StoredToken, AuthError> {
        debug!("Exchanging authorization code for token");

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::OAuthError(format!("Token exchange failed: {e}")))?;

        Ok(stored_token(&token))
    }

    /// Fetch the userinfo profile for a freshly issued access token
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AuthError> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Failed to fetch userinfo: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(AuthError::InvalidProfile(format!(
                "userinfo returned status: {status}, body: {body}"
            )));
        }

        match response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AuthError::InvalidProfile(format!("Failed to parse userinfo: {e}")))?
        {
            serde_json::Value::Object(profile) => Ok(profile),
            other => Err(AuthError::InvalidProfile(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Run the full callback exchange: code for token, then token for profile
    pub async fn complete_login(&self, code: String) -> Result<(StoredToken, Profile), AuthError> {
        let token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&token.access_token).await?;

        info!(
            user = profile
                .get("user_name")
                .or_else(|| profile.get("email"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown"),
            "User authenticated"
        );
        Ok((token, profile))
    }
}

fn stored_token(token: &BasicTokenResponse) -> StoredToken {
    StoredToken {
        access_token: token.access_token().secret().to_string(),
        token_type: token.token_type().as_ref().to_string(),
        refresh_token: token.refresh_token().map(|t| t.secret().to_string()),
        expiry: token
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| chrono::Utc::now() + d),
    }
}
