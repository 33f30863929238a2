use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw userinfo profile as returned by the identity provider
pub type Profile = serde_json::Map<String, serde_json::Value>;

/// OAuth token as kept in the session, serialized to JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn to_json(&self) -> Result<String, AuthError> {
        serde_json::to_string(self)
            .map_err(|e| AuthError::InternalError(format!("Failed to serialize token: {e}")))
    }

    pub fn from_json(raw: &str) -> Result<Self, AuthError> {
        serde_json::from_str(raw)
            .map_err(|e| AuthError::InvalidToken(format!("Stored token is not valid JSON: {e}")))
    }
}

/// Claims of an IdP-issued access token.
///
/// Only `scope` and `exp` are typed; everything else is kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default, deserialize_with = "scope_list")]
    pub scope: Vec<String>,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Accepts both the JSON array form and the space-delimited string form of `scope`.
fn scope_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScopeClaim {
        List(Vec<String>),
        Delimited(String),
    }

    Ok(match Option::<ScopeClaim>::deserialize(deserializer)? {
        Some(ScopeClaim::List(scopes)) => scopes,
        Some(ScopeClaim::Delimited(scopes)) => {
            scopes.split_whitespace().map(str::to_string).collect()
        }
        None => Vec::new(),
    })
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    IdpError(String),

    #[error("Did not receive authcode from IdP")]
    MissingCode,

    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Token key error: {0}")]
    TokenKey(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
