use super::{
    ports::{AccessTokenClaims, AuthError},
    token_key::TokenKeyProvider,
};
use jsonwebtoken::{decode, Validation};
use std::sync::Arc;
use tracing::debug;

/// Scopes that open the access page; either one is enough
pub const ACCESS_PAGE_SCOPES: &[&str] = &["test.access", "test.admin"];

/// Scopes that open the admin page
pub const ADMIN_PAGE_SCOPES: &[&str] = &["test.admin"];

/// Verifies IdP-issued access tokens against the IdP signing key
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<TokenKeyProvider>,
}

impl TokenVerifier {
    pub fn new(keys: Arc<TokenKeyProvider>) -> Self {
        Self { keys }
    }

    /// Check signature and expiry, returning the token claims.
    /// Audience is not checked: UAA puts resource ids there, not the client id.
    pub async fn verify(&self, access_token: &str) -> Result<AccessTokenClaims, AuthError> {
        let key = self.keys.get().await?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;

        let data = decode::<AccessTokenClaims>(access_token, &key.key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        debug!(scopes = ?data.claims.scope, "Access token verified");
        Ok(data.claims)
    }
}

/// True if the claims grant at least one of the desired scopes
pub fn has_scope(claims: &AccessTokenClaims, desired: &[&str]) -> bool {
    claims
        .scope
        .iter()
        .any(|scope| desired.contains(&scope.as_str()))
}
