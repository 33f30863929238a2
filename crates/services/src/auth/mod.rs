pub mod jwt;
pub mod oauth;
pub mod ports;
pub mod token_key;

pub use jwt::{has_scope, TokenVerifier, ACCESS_PAGE_SCOPES, ADMIN_PAGE_SCOPES};
pub use oauth::OAuthManager;
pub use ports::*;
pub use token_key::{TokenKey, TokenKeyProvider, VerificationKey};
