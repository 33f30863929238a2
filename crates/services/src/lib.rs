pub mod auth;
pub mod backing;
pub mod common;
pub mod session;

pub use auth::{AuthError, OAuthManager, TokenKeyProvider, TokenVerifier};
pub use backing::BackingServiceClient;
pub use session::{InMemorySessionStore, SessionData, SessionId, SessionStore};
