// API Middleware
//
// Session-backed login check guarding the /protected pages.

pub mod session;

pub use session::{require_login, session_cookie, LoggedIn, LoginRejection};
