pub mod auth;
pub mod backing;
pub mod common;
pub mod home;
pub mod protected;
