pub mod middleware;
pub mod pages;
pub mod routes;

use crate::{
    middleware::require_login,
    routes::{
        auth::oauth_callback,
        backing::backing_service,
        home::{home, unauthorized},
        protected::{access_page, admin_page, user_page},
    },
};
use axum::{middleware::from_fn_with_state, routing::get, Router};
use config::{ApiConfig, SessionConfig};
use services::{
    auth::{OAuthManager, TokenKeyProvider, TokenVerifier},
    common::build_http_client,
    BackingServiceClient, InMemorySessionStore, SessionStore,
};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<OAuthManager>,
    pub sessions: Arc<dyn SessionStore>,
    pub verifier: TokenVerifier,
    pub backing_service: Arc<BackingServiceClient>,
    pub session_config: Arc<SessionConfig>,
}

/// Wire up services from configuration
pub fn init_app_state(config: &ApiConfig) -> anyhow::Result<AppState> {
    let oauth = OAuthManager::new(&config.auth)?;
    tracing::info!(domain = %config.auth.auth_domain, "OAuth client configured");

    let key_client = build_http_client(config.auth.skip_tls_verify)?;
    let keys = TokenKeyProvider::new(config.auth.token_key_url(), key_client);

    let backing_service =
        BackingServiceClient::new(&config.backing_service, config.auth.skip_tls_verify)?;

    let sessions = InMemorySessionStore::new(Duration::from_secs(config.session.lifetime_secs));

    Ok(AppState {
        oauth: Arc::new(oauth),
        sessions: Arc::new(sessions),
        verifier: TokenVerifier::new(Arc::new(keys)),
        backing_service: Arc::new(backing_service),
        session_config: Arc::new(config.session.clone()),
    })
}

/// Build the application router
pub fn build_app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/user", get(user_page))
        .route("/access", get(access_page))
        .route("/admin", get(admin_page))
        .route("/backing", get(backing_service))
        .layer(from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/", get(home))
        .route("/callback", get(oauth_callback))
        .route("/unauthorized", get(unauthorized))
        .nest("/protected", protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
