use crate::{
    middleware::session_cookie,
    routes::common::error_response,
    AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use services::{auth::AuthError, SessionData, SessionId};
use tracing::{debug, error, warn};

/// Landing page after a successful login
pub const LOGGED_IN_PATH: &str = "/protected/user";

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Handle the IdP redirect: exchange the code, fetch the profile, store both in a
/// fresh session and send the user to the landing page.
pub async fn oauth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<OAuthCallback>,
) -> Response {
    if let Some(idp_error) = params.error.filter(|e| !e.is_empty()) {
        warn!(
            error = %idp_error,
            description = params.error_description.as_deref().unwrap_or(""),
            "IdP returned an error to the callback"
        );
        return error_response(StatusCode::BAD_REQUEST, AuthError::IdpError(idp_error).to_string());
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        error!("Callback received without an authorization code");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingCode.to_string(),
        );
    };

    let (token, profile) = match state.oauth.complete_login(code).await {
        Ok(result) => result,
        Err(e) => {
            error!("OAuth login failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let data = match SessionData::new(&token, profile) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to serialize token: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    // A login always gets a new session id; the pre-login one is dropped
    if let Some(previous) = jar.get(&state.session_config.cookie_name) {
        let previous = SessionId(previous.value().to_string());
        if let Err(e) = state.sessions.remove(&previous).await {
            warn!("Failed to drop previous session: {}", e);
        }
    }

    let session_id = SessionId::new_random();
    if let Err(e) = state.sessions.store(&session_id, data).await {
        error!("Failed to store session: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    debug!("Session created, redirecting to {}", LOGGED_IN_PATH);
    let jar = jar.add(session_cookie(&state.session_config, &session_id));
    (jar, Redirect::to(LOGGED_IN_PATH)).into_response()
}
