use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use config::SessionConfig;
use services::{
    auth::{AccessTokenClaims, AuthError, Profile, StoredToken},
    session::SessionError,
    SessionId,
};
use tracing::{debug, warn};

pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Verified login state passed to protected handlers
#[derive(Clone, Debug)]
pub struct LoggedIn {
    pub token: StoredToken,
    pub claims: AccessTokenClaims,
    pub profile: Profile,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginRejection {
    #[error("no session cookie")]
    NoCookie,

    #[error("unknown or expired session {0}")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Token(#[from] AuthError),
}

/// Build the cookie that carries the session id
pub fn session_cookie(config: &SessionConfig, id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id.0.clone()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Re-derive the login from the session and verify the stored access token
pub async fn authenticate(state: &AppState, jar: &CookieJar) -> Result<LoggedIn, LoginRejection> {
    let session_id = jar
        .get(&state.session_config.cookie_name)
        .map(|cookie| SessionId(cookie.value().to_string()))
        .ok_or(LoginRejection::NoCookie)?;

    let data = state
        .sessions
        .load(&session_id)
        .await?
        .ok_or_else(|| LoginRejection::UnknownSession(session_id.clone()))?;

    let token = data.stored_token()?;
    let claims = state.verifier.verify(&token.access_token).await?;

    Ok(LoggedIn {
        token,
        claims,
        profile: data.profile.unwrap_or_default(),
    })
}

/// Middleware for /protected routes: no valid session token, no entry
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &jar).await {
        Ok(login) => {
            debug!(path = %request.uri().path(), "Session token verified");
            request.extensions_mut().insert(login);
            next.run(request).await
        }
        Err(reason) => {
            warn!(path = %request.uri().path(), %reason, "Rejecting protected request");
            Redirect::to(UNAUTHORIZED_PATH).into_response()
        }
    }
}
