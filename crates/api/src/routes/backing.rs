use crate::{middleware::LoggedIn, pages, routes::common::error_response, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension,
};
use tracing::error;

/// Call the secured backing service with the user's access token
pub async fn backing_service(
    State(state): State<AppState>,
    Extension(login): Extension<LoggedIn>,
) -> Response {
    match state.backing_service.hello(&login.token.access_token).await {
        Ok(payload) => Html(pages::backing_service(&payload)).into_response(),
        Err(e) => {
            error!(url = state.backing_service.url(), "Backing service call failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "COULD NOT ACCESS BACKING SERVICE",
            )
        }
    }
}
