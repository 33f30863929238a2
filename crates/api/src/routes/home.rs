use crate::{pages, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};

/// Public landing page with the login link
pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(pages::home(state.oauth.login_url()))
}

pub async fn unauthorized() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, Html(pages::unauthorized()))
}
