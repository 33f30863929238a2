use crate::{middleware::session::UNAUTHORIZED_PATH, middleware::LoggedIn, pages};
use axum::{
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use services::auth::{has_scope, ACCESS_PAGE_SCOPES, ADMIN_PAGE_SCOPES};
use tracing::warn;

/// Render `page` only when the token grants one of `required`
fn scope_gated(login: &LoggedIn, required: &[&str], page: fn() -> String) -> Response {
    if has_scope(&login.claims, required) {
        Html(page()).into_response()
    } else {
        warn!(
            granted = ?login.claims.scope,
            required = ?required,
            "Token lacks required scope"
        );
        Redirect::to(UNAUTHORIZED_PATH).into_response()
    }
}

/// Profile and granted scopes of the logged-in user
pub async fn user_page(Extension(login): Extension<LoggedIn>) -> Html<String> {
    Html(pages::user(&login.profile, &login.claims.scope))
}

pub async fn access_page(Extension(login): Extension<LoggedIn>) -> Response {
    scope_gated(&login, ACCESS_PAGE_SCOPES, pages::access)
}

pub async fn admin_page(Extension(login): Extension<LoggedIn>) -> Response {
    scope_gated(&login, ADMIN_PAGE_SCOPES, pages::admin)
}
