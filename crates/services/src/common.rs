use reqwest::{redirect, Client};
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Build the outbound HTTP client shared by the IdP and backing-service calls.
///
/// Redirects are never followed: the token endpoint must answer directly.
pub fn build_http_client(skip_tls_verify: bool) -> reqwest::Result<Client> {
    if skip_tls_verify {
        tracing::warn!("TLS certificate verification is disabled for outbound requests");
    }

    Client::builder()
        .danger_accept_invalid_certs(skip_tls_verify)
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
}
