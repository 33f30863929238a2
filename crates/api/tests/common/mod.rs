#![allow(dead_code)]

use api::{build_app, AppState};
use config::{AuthConfig, BackingServiceConfig, SessionConfig};
use httpmock::prelude::*;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use services::{
    auth::{OAuthManager, Profile, StoredToken, TokenKeyProvider, TokenVerifier, VerificationKey},
    BackingServiceClient, InMemorySessionStore, SessionData, SessionId, SessionStore,
};
use std::{sync::Arc, time::Duration};

pub const COOKIE_NAME: &str = "authcode_session";
pub const SHARED_SECRET: &[u8] = b"uaa-shared-signing-secret";
pub const RSA_PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa_private.pem");
pub const RSA_PUBLIC_KEY: &str = include_str!("../fixtures/test_rsa_public.pem");

pub struct TestApp {
    pub server: axum_test::TestServer,
    pub sessions: Arc<InMemorySessionStore>,
    /// Stands in for the IdP and the backing service
    pub idp: MockServer,
}

/// How the app obtains the token signing key
pub enum KeySource {
    Static(VerificationKey),
    /// Served by the mock IdP at /token_key
    Fetched,
}

pub fn hs256_key() -> VerificationKey {
    VerificationKey::hmac(Algorithm::HS256, SHARED_SECRET)
}

pub fn rs256_key() -> VerificationKey {
    VerificationKey::rsa_pem(Algorithm::RS256, RSA_PUBLIC_KEY.as_bytes()).unwrap()
}

pub fn auth_config(idp: &MockServer) -> AuthConfig {
    AuthConfig {
        client_id: "authcode-client".to_string(),
        client_secret: "authcode-secret".to_string(),
        auth_domain: idp.base_url(),
        callback_url: "http://localhost:8080/callback".to_string(),
        skip_tls_verify: false,
        scopes: vec![
            "openid".to_string(),
            "test.access".to_string(),
            "test.admin".to_string(),
        ],
    }
}

pub async fn setup_test_app(keys: KeySource) -> TestApp {
    setup_test_app_with_backing(keys, None).await
}

/// Same as `setup_test_app`, with the backing service at `backing_url` instead of the mock
pub async fn setup_test_app_with_backing(keys: KeySource, backing_url: Option<&str>) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::level_filters::LevelFilter::DEBUG)
        .try_init();

    let idp = MockServer::start_async().await;
    let auth = auth_config(&idp);

    let provider = match keys {
        KeySource::Static(key) => TokenKeyProvider::with_static_key(key),
        KeySource::Fetched => TokenKeyProvider::new(
            auth.token_key_url(),
            services::common::build_http_client(false).unwrap(),
        ),
    };

    let backing_service = BackingServiceClient::new(
        &BackingServiceConfig {
            url: backing_url
                .map(str::to_string)
                .unwrap_or_else(|| idp.url("/api/hello")),
        },
        false,
    )
    .unwrap();

    let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));

    let state = AppState {
        oauth: Arc::new(OAuthManager::new(&auth).unwrap()),
        sessions: sessions.clone(),
        verifier: TokenVerifier::new(Arc::new(provider)),
        backing_service: Arc::new(backing_service),
        session_config: Arc::new(SessionConfig::default()),
    };

    let server = axum_test::TestServer::new(build_app(state)).unwrap();

    TestApp {
        server,
        sessions,
        idp,
    }
}

fn claims(scopes: &[&str], exp_offset_secs: i64) -> serde_json::Value {
    json!({
        "jti": "0c0ffee",
        "sub": "user-id-1",
        "user_name": "marissa",
        "client_id": "authcode-client",
        "aud": ["openid", "test"],
        "scope": scopes,
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + exp_offset_secs,
    })
}

pub fn hs256_token(scopes: &[&str]) -> String {
    hs256_token_with(scopes, 3600, SHARED_SECRET)
}

pub fn hs256_token_with(scopes: &[&str], exp_offset_secs: i64, secret: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims(scopes, exp_offset_secs),
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

pub fn rs256_token(scopes: &[&str]) -> String {
    encode(
        &Header::new(Algorithm::RS256),
        &claims(scopes, 3600),
        &EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

pub fn test_profile() -> Profile {
    json!({
        "user_id": "user-id-1",
        "user_name": "marissa",
        "email": "marissa@test.org",
        "name": "Marissa Koala"
    })
    .as_object()
    .unwrap()
    .clone()
}

/// Put a logged-in session straight into the store and return the Cookie header value
pub async fn login_with_token(app: &TestApp, access_token: &str) -> String {
    let token = StoredToken {
        access_token: access_token.to_string(),
        token_type: "bearer".to_string(),
        refresh_token: None,
        expiry: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
    };
    let id = SessionId::new_random();
    app.sessions
        .store(&id, SessionData::new(&token, test_profile()).unwrap())
        .await
        .unwrap();
    format!("{COOKIE_NAME}={id}")
}

/// `name=value` part of the session Set-Cookie header
pub fn session_cookie_from(response: &axum_test::TestResponse) -> String {
    let header = response.header("set-cookie");
    let raw = header.to_str().unwrap();
    assert!(raw.starts_with(COOKIE_NAME), "unexpected cookie: {raw}");
    raw.split(';').next().unwrap().to_string()
}

pub fn assert_redirected_to(response: &axum_test::TestResponse, location: &str) {
    assert_eq!(response.status_code(), 303, "body: {}", response.text());
    assert_eq!(response.header("location"), location);
}
