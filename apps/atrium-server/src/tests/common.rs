//! Common test helpers and utilities for server tests.
//!
//! This module provides shared test infrastructure including:
//! - Test server creation (in-memory SQLite, fresh signing key, no mailer)
//! - Profile and invitation seeding helpers
//! - Assertion/session-cookie minting for authenticated tests
//! - One-shot request plumbing through the router

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use atrium_identity::{CredentialIssuer, TokenSigner};
use atrium_storage::{
    CreateInvitationParams, CreateProfileParams, Invitation, InviteCode, MockStore, Profile, Role,
    UserId,
};
use atrium_store_sqlite::SqliteStore;

use crate::config::ServerConfig;
use crate::handlers;
use crate::server::AtriumServer;

pub const ADMIN_EMAIL: &str = "founder@example.com";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        admin_email: ADMIN_EMAIL.to_string(),
        app_url: "http://localhost:3000".to_string(),
        session_ttl: Duration::days(5),
        cookie_secure: false,
        session_key: None,
        email: None,
    }
}

/// Test helper: create an AtriumServer with in-memory SQLite and a fresh
/// signing key. Returns the signer too so tests can mint credentials.
pub async fn create_test_server() -> (AtriumServer, Arc<TokenSigner>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let signer = Arc::new(TokenSigner::generate());
    let server = AtriumServer::new(store, signer.clone(), None, Arc::new(test_config()));
    (server, signer)
}

/// Test helper: create an AtriumServer over a mocked store.
pub fn create_mock_server(store: MockStore) -> (AtriumServer, Arc<TokenSigner>) {
    let signer = Arc::new(TokenSigner::generate());
    let server = AtriumServer::new(
        Arc::new(store),
        signer.clone(),
        None,
        Arc::new(test_config()),
    );
    (server, signer)
}

pub fn test_router(server: &AtriumServer) -> Router {
    handlers::router(server.clone())
}

/// Mint an identity assertion for a test subject.
pub fn assertion(signer: &TokenSigner, sub: &str, email: &str) -> String {
    signer.mint_assertion(sub, email, Duration::minutes(5))
}

/// Mint a session cookie header value for a test subject.
pub async fn session_cookie(signer: &TokenSigner, sub: &str, email: &str) -> String {
    let token = signer
        .mint_session_token(sub, email, Duration::days(1))
        .await
        .unwrap();
    format!("__session={token}")
}

/// Test helper: seed a profile directly in the store.
pub async fn create_test_profile(
    server: &AtriumServer,
    uid: &str,
    email: &str,
    role: Role,
) -> Profile {
    server
        .store
        .create_profile(&CreateProfileParams {
            uid: UserId(uid.to_string()),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            class_year: 2020,
            bio: None,
            phone_number: None,
            profile_picture_url: None,
            company_ids: vec![],
            specialties: vec![],
            role,
            email_notifications: true,
        })
        .await
        .unwrap()
}

/// Test helper: seed an invitation directly in the store.
pub async fn create_test_invitation(server: &AtriumServer, email: &str) -> Invitation {
    server
        .store
        .put_invitation(&CreateInvitationParams {
            code: InviteCode::generate(),
            email: email.to_string(),
            sent_by: Some(UserId("admin-1".to_string())),
        })
        .await
        .unwrap()
}

/// One-shot a JSON request through the router.
pub async fn send_json(
    router: Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    router.oneshot(request).await.unwrap()
}

/// One-shot a GET request through the router.
pub async fn send_get(router: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::empty()).unwrap();
    router.oneshot(request).await.unwrap()
}

/// Decode a JSON response body.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the session cookie value from a Set-Cookie response header.
pub fn cookie_from_response(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie name=value pair")
        .to_string()
}
