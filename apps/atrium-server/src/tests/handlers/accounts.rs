//! Signup completion tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use atrium_storage::{Role, UserId};

use crate::tests::common::*;

fn signup_body(id_token: &str, code: Option<&str>) -> Value {
    let mut body = json!({
        "idToken": id_token,
        "firstName": "Grace",
        "lastName": "Hopper",
        "classYear": 2018,
        "specialties": ["Backend"],
    });
    if let Some(code) = code {
        body["code"] = json!(code);
    }
    body
}

#[tokio::test]
async fn signup_with_a_live_code_creates_profile_and_redeems() {
    let (server, signer) = create_test_server().await;
    let invitation = create_test_invitation(&server, "grace@example.com").await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        signup_body(
            &assertion(&signer, "grace-1", "grace@example.com"),
            Some(&invitation.code.0),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookie_from_response(&response).starts_with("__session="));

    let profile = server
        .store
        .get_profile(&UserId("grace-1".to_string()))
        .await
        .unwrap();
    assert_eq!(profile.email, "grace@example.com");
    assert_eq!(profile.role, Role::Member);
    assert_eq!(profile.first_name, "Grace");

    let redeemed = server
        .store
        .get_invitation_by_code(&invitation.code)
        .await
        .unwrap();
    assert!(redeemed.used_at.is_some());
}

#[tokio::test]
async fn signup_requires_an_assertion() {
    let (server, _signer) = create_test_server().await;

    let missing = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        json!({ "firstName": "A", "lastName": "B", "classYear": 2020 }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let bogus = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        signup_body("garbage", None),
    )
    .await;
    assert_eq!(bogus.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_without_any_invitation_is_ineligible() {
    let (server, signer) = create_test_server().await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        signup_body(&assertion(&signer, "x-1", "x@example.com"), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await, json!({ "error": "ineligible" }));
}

#[tokio::test]
async fn signup_with_a_mismatched_email_is_ineligible() {
    let (server, signer) = create_test_server().await;
    let invitation = create_test_invitation(&server, "alice@example.com").await;

    // Authenticated as bob, holding alice's code.
    let response = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        signup_body(
            &assertion(&signer, "bob-1", "bob@example.com"),
            Some(&invitation.code.0),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The code survives the failed attempt.
    let untouched = server
        .store
        .get_invitation_by_code(&invitation.code)
        .await
        .unwrap();
    assert!(untouched.is_unused());
}

#[tokio::test]
async fn signup_without_code_falls_back_to_email_lookup() {
    let (server, signer) = create_test_server().await;
    let invitation = create_test_invitation(&server, "carol@example.com").await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        signup_body(&assertion(&signer, "carol-1", "carol@example.com"), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let redeemed = server
        .store
        .get_invitation_by_code(&invitation.code)
        .await
        .unwrap();
    assert!(redeemed.used_at.is_some());
}

#[tokio::test]
async fn the_bootstrap_admin_signs_up_with_no_invitation() {
    let (server, signer) = create_test_server().await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/accounts",
        None,
        signup_body(&assertion(&signer, "admin-1", ADMIN_EMAIL), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let profile = server
        .store
        .get_profile(&UserId("admin-1".to_string()))
        .await
        .unwrap();
    assert_eq!(profile.role, Role::Admin);
}

#[tokio::test]
async fn replayed_signup_with_a_used_code_conflicts() {
    let (server, signer) = create_test_server().await;
    let invitation = create_test_invitation(&server, "dave@example.com").await;
    let body = signup_body(
        &assertion(&signer, "dave-1", "dave@example.com"),
        Some(&invitation.code.0),
    );

    let first = send_json(test_router(&server), "POST", "/api/accounts", None, body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    // Same subject replays the completed signup: the profile write is an
    // idempotent replace, but redemption must lose with Conflict.
    let second = send_json(test_router(&server), "POST", "/api/accounts", None, body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_validates_profile_fields() {
    let (server, signer) = create_test_server().await;
    create_test_invitation(&server, "eve@example.com").await;
    let id_token = assertion(&signer, "eve-1", "eve@example.com");

    let blank_name = json!({
        "idToken": id_token.as_str(),
        "firstName": "  ",
        "lastName": "Moneypenny",
        "classYear": 2020,
    });
    let response = send_json(test_router(&server), "POST", "/api/accounts", None, blank_name).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bad_year = json!({
        "idToken": id_token.as_str(),
        "firstName": "Eve",
        "lastName": "Moneypenny",
        "classYear": 1847,
    });
    let response = send_json(test_router(&server), "POST", "/api/accounts", None, bad_year).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
