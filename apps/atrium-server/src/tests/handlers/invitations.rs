//! Invitation handler tests.

use axum::http::StatusCode;
use serde_json::json;

use atrium_storage::Role;

use crate::tests::common::*;

#[tokio::test]
async fn issue_requires_a_session() {
    let (server, _signer) = create_test_server().await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/invitations",
        None,
        json!({ "email": "a@x.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issue_rejects_a_garbage_cookie() {
    let (server, _signer) = create_test_server().await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/invitations",
        Some("__session=not-a-real-token"),
        json!({ "email": "a@x.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issue_requires_the_admin_role() {
    let (server, signer) = create_test_server().await;
    create_test_profile(&server, "member-1", "member@example.com", Role::Member).await;
    let cookie = session_cookie(&signer, "member-1", "member@example.com").await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/invitations",
        Some(&cookie),
        json!({ "email": "a@x.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn issue_requires_a_local_profile() {
    // A valid session whose subject has no stored profile cannot issue.
    let (server, signer) = create_test_server().await;
    let cookie = session_cookie(&signer, "ghost-1", "ghost@example.com").await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/invitations",
        Some(&cookie),
        json!({ "email": "a@x.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn issue_validates_the_email() {
    let (server, signer) = create_test_server().await;
    create_test_profile(&server, "admin-1", ADMIN_EMAIL, Role::Admin).await;
    let cookie = session_cookie(&signer, "admin-1", ADMIN_EMAIL).await;

    for body in [json!({}), json!({ "email": "" }), json!({ "email": "not-an-email" })] {
        let response = send_json(
            test_router(&server),
            "POST",
            "/api/invitations",
            Some(&cookie),
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn admin_issue_persists_a_retrievable_record() {
    let (server, signer) = create_test_server().await;
    create_test_profile(&server, "admin-1", ADMIN_EMAIL, Role::Admin).await;
    let cookie = session_cookie(&signer, "admin-1", ADMIN_EMAIL).await;

    let response = send_json(
        test_router(&server),
        "POST",
        "/api/invitations",
        Some(&cookie),
        json!({ "email": "A@X.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "ok": true }));

    // Lowercased on write, retrievable by email, unused, attributed.
    let invitation = server
        .store
        .latest_invitation_by_email("a@x.com")
        .await
        .unwrap();
    assert!(invitation.is_unused());
    assert_eq!(
        invitation.sent_by,
        Some(atrium_storage::UserId("admin-1".to_string()))
    );
}

#[tokio::test]
async fn check_unknown_code_is_ineligible() {
    let (server, _signer) = create_test_server().await;

    let response = send_get(
        test_router(&server),
        "/api/invitations/check?code=no-such-code",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "eligible": false }));
}

#[tokio::test]
async fn check_used_code_is_ineligible() {
    let (server, _signer) = create_test_server().await;
    let invitation = create_test_invitation(&server, "b@x.com").await;
    server
        .store
        .mark_invitation_used(&invitation.code)
        .await
        .unwrap();

    let response = send_get(
        test_router(&server),
        &format!("/api/invitations/check?code={}", invitation.code),
        None,
    )
    .await;

    // Indistinguishable from a code that never existed.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "eligible": false }));
}

#[tokio::test]
async fn check_live_code_reveals_the_bound_email() {
    let (server, _signer) = create_test_server().await;
    let invitation = create_test_invitation(&server, "c@x.com").await;

    let response = send_get(
        test_router(&server),
        &format!("/api/invitations/check?code={}", invitation.code),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "eligible": true, "email": "c@x.com" })
    );
}

#[tokio::test]
async fn admin_email_is_always_eligible() {
    // Zero invitation records; the bootstrap admin still passes.
    let (server, _signer) = create_test_server().await;

    let response = send_get(
        test_router(&server),
        &format!("/api/invitations/check?email={ADMIN_EMAIL}"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "eligible": true }));
}

#[tokio::test]
async fn check_requires_code_or_email() {
    let (server, _signer) = create_test_server().await;

    let response = send_get(test_router(&server), "/api/invitations/check", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
