//! Session gateway: exchange a verified identity assertion for the session
//! cookie, and revoke it on logout.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use atrium_storage::{StoreError, UserId};

use crate::cookies;
use crate::error::ApiError;
use crate::server::AtriumServer;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub id_token: Option<String>,
}

pub async fn mint(
    State(server): State<AtriumServer>,
    Json(req): Json<MintRequest>,
) -> Result<Response, ApiError> {
    let id_token = req
        .id_token
        .as_deref()
        .ok_or_else(|| ApiError::InvalidInput("idToken required".to_string()))?;

    let claims = server.issuer.verify_assertion(id_token).await?;
    let email = claims.email.to_lowercase();

    // A returning identity-provider account with no local profile must still
    // hold a usable invitation (or be the bootstrap admin).
    match server.store.get_profile(&UserId(claims.sub.clone())).await {
        Ok(_) => {}
        Err(StoreError::NotFound) => {
            if !server.eligibility_by_email(&email).await?.is_eligible() {
                return Err(ApiError::Ineligible);
            }
        }
        Err(e) => return Err(e.into()),
    }

    let ttl = server.config.session_ttl;
    let token = server
        .issuer
        .mint_session_token(&claims.sub, &email, ttl)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookies::set_session_cookie(&token, ttl.num_seconds(), server.config.cookie_secure),
    );
    info!(sub = %claims.sub, "session minted");
    Ok((StatusCode::OK, headers, Json(serde_json::json!({ "ok": true }))).into_response())
}

/// Logout convenience: the cookie is cleared client-side. Tokens stay valid
/// until expiry; there is no server-side revocation list.
pub async fn revoke() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookies::clear_session_cookie());
    (StatusCode::OK, headers, Json(serde_json::json!({ "ok": true }))).into_response()
}
