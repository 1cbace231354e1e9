//! Invitation handlers: issue (admin-only) and the eligibility probe.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use atrium_storage::{CreateInvitationParams, InviteCode, UserId};

use crate::email::templates::InvitationEmail;
use crate::error::ApiError;
use crate::server::{AtriumServer, Eligibility};

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

pub async fn issue(
    State(server): State<AtriumServer>,
    headers: HeaderMap,
    Json(req): Json<IssueRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let (claims, _admin) = server.require_admin(&headers).await?;

    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Email required".to_string()))?
        .to_lowercase();
    if !is_plausible_email(&email) {
        return Err(ApiError::InvalidInput("Invalid email address".to_string()));
    }

    let code = InviteCode::generate();
    let invitation = server
        .store
        .put_invitation(&CreateInvitationParams {
            code: code.clone(),
            email,
            sent_by: Some(UserId(claims.sub.clone())),
        })
        .await?;

    // The record is durable at this point; delivery must not unwind it.
    dispatch_invitation_email(&server, &invitation.email, &code);

    info!(email = %invitation.email, sent_by = %claims.sub, "invitation issued");
    Ok(Json(OkResponse { ok: true }))
}

/// Fire-and-forget delivery. Failures are logged, never surfaced to the
/// admin caller.
fn dispatch_invitation_email(server: &AtriumServer, to: &str, code: &InviteCode) {
    let signup_link = format!("{}/signup?code={}", server.config.app_url, code);
    let Some(mailer) = server.mailer.clone() else {
        info!(%to, %signup_link, "no email provider configured; invitation link logged only");
        return;
    };
    let to = to.to_string();
    tokio::spawn(async move {
        let content = InvitationEmail::new(&signup_link);
        if let Err(e) = mailer.send(&to, &content.subject, &content.html).await {
            warn!(%to, error = %e, "failed to send invitation email");
        }
    });
}

fn is_plausible_email(email: &str) -> bool {
    // Light syntactic gate; real validation is delivery.
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub code: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Eligibility probe for the signup page. Idempotent, safe to poll on
/// reload; "no such code" and "already used" are the same answer.
pub async fn check(
    State(server): State<AtriumServer>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    let eligibility = match (&query.code, &query.email) {
        (Some(code), _) => {
            server
                .eligibility_by_code(&InviteCode(code.clone()))
                .await?
        }
        (None, Some(email)) => server.eligibility_by_email(&email.to_lowercase()).await?,
        (None, None) => {
            return Err(ApiError::InvalidInput("code or email required".to_string()))
        }
    };

    Ok(Json(match eligibility {
        Eligibility::Invited(invitation) => CheckResponse {
            eligible: true,
            email: Some(invitation.email),
        },
        Eligibility::AdminBypass => CheckResponse {
            eligible: true,
            email: None,
        },
        Eligibility::Ineligible => CheckResponse {
            eligible: false,
            email: None,
        },
    }))
}
