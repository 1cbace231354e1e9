//! Signup completion: create the member profile and redeem the invitation.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use atrium_storage::{CreateProfileParams, InviteCode, Role, StoreError, UserId};

use crate::cookies;
use crate::error::ApiError;
use crate::server::{AtriumServer, Eligibility};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub id_token: Option<String>,
    /// Invitation code from the signup link. Falls back to an email lookup
    /// when absent (profile-completion path after a provider login).
    pub code: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub class_year: i32,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub company_ids: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default = "default_email_notifications")]
    pub email_notifications: bool,
}

fn default_email_notifications() -> bool {
    true
}

pub async fn signup(
    State(server): State<AtriumServer>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let id_token = req
        .id_token
        .as_deref()
        .ok_or_else(|| ApiError::InvalidInput("idToken required".to_string()))?;
    let claims = server.issuer.verify_assertion(id_token).await?;
    let email = claims.email.to_lowercase();

    validate(&req)?;

    // Bootstrap admin bypasses invitations entirely, before any lookup.
    let eligibility = if email.eq_ignore_ascii_case(&server.config.admin_email) {
        Eligibility::AdminBypass
    } else {
        match &req.code {
            Some(code) => server.eligibility_by_code(&InviteCode(code.clone())).await?,
            None => server.eligibility_by_email(&email).await?,
        }
    };

    let (role, redeem) = match eligibility {
        Eligibility::AdminBypass => (Role::Admin, None),
        Eligibility::Invited(invitation) => {
            // The code is bound to one address; the authenticated identity
            // must match it.
            if !invitation.email.eq_ignore_ascii_case(&email) {
                return Err(ApiError::Ineligible);
            }
            (Role::Member, Some(invitation.code))
        }
        Eligibility::Ineligible => return Err(ApiError::Ineligible),
    };

    let profile = server
        .store
        .create_profile(&CreateProfileParams {
            uid: UserId(claims.sub.clone()),
            email: email.clone(),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            class_year: req.class_year,
            bio: req.bio.filter(|b| !b.is_empty()),
            phone_number: req.phone_number.filter(|p| !p.is_empty()),
            profile_picture_url: req.profile_picture_url,
            company_ids: req.company_ids,
            specialties: req.specialties,
            role,
            email_notifications: req.email_notifications,
        })
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists => {
                ApiError::InvalidInput("Email already registered".to_string())
            }
            other => other.into(),
        })?;

    // Redeem exactly once, now that the profile is durable. A concurrent
    // signup racing on the same code loses here with Conflict; the profile
    // write is not rolled back.
    if let Some(code) = redeem {
        match server.store.mark_invitation_used(&code).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => return Err(ApiError::Conflict),
            Err(StoreError::NotFound) => return Err(ApiError::Ineligible),
            Err(e) => return Err(e.into()),
        }
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
    info!(uid = %profile.uid, role = ?profile.role, "account created");
    Ok((StatusCode::OK, headers, Json(serde_json::json!({ "ok": true }))).into_response())
}

fn validate(req: &SignupRequest) -> Result<(), ApiError> {
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "First and last name required".to_string(),
        ));
    }
    if !(1900..=2100).contains(&req.class_year) {
        return Err(ApiError::InvalidInput("Invalid class year".to_string()));
    }
    Ok(())
}
