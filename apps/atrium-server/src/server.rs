//! Shared server state and the strict authorization helpers.

use std::sync::Arc;

use axum::http::HeaderMap;

use atrium_identity::{Claims, CredentialIssuer};
use atrium_storage::{Invitation, InviteCode, Profile, Store, StoreError, UserId};

use crate::config::ServerConfig;
use crate::cookies;
use crate::email::Mailer;
use crate::error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AtriumServer {
    pub store: Arc<dyn Store>,
    pub issuer: Arc<dyn CredentialIssuer>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub config: Arc<ServerConfig>,
}

/// Outcome of an eligibility check. `Ineligible` deliberately does not say
/// whether a code was missing or already used.
#[derive(Clone, Debug)]
pub enum Eligibility {
    /// A live invitation authorizes this signup.
    Invited(Invitation),
    /// The bootstrap admin address; no invitation record involved.
    AdminBypass,
    Ineligible,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Eligibility::Ineligible)
    }
}

impl AtriumServer {
    pub fn new(
        store: Arc<dyn Store>,
        issuer: Arc<dyn CredentialIssuer>,
        mailer: Option<Arc<dyn Mailer>>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            store,
            issuer,
            mailer,
            config,
        }
    }

    /// Cryptographically verify the session cookie and return its claims.
    ///
    /// This is the strict check. The access guard's presence-only test is a
    /// UX redirect, never an authorization boundary; every privileged
    /// operation goes through here.
    pub async fn require_session(&self, headers: &HeaderMap) -> Result<Claims, ApiError> {
        let token = cookies::session_token(headers).ok_or(ApiError::Unauthorized)?;
        Ok(self.issuer.verify_session_token(&token).await?)
    }

    /// Verify the session and require the caller's profile to carry the
    /// admin role.
    pub async fn require_admin(&self, headers: &HeaderMap) -> Result<(Claims, Profile), ApiError> {
        let claims = self.require_session(headers).await?;
        let profile = match self.store.get_profile(&UserId(claims.sub.clone())).await {
            Ok(profile) => profile,
            Err(StoreError::NotFound) => return Err(ApiError::Forbidden),
            Err(e) => return Err(e.into()),
        };
        if !profile.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok((claims, profile))
    }

    /// Eligibility of a signup code: the record must exist and be unused.
    /// Read-only; safe to poll from the signup page.
    pub async fn eligibility_by_code(&self, code: &InviteCode) -> Result<Eligibility, ApiError> {
        match self.store.get_invitation_by_code(code).await {
            Ok(invitation) if invitation.is_unused() => Ok(Eligibility::Invited(invitation)),
            Ok(_) | Err(StoreError::NotFound) => Ok(Eligibility::Ineligible),
            Err(e) => Err(e.into()),
        }
    }

    /// Eligibility of an email address. The bootstrap admin is checked
    /// before any invitation lookup.
    pub async fn eligibility_by_email(&self, email: &str) -> Result<Eligibility, ApiError> {
        if email.eq_ignore_ascii_case(&self.config.admin_email) {
            return Ok(Eligibility::AdminBypass);
        }
        match self.store.latest_invitation_by_email(email).await {
            Ok(invitation) if invitation.is_unused() => Ok(Eligibility::Invited(invitation)),
            Ok(_) | Err(StoreError::NotFound) => Ok(Eligibility::Ineligible),
            Err(e) => Err(e.into()),
        }
    }
}
