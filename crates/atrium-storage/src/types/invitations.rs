//! Invitation types.

use chrono::{DateTime, Utc};

use super::{InviteCode, UserId};

/// Invitation record. Keyed by code; authorizes exactly one email address.
#[derive(Clone, Debug)]
pub struct Invitation {
    pub code: InviteCode,
    pub email: String,
    pub sent_at: DateTime<Utc>,
    pub sent_by: Option<UserId>, // None for server-created invitations
    pub used_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Redeemable until `used_at` is set.
    pub fn is_unused(&self) -> bool {
        self.used_at.is_none()
    }
}

/// Parameters for creating an invitation
#[derive(Clone, Debug)]
pub struct CreateInvitationParams {
    pub code: InviteCode,
    pub email: String,
    pub sent_by: Option<UserId>, // None for server-created invitations
}
