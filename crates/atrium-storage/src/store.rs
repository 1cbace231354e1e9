//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait the server depends on.
///
/// Any durable keyed store with conditional-write support can satisfy this
/// contract; `mark_invitation_used` carries the at-most-once semantics.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Invitations ────────────────────────────────────

    /// Persist a new invitation (`used_at` starts absent).
    async fn put_invitation(
        &self,
        params: &CreateInvitationParams,
    ) -> Result<Invitation, StoreError>;

    /// Get an invitation by its code.
    async fn get_invitation_by_code(&self, code: &InviteCode) -> Result<Invitation, StoreError>;

    /// Get the most recently sent invitation for an email address.
    /// Older sibling invitations remain redeemable.
    async fn latest_invitation_by_email(&self, email: &str) -> Result<Invitation, StoreError>;

    /// Mark an invitation used. Must be a conditional write: fails with
    /// `Conflict` if `used_at` was already set at write time, so concurrent
    /// redemption of one code succeeds at most once.
    async fn mark_invitation_used(&self, code: &InviteCode) -> Result<(), StoreError>;

    /// List all invitations, most recent first.
    async fn list_invitations(&self) -> Result<Vec<Invitation>, StoreError>;

    // ───────────────────────────────────── Profiles ───────────────────────────────────────

    /// Create (or, for the same uid, replace) a member profile.
    /// Fails with `AlreadyExists` if the email belongs to another profile.
    async fn create_profile(&self, params: &CreateProfileParams) -> Result<Profile, StoreError>;

    /// Get a profile by principal id.
    async fn get_profile(&self, uid: &UserId) -> Result<Profile, StoreError>;

    /// List all member profiles.
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    // ───────────────────────────────────── Posts ──────────────────────────────────────────

    /// Create a feed post (returns the stored record).
    async fn create_post(&self, params: &CreatePostParams) -> Result<Post, StoreError>;

    /// List all posts, most recent first.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
}
