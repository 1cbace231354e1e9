//! Feed post types.

use chrono::{DateTime, Utc};

use super::{PostId, UserId};

/// Feed post record
#[derive(Clone, Debug)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub description: String,
    pub likes: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a post
#[derive(Clone, Debug)]
pub struct CreatePostParams {
    pub author_id: UserId,
    pub title: String,
    pub description: String,
}
