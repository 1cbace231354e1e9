//! Member profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Community role stored on a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Member profile record
#[derive(Clone, Debug)]
pub struct Profile {
    pub uid: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub class_year: i32,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture_url: Option<String>,
    pub company_ids: Vec<String>,
    pub specialties: Vec<String>,
    pub role: Role,
    pub email_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a profile at signup
#[derive(Clone, Debug)]
pub struct CreateProfileParams {
    pub uid: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub class_year: i32,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture_url: Option<String>,
    pub company_ids: Vec<String>,
    pub specialties: Vec<String>,
    pub role: Role,
    pub email_notifications: bool,
}
