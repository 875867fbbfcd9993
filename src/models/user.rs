// src/models/user.rs
// DOCUMENTATION: Users, their profiles and the account forms
// PURPOSE: Credentials live on User, statistics and ranking on UserProfile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Upload;

/// Authentication record
/// DOCUMENTATION: Maps to the users table. Never serialized directly,
/// use `to_response()` so the hash and email stay server-side
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user statistics and ranking, one-to-one with User
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub city_count: i32,
    pub country_count: i32,
    /// -1 means unranked
    pub rank: i32,
    pub profile_picture: Option<String>,
    pub cover_picture: Option<String>,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A user together with their profile, as listed in search results
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub user: UserResponse,
    pub profile: UserProfile,
}

impl User {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Submitted sign-up fields
/// DOCUMENTATION: Absent keys and empty strings are both `None`,
/// see `handlers::forms::FormFields`
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<Upload>,
    pub cover_picture: Option<Upload>,
}

/// Submitted sign-in fields
#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Sign-up fields that passed every format rule
#[derive(Debug, Clone)]
pub struct SignUpDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub profile_picture: Option<Upload>,
    pub cover_picture: Option<Upload>,
}

/// Row data for creating a user and profile together
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub cover_picture: Option<String>,
}
