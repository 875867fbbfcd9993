// src/models/album.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Upload;

/// A trip album owned by exactly one user profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Album {
    pub id: i64,
    pub user_profile_id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cover_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Submitted album fields, shared by create and update
#[derive(Debug, Clone, Default)]
pub struct AlbumForm {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cover_picture: Option<Upload>,
}

/// Album fields that passed every format rule
#[derive(Debug, Clone)]
pub struct AlbumDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cover_picture: Option<Upload>,
}

/// Column values written on insert / update
#[derive(Debug, Clone)]
pub struct AlbumRecord {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `None` on update keeps the stored picture
    pub cover_picture: Option<String>,
}

/// Parse a submitted date, leading zeros optional (`1900-1-1`)
pub fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
