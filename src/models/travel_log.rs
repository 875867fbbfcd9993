// src/models/travel_log.rs
// DOCUMENTATION: Travel logs: a visit to a catalogue city, optionally filed
// under one of the author's albums, with pictures
// PURPOSE: Logs feed the profile's city and country counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Upload;

/// Most pictures a single log may carry
pub const MAX_LOG_PICTURES: usize = 10;

/// Longest accepted log description, in characters
pub const MAX_LOG_DESCRIPTION: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Log {
    pub id: i64,
    pub user_profile_id: i64,
    /// Cleared when the album is deleted
    pub album_id: Option<i64>,
    pub city_id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A log as shown on city, album and user pages
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogDetail {
    #[serde(flatten)]
    pub log: Log,
    pub username: String,
    pub city_name: String,
    pub city_url_name: String,
    pub country_name: String,
    pub pictures: Vec<String>,
}

/// Submitted log fields
/// `album` is the raw select value; `"None"` means no album
#[derive(Debug, Clone, Default)]
pub struct LogForm {
    pub location: Option<String>,
    pub description: Option<String>,
    pub album: Option<String>,
    pub pictures: Vec<Upload>,
}

/// Log fields that passed every format rule
#[derive(Debug, Clone)]
pub struct LogDraft {
    pub city_name: String,
    pub country_name: String,
    pub description: String,
    pub album_id: Option<i64>,
    pub pictures: Vec<Upload>,
}

/// Column values written on insert
#[derive(Debug, Clone)]
pub struct NewLog {
    pub album_id: Option<i64>,
    pub city_id: i64,
    pub description: String,
    pub pictures: Vec<String>,
}

/// Split `"City, Country"` into its two parts
/// - `"London, United Kingdom"` → `("London", "United Kingdom")`
/// - `"Washington, D.C., United States"` → `("Washington, D.C.", "United States")`
pub fn split_location(raw: &str) -> Option<(&str, &str)> {
    let (city, country) = raw.rsplit_once(',')?;
    let (city, country) = (city.trim(), country.trim());
    if city.is_empty() || country.is_empty() {
        return None;
    }
    Some((city, country))
}

/// Album select value: absent or `"None"` is no album
pub fn parse_album_choice(raw: Option<&str>) -> Result<Option<i64>, ()> {
    match raw {
        None | Some("None") => Ok(None),
        Some(id) => id.trim().parse().map(Some).map_err(|_| ()),
    }
}
