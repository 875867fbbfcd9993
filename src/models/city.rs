// src/models/city.rs
// DOCUMENTATION: Core data structures for cities
// PURPOSE: City records, admin import DTO and autocomplete payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a complete city record from the database
/// DOCUMENTATION: Maps directly to the cities table
/// `rank` is derived from tourist_count by the ranking service (1 = most visited)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct City {
    /// Insertion-ordered identifier
    pub id: i64,

    /// Display name, unique
    pub name: String,

    /// Slug used in city page URLs
    pub url_name: String,

    pub country_name: String,

    /// Yearly tourist arrivals
    pub tourist_count: i64,

    /// Growth of tourist arrivals, in percent
    pub tourist_growth: f64,

    pub description: String,

    /// Popularity rank, -1 until first ranked
    pub rank: i32,

    pub created_at: DateTime<Utc>,
}

/// Request DTO for importing a city
/// DOCUMENTATION: Data transfer object for POST /admin/cities
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCityRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub country_name: String,

    #[validate(range(min = 0))]
    pub tourist_count: i64,

    #[serde(default)]
    pub tourist_growth: f64,

    #[serde(default)]
    pub description: String,
}

/// A validated city ready to insert
#[derive(Debug, Clone)]
pub struct NewCity {
    pub name: String,
    pub url_name: String,
    pub country_name: String,
    pub tourist_count: i64,
    pub tourist_growth: f64,
    pub description: String,
}

impl From<CreateCityRequest> for NewCity {
    fn from(req: CreateCityRequest) -> Self {
        NewCity {
            url_name: url_name_for(&req.name),
            name: req.name,
            country_name: req.country_name,
            tourist_count: req.tourist_count,
            tourist_growth: req.tourist_growth,
            description: req.description,
        }
    }
}

/// One autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub city: String,
    pub country: String,
}

impl City {
    pub fn to_suggestion(&self) -> CitySuggestion {
        CitySuggestion {
            city: self.name.clone(),
            country: self.country_name.clone(),
        }
    }
}

/// Derive the URL slug for a city name
/// - `"Paris"` → `"Paris"`
/// - `"New York"` → `"New_York"`
/// - `"  Rio   de Janeiro "` → `"Rio_de_Janeiro"`
pub fn url_name_for(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_name_replaces_whitespace_runs() {
        assert_eq!(url_name_for("Paris"), "Paris");
        assert_eq!(url_name_for("New York"), "New_York");
        assert_eq!(url_name_for("  Rio   de Janeiro "), "Rio_de_Janeiro");
    }

    #[test]
    fn test_create_request_validation() {
        let mut req = CreateCityRequest {
            name: "Lisbon".to_string(),
            country_name: "Portugal".to_string(),
            tourist_count: 3_500_000,
            tourist_growth: 4.2,
            description: String::new(),
        };
        assert!(req.validate().is_ok());

        req.tourist_count = -1;
        assert!(req.validate().is_err());

        req.tourist_count = 10;
        req.name = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_new_city_from_request_derives_slug() {
        let city: NewCity = CreateCityRequest {
            name: "Hong Kong".to_string(),
            country_name: "China".to_string(),
            tourist_count: 27_000_000,
            tourist_growth: 0.0,
            description: String::new(),
        }
        .into();
        assert_eq!(city.url_name, "Hong_Kong");
    }
}
