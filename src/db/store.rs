// src/db/store.rs
// DOCUMENTATION: Storage seam between workflows and persistence
// PURPOSE: One trait, implemented by PostgreSQL and by an in-memory store

use crate::errors::TravelogError;
use crate::models::*;

/// Everything the workflows need from persistence
/// DOCUMENTATION: Implementations must enforce the uniqueness rules themselves
/// (username, album name per profile, city name) and report a violation as
/// `TravelogError::Validation(ValidationError::UniquenessViolation(_))`,
/// so a pre-check in the workflow losing a race still fails cleanly.
/// Listing methods return rows in insertion (id) order unless stated otherwise.
#[allow(async_fn_in_trait)]
pub trait TravelogStore: Send + Sync + 'static {
    // --- users & profiles ---

    async fn find_user(&self, id: i64) -> Result<Option<User>, TravelogError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, TravelogError>;

    /// Create a user and its profile (city_count 0, country_count 0, rank -1) atomically
    async fn create_user_with_profile(
        &self,
        new_user: NewUser,
    ) -> Result<(User, UserProfile), TravelogError>;

    async fn find_profile_by_user(&self, user_id: i64)
        -> Result<Option<UserProfile>, TravelogError>;

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, TravelogError>;

    /// Rank profiles by city_count in one atomic step; profiles without
    /// cities are unranked. Returns how many ranks changed
    async fn rerank_profiles(&self) -> Result<usize, TravelogError>;

    /// Users whose username, first or last name contains `term`, case-insensitive
    async fn search_users(&self, term: &str) -> Result<Vec<ProfileSummary>, TravelogError>;

    async fn count_users(&self) -> Result<i64, TravelogError>;

    // --- cities ---

    async fn insert_city(&self, city: NewCity) -> Result<City, TravelogError>;

    /// Rank every city by tourist_count in one atomic step, so concurrent
    /// imports never leave ranks computed from a stale list.
    /// Returns how many ranks changed
    async fn rerank_cities(&self) -> Result<usize, TravelogError>;

    async fn find_city_by_url_name(&self, url_name: &str) -> Result<Option<City>, TravelogError>;

    /// Ranked cities, best rank first
    async fn popular_cities(&self, limit: usize) -> Result<Vec<City>, TravelogError>;

    /// Cities whose name contains `term`, case-insensitive, best rank first
    async fn search_cities(&self, term: &str) -> Result<Vec<City>, TravelogError>;

    /// Cities whose name starts with `prefix`, case-insensitive, best rank first
    async fn cities_with_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<City>, TravelogError>;

    async fn count_cities(&self) -> Result<i64, TravelogError>;

    // --- albums ---

    async fn find_album(&self, id: i64) -> Result<Option<Album>, TravelogError>;

    async fn albums_for_profile(&self, profile_id: i64) -> Result<Vec<Album>, TravelogError>;

    /// Whether `profile_id` already owns an album called `name`, ignoring `excluding`
    async fn album_name_taken(
        &self,
        profile_id: i64,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, TravelogError>;

    async fn insert_album(
        &self,
        profile_id: i64,
        record: AlbumRecord,
    ) -> Result<Album, TravelogError>;

    async fn update_album(&self, id: i64, record: AlbumRecord) -> Result<Album, TravelogError>;

    async fn delete_album(&self, id: i64) -> Result<(), TravelogError>;

    async fn count_albums(&self) -> Result<i64, TravelogError>;

    // --- logs ---

    /// Insert a log with its pictures and refresh the author's city and
    /// country counts, atomically
    async fn insert_log(&self, profile_id: i64, new_log: NewLog) -> Result<Log, TravelogError>;

    /// Logs of a city, newest first
    async fn logs_for_city(&self, city_id: i64) -> Result<Vec<LogDetail>, TravelogError>;

    /// Logs filed under an album, newest first
    async fn logs_for_album(&self, album_id: i64) -> Result<Vec<LogDetail>, TravelogError>;

    /// Logs written by a profile, newest first
    async fn logs_for_profile(&self, profile_id: i64) -> Result<Vec<LogDetail>, TravelogError>;

    async fn count_logs(&self) -> Result<i64, TravelogError>;
}

pub const USERNAME_TAKEN: &str = "That username is not available";
pub const ALBUM_NAME_TAKEN: &str = "You already have an album with the same name";
pub const CITY_EXISTS: &str = "A city with that name already exists";
