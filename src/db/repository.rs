// src/db/repository.rs
// DOCUMENTATION: Database access layer - all SQL queries
// PURPOSE: PostgreSQL implementation of TravelogStore

use crate::db::store::{TravelogStore, ALBUM_NAME_TAKEN, CITY_EXISTS, USERNAME_TAKEN};
use crate::errors::{TravelogError, ValidationError};
use crate::models::*;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

/// Row for the user + profile join used by search
#[derive(Debug, FromRow)]
struct ProfileSummaryRow {
    pub user_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_id: i64,
    pub city_count: i32,
    pub country_count: i32,
    pub rank: i32,
    pub profile_picture: Option<String>,
    pub cover_picture: Option<String>,
}

impl ProfileSummaryRow {
    fn to_summary(self) -> ProfileSummary {
        ProfileSummary {
            user: UserResponse {
                id: self.user_id,
                username: self.username,
                first_name: self.first_name,
                last_name: self.last_name,
            },
            profile: UserProfile {
                id: self.profile_id,
                user_id: self.user_id,
                city_count: self.city_count,
                country_count: self.country_count,
                rank: self.rank,
                profile_picture: self.profile_picture,
                cover_picture: self.cover_picture,
            },
        }
    }
}

/// Row for the log listing join
#[derive(Debug, FromRow)]
struct LogDetailRow {
    pub id: i64,
    pub user_profile_id: i64,
    pub album_id: Option<i64>,
    pub city_id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub city_name: String,
    pub city_url_name: String,
    pub country_name: String,
}

impl LogDetailRow {
    fn into_detail(self, pictures: Vec<String>) -> LogDetail {
        LogDetail {
            log: Log {
                id: self.id,
                user_profile_id: self.user_profile_id,
                album_id: self.album_id,
                city_id: self.city_id,
                description: self.description,
                created_at: self.created_at,
            },
            username: self.username,
            city_name: self.city_name,
            city_url_name: self.city_url_name,
            country_name: self.country_name,
            pictures,
        }
    }
}

/// Map a sqlx error, turning unique-constraint violations into the
/// user-facing uniqueness message for that constraint
fn map_db_error(e: sqlx::Error, context: &str) -> TravelogError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            let message = match db.constraint() {
                Some("users_username_key") => USERNAME_TAKEN,
                Some("albums_profile_name_key") => ALBUM_NAME_TAKEN,
                _ => CITY_EXISTS,
            };
            log::debug!("{}: unique constraint violated ({:?})", context, db.constraint());
            return ValidationError::UniquenessViolation(message).into();
        }
    }
    log::error!("{}: {}", context, e);
    TravelogError::DatabaseError(e.to_string())
}

/// Escape LIKE wildcards so user input only matches literally
fn like_escape(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// PgStore: All database operations for the application
/// DOCUMENTATION: Uses query_as for type-safe SQL queries
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Logs matching `filter` (one bigint parameter), newest first, with pictures
    async fn log_details(&self, filter: &str, id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        let sql = format!(
            r#"
            SELECT l.id, l.user_profile_id, l.album_id, l.city_id, l.description, l.created_at,
                   u.username, c.name AS city_name, c.url_name AS city_url_name, c.country_name
            FROM logs l
            JOIN user_profiles p ON p.id = l.user_profile_id
            JOIN users u ON u.id = p.user_id
            JOIN cities c ON c.id = l.city_id
            WHERE {}
            ORDER BY l.created_at DESC, l.id DESC
            "#,
            filter
        );

        let rows = sqlx::query_as::<_, LogDetailRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to list logs"))?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let pictures: Vec<(i64, String)> = sqlx::query_as(
            "SELECT log_id, picture FROM log_pictures WHERE log_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to list log pictures"))?;

        let mut by_log: HashMap<i64, Vec<String>> = HashMap::new();
        for (log_id, picture) in pictures {
            by_log.entry(log_id).or_default().push(picture);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let pictures = by_log.remove(&row.id).unwrap_or_default();
                row.into_detail(pictures)
            })
            .collect())
    }

    async fn count(&self, sql: &str) -> Result<i64, TravelogError> {
        let (count,): (i64,) = sqlx::query_as(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Count query failed"))?;
        Ok(count)
    }
}

const CITY_COLUMNS: &str = "id, name, url_name, country_name, tourist_count, tourist_growth, description, rank, created_at";

impl TravelogStore for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, TravelogError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to fetch user"))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, TravelogError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to fetch user by username"))
    }

    /// Insert user and profile in one transaction
    async fn create_user_with_profile(
        &self,
        new_user: NewUser,
    ) -> Result<(User, UserProfile), TravelogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to open transaction"))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to create user"))?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, profile_picture, cover_picture)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&new_user.profile_picture)
        .bind(&new_user.cover_picture)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to create user profile"))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit user creation"))?;

        log::info!("Created user {} (id {})", user.username, user.id);
        Ok((user, profile))
    }

    async fn find_profile_by_user(
        &self,
        user_id: i64,
    ) -> Result<Option<UserProfile>, TravelogError> {
        sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to fetch user profile"))
    }

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, TravelogError> {
        sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to fetch user profile"))
    }

    async fn rerank_profiles(&self) -> Result<usize, TravelogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to open transaction"))?;

        // Blocks log inserts (which update counts) and other re-ranks until commit
        sqlx::query("LOCK TABLE user_profiles IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Failed to lock user_profiles"))?;

        let changed = sqlx::query(
            r#"
            UPDATE user_profiles AS p
            SET rank = r.rank
            FROM (
                SELECT id,
                       CASE WHEN city_count > 0
                            THEN (ROW_NUMBER() OVER (ORDER BY city_count > 0 DESC, city_count DESC, id ASC))::int
                            ELSE -1
                       END AS rank
                FROM user_profiles
            ) AS r
            WHERE p.id = r.id AND p.rank <> r.rank
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to update profile ranks"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit profile ranks"))?;

        Ok(changed as usize)
    }

    async fn search_users(&self, term: &str) -> Result<Vec<ProfileSummary>, TravelogError> {
        let rows = sqlx::query_as::<_, ProfileSummaryRow>(
            r#"
            SELECT
                u.id AS user_id, u.username, u.first_name, u.last_name,
                p.id AS profile_id, p.city_count, p.country_count, p.rank,
                p.profile_picture, p.cover_picture
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            WHERE u.username ILIKE $1 OR u.first_name ILIKE $1 OR u.last_name ILIKE $1
            ORDER BY u.id
            "#,
        )
        .bind(format!("%{}%", like_escape(term)))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "User search failed"))?;

        Ok(rows.into_iter().map(ProfileSummaryRow::to_summary).collect())
    }

    async fn count_users(&self) -> Result<i64, TravelogError> {
        self.count("SELECT COUNT(*) FROM users").await
    }

    async fn insert_city(&self, city: NewCity) -> Result<City, TravelogError> {
        let created = sqlx::query_as::<_, City>(&format!(
            r#"
            INSERT INTO cities (name, url_name, country_name, tourist_count, tourist_growth, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CITY_COLUMNS
        ))
        .bind(&city.name)
        .bind(&city.url_name)
        .bind(&city.country_name)
        .bind(city.tourist_count)
        .bind(city.tourist_growth)
        .bind(&city.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to create city"))?;

        log::info!("Created city {} (id {})", created.name, created.id);
        Ok(created)
    }

    async fn rerank_cities(&self) -> Result<usize, TravelogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to open transaction"))?;

        // Conflicts with inserts and with itself, so the ranking below
        // always sees every committed city
        sqlx::query("LOCK TABLE cities IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Failed to lock cities"))?;

        let changed = sqlx::query(
            r#"
            UPDATE cities AS c
            SET rank = r.rank
            FROM (
                SELECT id, (ROW_NUMBER() OVER (ORDER BY tourist_count DESC, id ASC))::int AS rank
                FROM cities
            ) AS r
            WHERE c.id = r.id AND c.rank <> r.rank
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to update city ranks"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit city ranks"))?;

        Ok(changed as usize)
    }

    async fn find_city_by_url_name(&self, url_name: &str) -> Result<Option<City>, TravelogError> {
        sqlx::query_as::<_, City>(&format!(
            "SELECT {} FROM cities WHERE url_name = $1",
            CITY_COLUMNS
        ))
        .bind(url_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to fetch city"))
    }

    async fn popular_cities(&self, limit: usize) -> Result<Vec<City>, TravelogError> {
        sqlx::query_as::<_, City>(&format!(
            "SELECT {} FROM cities WHERE rank > 0 ORDER BY rank ASC LIMIT $1",
            CITY_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to fetch popular cities"))
    }

    async fn search_cities(&self, term: &str) -> Result<Vec<City>, TravelogError> {
        let sql = format!(
            "SELECT {} FROM cities WHERE name ILIKE $1 ORDER BY (rank < 0), rank ASC, id ASC",
            CITY_COLUMNS
        );
        log::debug!("Executing city search: {}", sql);

        sqlx::query_as::<_, City>(&sql)
            .bind(format!("%{}%", like_escape(term)))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "City search failed"))
    }

    async fn cities_with_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<City>, TravelogError> {
        sqlx::query_as::<_, City>(&format!(
            "SELECT {} FROM cities WHERE name ILIKE $1 ORDER BY (rank < 0), rank ASC, id ASC LIMIT $2",
            CITY_COLUMNS
        ))
        .bind(format!("{}%", like_escape(prefix)))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "City autocomplete failed"))
    }

    async fn count_cities(&self) -> Result<i64, TravelogError> {
        self.count("SELECT COUNT(*) FROM cities").await
    }

    async fn find_album(&self, id: i64) -> Result<Option<Album>, TravelogError> {
        sqlx::query_as::<_, Album>("SELECT * FROM albums WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to fetch album"))
    }

    async fn albums_for_profile(&self, profile_id: i64) -> Result<Vec<Album>, TravelogError> {
        sqlx::query_as::<_, Album>(
            "SELECT * FROM albums WHERE user_profile_id = $1 ORDER BY start_date DESC, id DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to list albums"))
    }

    async fn album_name_taken(
        &self,
        profile_id: i64,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, TravelogError> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM albums
                WHERE user_profile_id = $1 AND name = $2
                  AND ($3::bigint IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(profile_id)
        .bind(name)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Album name check failed"))?;

        Ok(taken)
    }

    async fn insert_album(
        &self,
        profile_id: i64,
        record: AlbumRecord,
    ) -> Result<Album, TravelogError> {
        let album = sqlx::query_as::<_, Album>(
            r#"
            INSERT INTO albums (user_profile_id, name, start_date, end_date, cover_picture)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(&record.name)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.cover_picture)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to create album"))?;

        log::info!("Created album {} for profile {}", album.id, profile_id);
        Ok(album)
    }

    async fn update_album(&self, id: i64, record: AlbumRecord) -> Result<Album, TravelogError> {
        sqlx::query_as::<_, Album>(
            r#"
            UPDATE albums
            SET name = $1,
                start_date = $2,
                end_date = $3,
                cover_picture = COALESCE($4, cover_picture)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&record.name)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.cover_picture)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to update album"))?
        .ok_or_else(|| {
            log::warn!("Album not found for update: {}", id);
            TravelogError::NotFound(format!("album {}", id))
        })
    }

    async fn delete_album(&self, id: i64) -> Result<(), TravelogError> {
        let rows = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to delete album"))?
            .rows_affected();

        if rows == 0 {
            return Err(TravelogError::NotFound(format!("album {}", id)));
        }

        log::info!("Deleted album: {}", id);
        Ok(())
    }

    async fn count_albums(&self) -> Result<i64, TravelogError> {
        self.count("SELECT COUNT(*) FROM albums").await
    }

    /// Insert the log and its pictures, then recount the author's cities
    /// and countries, in one transaction
    async fn insert_log(&self, profile_id: i64, new_log: NewLog) -> Result<Log, TravelogError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to open transaction"))?;

        let log = sqlx::query_as::<_, Log>(
            r#"
            INSERT INTO logs (user_profile_id, album_id, city_id, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(new_log.album_id)
        .bind(new_log.city_id)
        .bind(&new_log.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to create log"))?;

        if !new_log.pictures.is_empty() {
            sqlx::query(
                "INSERT INTO log_pictures (log_id, picture) SELECT $1, UNNEST($2::text[])",
            )
            .bind(log.id)
            .bind(&new_log.pictures)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Failed to store log pictures"))?;
        }

        sqlx::query(
            r#"
            UPDATE user_profiles AS p
            SET city_count = s.city_count, country_count = s.country_count
            FROM (
                SELECT COUNT(DISTINCT l.city_id)::int AS city_count,
                       COUNT(DISTINCT c.country_name)::int AS country_count
                FROM logs l
                JOIN cities c ON c.id = l.city_id
                WHERE l.user_profile_id = $1
            ) AS s
            WHERE p.id = $1
            "#,
        )
        .bind(profile_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to update profile counts"))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit log"))?;

        log::info!("Created log {} for profile {}", log.id, profile_id);
        Ok(log)
    }

    async fn logs_for_city(&self, city_id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        self.log_details("l.city_id = $1", city_id).await
    }

    async fn logs_for_album(&self, album_id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        self.log_details("l.album_id = $1", album_id).await
    }

    async fn logs_for_profile(&self, profile_id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        self.log_details("l.user_profile_id = $1", profile_id).await
    }

    async fn count_logs(&self) -> Result<i64, TravelogError> {
        self.count("SELECT COUNT(*) FROM logs").await
    }
}
