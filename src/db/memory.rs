// src/db/memory.rs
// DOCUMENTATION: In-memory implementation of TravelogStore
// PURPOSE: STORAGE_BACKEND=memory and tests; uniqueness checks and inserts
// happen under a single write lock, like the table constraints in Postgres

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::store::{TravelogStore, ALBUM_NAME_TAKEN, CITY_EXISTS, USERNAME_TAKEN};
use crate::errors::{TravelogError, ValidationError};
use crate::models::*;
use crate::services::ranking::assign_ranks;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, UserProfile>,
    cities: BTreeMap<i64, City>,
    albums: BTreeMap<i64, Album>,
    logs: BTreeMap<i64, Log>,
    /// Picture paths per log id
    log_pictures: BTreeMap<i64, Vec<String>>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn log_detail(&self, log: &Log) -> Option<LogDetail> {
        let profile = self.profiles.get(&log.user_profile_id)?;
        let user = self.users.get(&profile.user_id)?;
        let city = self.cities.get(&log.city_id)?;

        Some(LogDetail {
            log: log.clone(),
            username: user.username.clone(),
            city_name: city.name.clone(),
            city_url_name: city.url_name.clone(),
            country_name: city.country_name.clone(),
            pictures: self.log_pictures.get(&log.id).cloned().unwrap_or_default(),
        })
    }

    /// Newest first
    fn log_details(&self, keep: impl Fn(&Log) -> bool) -> Vec<LogDetail> {
        self.logs
            .values()
            .rev()
            .filter(|l| keep(l))
            .filter_map(|l| self.log_detail(l))
            .collect()
    }
}

/// Thread-safe store backed by ordered maps
/// DOCUMENTATION: BTreeMap keys are allocated ids, so iteration is insertion order
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn by_rank(mut cities: Vec<City>) -> Vec<City> {
    cities.sort_by_key(|c| (c.rank < 1, c.rank, c.id));
    cities
}

impl TravelogStore for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, TravelogError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, TravelogError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user_with_profile(
        &self,
        new_user: NewUser,
    ) -> Result<(User, UserProfile), TravelogError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(ValidationError::UniquenessViolation(USERNAME_TAKEN).into());
        }

        let user = User {
            id: state.allocate_id(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            created_at: Utc::now(),
        };
        let profile = UserProfile {
            id: state.allocate_id(),
            user_id: user.id,
            city_count: 0,
            country_count: 0,
            rank: -1,
            profile_picture: new_user.profile_picture,
            cover_picture: new_user.cover_picture,
        };

        state.users.insert(user.id, user.clone());
        state.profiles.insert(profile.id, profile.clone());

        log::info!("Created user {} (id {})", user.username, user.id);
        Ok((user, profile))
    }

    async fn find_profile_by_user(
        &self,
        user_id: i64,
    ) -> Result<Option<UserProfile>, TravelogError> {
        let state = self.state.read().await;
        Ok(state.profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, TravelogError> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn rerank_profiles(&self) -> Result<usize, TravelogError> {
        let mut state = self.state.write().await;

        let entries: Vec<_> = state
            .profiles
            .values()
            .map(|p| {
                let metric = (p.city_count > 0).then_some(p.city_count as i64);
                (p.id, metric, p.rank)
            })
            .collect();
        let changes = assign_ranks(&entries);

        for (id, rank) in &changes {
            if let Some(profile) = state.profiles.get_mut(id) {
                profile.rank = *rank;
            }
        }
        Ok(changes.len())
    }

    async fn search_users(&self, term: &str) -> Result<Vec<ProfileSummary>, TravelogError> {
        let needle = term.to_lowercase();
        let state = self.state.read().await;

        let summaries = state
            .users
            .values()
            .filter(|u| {
                contains_ci(&u.username, &needle)
                    || contains_ci(&u.first_name, &needle)
                    || contains_ci(&u.last_name, &needle)
            })
            .filter_map(|u| {
                state
                    .profiles
                    .values()
                    .find(|p| p.user_id == u.id)
                    .map(|p| ProfileSummary {
                        user: u.to_response(),
                        profile: p.clone(),
                    })
            })
            .collect();

        Ok(summaries)
    }

    async fn count_users(&self) -> Result<i64, TravelogError> {
        Ok(self.state.read().await.users.len() as i64)
    }

    async fn insert_city(&self, city: NewCity) -> Result<City, TravelogError> {
        let mut state = self.state.write().await;

        if state
            .cities
            .values()
            .any(|c| c.name == city.name || c.url_name == city.url_name)
        {
            return Err(ValidationError::UniquenessViolation(CITY_EXISTS).into());
        }

        let created = City {
            id: state.allocate_id(),
            name: city.name,
            url_name: city.url_name,
            country_name: city.country_name,
            tourist_count: city.tourist_count,
            tourist_growth: city.tourist_growth,
            description: city.description,
            rank: -1,
            created_at: Utc::now(),
        };
        state.cities.insert(created.id, created.clone());

        log::info!("Created city {} (id {})", created.name, created.id);
        Ok(created)
    }

    async fn rerank_cities(&self) -> Result<usize, TravelogError> {
        let mut state = self.state.write().await;

        let entries: Vec<_> = state
            .cities
            .values()
            .map(|c| (c.id, Some(c.tourist_count), c.rank))
            .collect();
        let changes = assign_ranks(&entries);

        for (id, rank) in &changes {
            if let Some(city) = state.cities.get_mut(id) {
                city.rank = *rank;
            }
        }
        Ok(changes.len())
    }

    async fn find_city_by_url_name(&self, url_name: &str) -> Result<Option<City>, TravelogError> {
        let state = self.state.read().await;
        Ok(state.cities.values().find(|c| c.url_name == url_name).cloned())
    }

    async fn popular_cities(&self, limit: usize) -> Result<Vec<City>, TravelogError> {
        let state = self.state.read().await;
        let ranked = state.cities.values().filter(|c| c.rank > 0).cloned().collect();
        Ok(by_rank(ranked).into_iter().take(limit).collect())
    }

    async fn search_cities(&self, term: &str) -> Result<Vec<City>, TravelogError> {
        let needle = term.to_lowercase();
        let state = self.state.read().await;
        let matches = state
            .cities
            .values()
            .filter(|c| contains_ci(&c.name, &needle))
            .cloned()
            .collect();
        Ok(by_rank(matches))
    }

    async fn cities_with_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<City>, TravelogError> {
        let needle = prefix.to_lowercase();
        let state = self.state.read().await;
        let matches = state
            .cities
            .values()
            .filter(|c| c.name.to_lowercase().starts_with(&needle))
            .cloned()
            .collect();
        Ok(by_rank(matches).into_iter().take(limit).collect())
    }

    async fn count_cities(&self) -> Result<i64, TravelogError> {
        Ok(self.state.read().await.cities.len() as i64)
    }

    async fn find_album(&self, id: i64) -> Result<Option<Album>, TravelogError> {
        Ok(self.state.read().await.albums.get(&id).cloned())
    }

    async fn albums_for_profile(&self, profile_id: i64) -> Result<Vec<Album>, TravelogError> {
        let state = self.state.read().await;
        let mut albums: Vec<Album> = state
            .albums
            .values()
            .filter(|a| a.user_profile_id == profile_id)
            .cloned()
            .collect();
        albums.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(albums)
    }

    async fn album_name_taken(
        &self,
        profile_id: i64,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, TravelogError> {
        let state = self.state.read().await;
        Ok(state.albums.values().any(|a| {
            a.user_profile_id == profile_id && a.name == name && Some(a.id) != excluding
        }))
    }

    async fn insert_album(
        &self,
        profile_id: i64,
        record: AlbumRecord,
    ) -> Result<Album, TravelogError> {
        let mut state = self.state.write().await;

        if state
            .albums
            .values()
            .any(|a| a.user_profile_id == profile_id && a.name == record.name)
        {
            return Err(ValidationError::UniquenessViolation(ALBUM_NAME_TAKEN).into());
        }

        let album = Album {
            id: state.allocate_id(),
            user_profile_id: profile_id,
            name: record.name,
            start_date: record.start_date,
            end_date: record.end_date,
            cover_picture: record.cover_picture,
            created_at: Utc::now(),
        };
        state.albums.insert(album.id, album.clone());

        log::info!("Created album {} for profile {}", album.id, profile_id);
        Ok(album)
    }

    async fn update_album(&self, id: i64, record: AlbumRecord) -> Result<Album, TravelogError> {
        let mut state = self.state.write().await;

        let owner = state
            .albums
            .get(&id)
            .map(|a| a.user_profile_id)
            .ok_or_else(|| TravelogError::NotFound(format!("album {}", id)))?;

        if state
            .albums
            .values()
            .any(|a| a.user_profile_id == owner && a.name == record.name && a.id != id)
        {
            return Err(ValidationError::UniquenessViolation(ALBUM_NAME_TAKEN).into());
        }

        let album = state
            .albums
            .get_mut(&id)
            .ok_or_else(|| TravelogError::NotFound(format!("album {}", id)))?;
        album.name = record.name;
        album.start_date = record.start_date;
        album.end_date = record.end_date;
        if let Some(cover) = record.cover_picture {
            album.cover_picture = Some(cover);
        }

        Ok(album.clone())
    }

    async fn delete_album(&self, id: i64) -> Result<(), TravelogError> {
        let mut state = self.state.write().await;
        if state.albums.remove(&id).is_none() {
            return Err(TravelogError::NotFound(format!("album {}", id)));
        }

        for log in state.logs.values_mut().filter(|l| l.album_id == Some(id)) {
            log.album_id = None;
        }

        log::info!("Deleted album: {}", id);
        Ok(())
    }

    async fn count_albums(&self) -> Result<i64, TravelogError> {
        Ok(self.state.read().await.albums.len() as i64)
    }

    async fn insert_log(&self, profile_id: i64, new_log: NewLog) -> Result<Log, TravelogError> {
        let mut state = self.state.write().await;

        if !state.profiles.contains_key(&profile_id) {
            return Err(TravelogError::NotFound(format!("profile {}", profile_id)));
        }
        if !state.cities.contains_key(&new_log.city_id) {
            return Err(TravelogError::NotFound(format!("city {}", new_log.city_id)));
        }

        let log = Log {
            id: state.allocate_id(),
            user_profile_id: profile_id,
            album_id: new_log.album_id,
            city_id: new_log.city_id,
            description: new_log.description,
            created_at: Utc::now(),
        };
        state.logs.insert(log.id, log.clone());
        state.log_pictures.insert(log.id, new_log.pictures);

        let city_ids: BTreeSet<i64> = state
            .logs
            .values()
            .filter(|l| l.user_profile_id == profile_id)
            .map(|l| l.city_id)
            .collect();
        let countries: BTreeSet<&str> = city_ids
            .iter()
            .filter_map(|id| state.cities.get(id))
            .map(|c| c.country_name.as_str())
            .collect();
        let (city_count, country_count) = (city_ids.len() as i32, countries.len() as i32);

        if let Some(profile) = state.profiles.get_mut(&profile_id) {
            profile.city_count = city_count;
            profile.country_count = country_count;
        }

        log::info!("Created log {} for profile {}", log.id, profile_id);
        Ok(log)
    }

    async fn logs_for_city(&self, city_id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        let state = self.state.read().await;
        Ok(state.log_details(|l| l.city_id == city_id))
    }

    async fn logs_for_album(&self, album_id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        let state = self.state.read().await;
        Ok(state.log_details(|l| l.album_id == Some(album_id)))
    }

    async fn logs_for_profile(&self, profile_id: i64) -> Result<Vec<LogDetail>, TravelogError> {
        let state = self.state.read().await;
        Ok(state.log_details(|l| l.user_profile_id == profile_id))
    }

    async fn count_logs(&self) -> Result<i64, TravelogError> {
        Ok(self.state.read().await.logs.len() as i64)
    }
}
