// src/services/log_service.rs
// DOCUMENTATION: Travel log creation
// PURPOSE: A log pins a visit to a catalogue city; writing one refreshes
// the author's city and country counts and the user ranking

use crate::db::TravelogStore;
use crate::errors::{TravelogError, ValidationError};
use crate::models::*;
use crate::services::album_service::{caller_profile, owned_album};
use crate::services::media::{MediaCategory, MediaStore};
use crate::services::ranking::RankingService;
use crate::services::session_store::Session;
use crate::services::validation::validate_log;

const UNKNOWN_LOCATION: &str = "Sorry, we have no information about that city yet";

pub struct LogService;

impl LogService {
    /// Create a log for the signed-in user
    /// DOCUMENTATION: The album, when one is chosen, must belong to the
    /// author; someone else's album is reported as not found
    pub async fn create<S: TravelogStore>(
        store: &S,
        media: &MediaStore,
        session: &Session,
        form: LogForm,
    ) -> Result<Log, TravelogError> {
        let profile = caller_profile(store, session).await?;
        let draft = validate_log(form)?;

        let city = match store.find_city_by_url_name(&url_name_for(&draft.city_name)).await? {
            Some(city) if city.country_name.eq_ignore_ascii_case(&draft.country_name) => city,
            _ => {
                log::debug!(
                    "Log rejected: unknown location {}, {}",
                    draft.city_name,
                    draft.country_name
                );
                return Err(ValidationError::FormatViolation(UNKNOWN_LOCATION).into());
            }
        };

        if let Some(album_id) = draft.album_id {
            owned_album(store, profile.id, album_id).await?;
        }

        let pictures = media
            .save_all(MediaCategory::LogPictures, &draft.pictures)
            .await?;
        let new_log = NewLog {
            album_id: draft.album_id,
            city_id: city.id,
            description: draft.description,
            pictures: pictures.clone(),
        };

        let log = match store.insert_log(profile.id, new_log).await {
            Ok(log) => log,
            Err(e) => {
                media.remove_all(&pictures).await;
                return Err(e);
            }
        };

        RankingService::rerank_profiles(store).await?;

        log::info!("Log {} in {} created by profile {}", log.id, city.name, profile.id);
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[tokio::test]
    async fn test_create_log_counts_cities_and_ranks_author() {
        let state = TestState::new();
        let city1 = state.add_city(&CITY1).await;
        let city2 = state.add_city(&CITY2).await;
        let (user, profile) = state.add_user("test_user").await;
        let session = session_for(&user);

        let mut form = log_form(&CITY1);
        form.pictures = vec![small_image(), small_image()];
        let log = LogService::create(state.store.get_ref(), &state.media, &session, form)
            .await
            .unwrap();
        assert_eq!(log.city_id, city1.id);
        assert_eq!(log.user_profile_id, profile.id);

        LogService::create(state.store.get_ref(), &state.media, &session, log_form(&CITY2))
            .await
            .unwrap();

        let profile = state.store.find_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(profile.city_count, 2);
        assert_eq!(profile.country_count, 2);
        assert_eq!(profile.rank, 1);

        let logs = state.store.logs_for_city(city1.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pictures.len(), 2);
        assert!(logs[0].pictures.iter().all(|p| state.media.path_of(p).exists()));
        assert!(state.store.logs_for_city(city2.id).await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_create_log_requires_session() {
        let state = TestState::new();
        state.add_city(&CITY1).await;

        let err = LogService::create(
            state.store.get_ref(),
            &state.media,
            &Session::Anonymous,
            log_form(&CITY1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TravelogError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_unknown_location_rejected() {
        let state = TestState::new();
        state.add_city(&CITY1).await;
        let (user, _) = state.add_user("test_user").await;
        let session = session_for(&user);

        let mut form = log_form(&CITY1);
        form.location = Some("Atlantis, Ocean".to_string());
        let err = LogService::create(state.store.get_ref(), &state.media, &session, form)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), UNKNOWN_LOCATION);

        // Right city, wrong country
        let mut form = log_form(&CITY1);
        form.location = Some(format!("{}, {}", CITY1.name, CITY2.country_name));
        let err = LogService::create(state.store.get_ref(), &state.media, &session, form)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), UNKNOWN_LOCATION);
        assert_eq!(state.store.count_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_log_album_must_belong_to_author() {
        let state = TestState::new();
        state.add_city(&CITY1).await;
        let (_, owner_profile) = state.add_user("album_owner").await;
        let (author, author_profile) = state.add_user("test_user").await;
        let foreign = state.add_album(owner_profile.id, &ALBUM1).await;
        let own = state.add_album(author_profile.id, &ALBUM1).await;
        let session = session_for(&author);

        let mut form = log_form(&CITY1);
        form.album = Some(foreign.id.to_string());
        let err = LogService::create(state.store.get_ref(), &state.media, &session, form)
            .await
            .unwrap_err();
        assert!(matches!(err, TravelogError::NotFound(_)));

        let mut form = log_form(&CITY1);
        form.album = Some(own.id.to_string());
        let log = LogService::create(state.store.get_ref(), &state.media, &session, form)
            .await
            .unwrap();
        assert_eq!(log.album_id, Some(own.id));
        assert_eq!(state.store.logs_for_album(own.id).await.unwrap().len(), 1);
    }
}
