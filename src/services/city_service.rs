// src/services/city_service.rs
// DOCUMENTATION: City import, home page, city page, autocomplete and search
// PURPOSE: Read side of the city catalogue plus the admin import path

use serde::Serialize;
use validator::Validate;

use crate::db::TravelogStore;
use crate::errors::{TravelogError, ValidationError};
use crate::models::*;
use crate::services::album_service::AlbumService;
use crate::services::ranking::RankingService;
use crate::services::session_store::Session;

/// Cities shown on the home page
pub const POPULAR_CITIES: usize = 10;

/// Suggestions returned by autocomplete
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Outcome of a city import
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    pub cities_created: usize,
    pub cities_skipped: usize,
    pub cities_failed: usize,
    pub errors: Vec<String>,
}

/// Context of `mytravelog/home.html`
#[derive(Debug, Serialize)]
pub struct HomePage {
    pub popular_cities: Vec<City>,
}

/// Context of `mytravelog/city.html`
#[derive(Debug, Serialize)]
pub struct CityPage {
    pub requested_city: City,
    pub requested_city_logs: Vec<LogDetail>,
    pub current_user_albums: Vec<Album>,
}

/// Context of `mytravelog/search.html`
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub cities: Vec<City>,
    pub user_profiles: Vec<ProfileSummary>,
    pub results_count: usize,
    pub query: String,
    pub can_follow: bool,
}

pub struct CityService;

impl CityService {
    /// Insert one city and re-rank the catalogue
    pub async fn add_city<S: TravelogStore>(
        store: &S,
        req: CreateCityRequest,
    ) -> Result<City, TravelogError> {
        req.validate()
            .map_err(|e| TravelogError::InvalidInput(e.to_string()))?;

        let city = store.insert_city(req.into()).await?;
        RankingService::rerank_cities(store).await?;

        // Re-read so the returned record carries its new rank
        let ranked = store.find_city_by_url_name(&city.url_name).await?;
        Ok(ranked.unwrap_or(city))
    }

    /// Import a batch; one bad entry does not stop the rest
    pub async fn import_cities<S: TravelogStore>(
        store: &S,
        requests: Vec<CreateCityRequest>,
    ) -> Result<ImportStats, TravelogError> {
        let mut stats = ImportStats::default();

        for req in requests {
            let name = req.name.clone();
            match Self::add_city(store, req).await {
                Ok(_) => stats.cities_created += 1,
                Err(TravelogError::Validation(ValidationError::UniquenessViolation(_))) => {
                    log::debug!("City {} already exists, skipping", name);
                    stats.cities_skipped += 1;
                }
                Err(TravelogError::InvalidInput(msg)) => {
                    log::warn!("Invalid city {}: {}", name, msg);
                    stats.cities_failed += 1;
                    stats.errors.push(format!("{}: {}", name, msg));
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "City import: {} created, {} skipped, {} failed",
            stats.cities_created,
            stats.cities_skipped,
            stats.cities_failed
        );
        Ok(stats)
    }

    pub async fn home<S: TravelogStore>(store: &S) -> Result<HomePage, TravelogError> {
        Ok(HomePage {
            popular_cities: store.popular_cities(POPULAR_CITIES).await?,
        })
    }

    pub async fn city_page<S: TravelogStore>(
        store: &S,
        session: &Session,
        url_name: &str,
    ) -> Result<CityPage, TravelogError> {
        let city = store
            .find_city_by_url_name(url_name)
            .await?
            .ok_or_else(|| TravelogError::NotFound(format!("city {}", url_name)))?;

        Ok(CityPage {
            requested_city_logs: store.logs_for_city(city.id).await?,
            requested_city: city,
            current_user_albums: AlbumService::albums_of(store, session).await?,
        })
    }

    /// Cities whose name starts with `term`; no term, no suggestions
    pub async fn autocomplete<S: TravelogStore>(
        store: &S,
        term: Option<&str>,
    ) -> Result<Vec<CitySuggestion>, TravelogError> {
        let Some(term) = term.filter(|t| !t.is_empty()) else {
            return Ok(Vec::new());
        };

        let cities = store.cities_with_prefix(term, AUTOCOMPLETE_LIMIT).await?;
        Ok(cities.iter().map(City::to_suggestion).collect())
    }

    /// Combined city and user search; a missing or blank query is a 404
    pub async fn search<S: TravelogStore>(
        store: &S,
        session: &Session,
        query: Option<&str>,
    ) -> Result<SearchPage, TravelogError> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| TravelogError::NotFound("search query".to_string()))?;

        let cities = store.search_cities(query).await?;
        let user_profiles = store.search_users(query).await?;

        Ok(SearchPage {
            results_count: cities.len() + user_profiles.len(),
            cities,
            user_profiles,
            query: query.to_string(),
            can_follow: session.is_authenticated(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LogService;
    use crate::test_helpers::*;

    #[tokio::test]
    async fn test_add_city_ranks_by_tourists() {
        let state = TestState::new();
        let store = state.store.get_ref();

        let first = CityService::add_city(store, city_request("Lisbon", 100)).await.unwrap();
        assert_eq!(first.rank, 1);

        let second = CityService::add_city(store, city_request("New York", 500)).await.unwrap();
        assert_eq!(second.rank, 1);
        assert_eq!(second.url_name, "New_York");

        let lisbon = store.find_city_by_url_name("Lisbon").await.unwrap().unwrap();
        assert_eq!(lisbon.rank, 2);
    }

    #[tokio::test]
    async fn test_import_counts_duplicates_and_invalid() {
        let state = TestState::new();
        let store = state.store.get_ref();

        let stats = CityService::import_cities(
            store,
            vec![
                city_request("Lisbon", 100),
                city_request("Lisbon", 200),
                city_request("", 5),
                city_request("Porto", 50),
            ],
        )
        .await
        .unwrap();

        assert_eq!(stats.cities_created, 2);
        assert_eq!(stats.cities_skipped, 1);
        assert_eq!(stats.cities_failed, 1);
        assert_eq!(store.count_cities().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_home_lists_top_cities_in_rank_order() {
        let state = TestState::new();
        let store = state.store.get_ref();
        for i in 0..12 {
            CityService::add_city(store, city_request(&format!("City {}", i), i * 10))
                .await
                .unwrap();
        }

        let home = CityService::home(store).await.unwrap();
        assert_eq!(home.popular_cities.len(), POPULAR_CITIES);
        assert_eq!(home.popular_cities[0].name, "City 11");
        assert!(home.popular_cities.windows(2).all(|w| w[0].rank < w[1].rank));
    }

    #[tokio::test]
    async fn test_autocomplete() {
        let state = TestState::new();
        let store = state.store.get_ref();
        CityService::add_city(store, city_request("Paris", 10)).await.unwrap();
        CityService::add_city(store, city_request("Parma", 20)).await.unwrap();
        CityService::add_city(store, city_request("Lisbon", 30)).await.unwrap();

        let suggestions = CityService::autocomplete(store, Some("pA")).await.unwrap();
        assert_eq!(
            suggestions.iter().map(|s| s.city.as_str()).collect::<Vec<_>>(),
            vec!["Parma", "Paris"]
        );
        assert!(CityService::autocomplete(store, None).await.unwrap().is_empty());
        assert!(CityService::autocomplete(store, Some("")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let state = TestState::new();
        let store = state.store.get_ref();
        CityService::add_city(store, city_request("Testville", 10)).await.unwrap();
        state.add_user("test_user").await;

        let anonymous = Session::Anonymous;
        let page = CityService::search(store, &anonymous, Some("test")).await.unwrap();
        assert_eq!(page.cities.len(), 1);
        assert_eq!(page.user_profiles.len(), 1);
        assert_eq!(page.results_count, 2);
        assert_eq!(page.query, "test");
        assert!(!page.can_follow);

        assert!(matches!(
            CityService::search(store, &anonymous, Some("   ")).await,
            Err(TravelogError::NotFound(_))
        ));
        assert!(CityService::search(store, &anonymous, None).await.is_err());
    }

    #[tokio::test]
    async fn test_city_page_includes_caller_albums() {
        let state = TestState::new();
        let store = state.store.get_ref();
        CityService::add_city(store, city_request("Lisbon", 10)).await.unwrap();
        let (user, _) = state.add_user("test_user").await;
        let session = session_for(&user);
        AlbumService::create(store, &state.media, &session, album_form("Summer"))
            .await
            .unwrap();

        let page = CityService::city_page(store, &session, "Lisbon").await.unwrap();
        assert_eq!(page.requested_city.name, "Lisbon");
        assert_eq!(page.current_user_albums.len(), 1);
        assert!(page.requested_city_logs.is_empty());

        let page = CityService::city_page(store, &Session::Anonymous, "Lisbon").await.unwrap();
        assert!(page.current_user_albums.is_empty());

        assert!(CityService::city_page(store, &session, "Atlantis").await.is_err());
    }

    #[tokio::test]
    async fn test_city_page_lists_logs_of_that_city() {
        let state = TestState::new();
        let store = state.store.get_ref();
        let city1 = state.add_city(&CITY1).await;
        state.add_city(&CITY2).await;
        let (user, _) = state.add_user("test_user").await;
        let session = session_for(&user);

        LogService::create(store, &state.media, &session, log_form(&CITY1)).await.unwrap();
        LogService::create(store, &state.media, &session, log_form(&CITY2)).await.unwrap();

        let page = CityService::city_page(store, &Session::Anonymous, &city1.url_name)
            .await
            .unwrap();
        assert_eq!(page.requested_city_logs.len(), 1);
        assert_eq!(page.requested_city_logs[0].log.city_id, city1.id);
        assert_eq!(page.requested_city_logs[0].username, "test_user");
    }
}
