// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for city import, re-ranking and statistics
// PURPOSE: Expose catalogue maintenance via REST endpoints

use crate::config::Config;
use crate::db::TravelogStore;
use crate::errors::TravelogError;
use crate::models::CreateCityRequest;
use crate::services::{CityService, RankingService, SessionStore};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// Request body for the import endpoint: one city or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImportCitiesRequest {
    Many(Vec<CreateCityRequest>),
    One(CreateCityRequest),
}

impl ImportCitiesRequest {
    fn into_vec(self) -> Vec<CreateCityRequest> {
        match self {
            ImportCitiesRequest::Many(cities) => cities,
            ImportCitiesRequest::One(city) => vec![city],
        }
    }
}

/// Response for the stats endpoint
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub cities: i64,
    pub users: i64,
    pub albums: i64,
    pub logs: i64,
    pub active_sessions: usize,
}

/// POST /admin/cities
/// Import cities, re-ranking after each insert
///
/// DOCUMENTATION: Duplicates are skipped and invalid entries reported,
/// the rest of the batch still goes in.
/// Requires admin authentication via X-Admin-Token header
pub async fn import_cities<S: TravelogStore>(
    store: web::Data<S>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<ImportCitiesRequest>,
) -> Result<impl Responder, TravelogError> {
    verify_admin_token(&req, &config)?;

    let cities = body.into_inner().into_vec();
    log::info!("Admin import requested for {} cities", cities.len());

    let stats = CityService::import_cities(store.get_ref(), cities).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// POST /admin/rankings/users
/// Re-rank user profiles by city count
pub async fn rerank_users<S: TravelogStore>(
    store: web::Data<S>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, TravelogError> {
    verify_admin_token(&req, &config)?;

    let changed = RankingService::rerank_profiles(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ranks_changed": changed })))
}

/// GET /admin/stats
/// Get database and session statistics
pub async fn stats<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, TravelogError> {
    verify_admin_token(&req, &config)?;

    let response = StatsResponse {
        cities: store.count_cities().await?,
        users: store.count_users().await?,
        albums: store.count_albums().await?,
        logs: store.count_logs().await?,
        active_sessions: sessions.stats().await.active_sessions,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks X-Admin-Token header against configured admin token
fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), TravelogError> {
    let token = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Admin request without token");
            TravelogError::Unauthorized
        })?;

    if config.admin_token.is_empty() || token != config.admin_token {
        log::warn!("Admin request with invalid token");
        return Err(TravelogError::Forbidden);
    }

    Ok(())
}
