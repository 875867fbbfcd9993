// src/handlers/cities.rs
// DOCUMENTATION: HTTP handlers for the home page, city pages, autocomplete and search
// PURPOSE: Parse requests, call CityService, return pages

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::db::TravelogStore;
use crate::errors::TravelogError;
use crate::handlers::responses::{current_session, page, require_ajax};
use crate::services::{CityService, SessionStore};

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub search_term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// GET /mytravelog/
pub async fn show_home<S: TravelogStore>(
    store: web::Data<S>,
) -> Result<impl Responder, TravelogError> {
    let home = CityService::home(store.get_ref()).await?;
    Ok(page("home", home))
}

/// GET /mytravelog/city/{url_name}/
pub async fn show_city<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, TravelogError> {
    let session = current_session(&req, &sessions).await;
    let city = CityService::city_page(store.get_ref(), &session, &path.into_inner()).await?;
    Ok(page("city", city))
}

/// GET /mytravelog/city/autocomplete/?search_term=
/// AJAX only
pub async fn autocomplete<S: TravelogStore>(
    store: web::Data<S>,
    req: HttpRequest,
    query: web::Query<AutocompleteQuery>,
) -> Result<impl Responder, TravelogError> {
    require_ajax(&req)?;

    let suggestions =
        CityService::autocomplete(store.get_ref(), query.search_term.as_deref()).await?;
    Ok(HttpResponse::Ok().json(suggestions))
}

/// GET /mytravelog/search/?query=
pub async fn search<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, TravelogError> {
    let session = current_session(&req, &sessions).await;
    let results =
        CityService::search(store.get_ref(), &session, query.query.as_deref()).await?;
    Ok(page("search", results))
}
