// src/handlers/albums.rs
// DOCUMENTATION: HTTP handlers for album pages and AJAX album operations
// PURPOSE: Transport check first, then session, then the album workflow

use actix_web::{web, HttpRequest, Responder};

use crate::db::TravelogStore;
use crate::errors::TravelogError;
use crate::handlers::forms::{FormFields, FormPayload};
use crate::handlers::responses::{ajax_failure, ajax_ok, current_session, page, require_ajax};
use crate::services::{AlbumService, MediaStore, SessionStore};

/// GET /mytravelog/album/{id}/
pub async fn show_album<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelogError> {
    let session = current_session(&req, &sessions).await;
    let album = AlbumService::album_page(store.get_ref(), &session, path.into_inner()).await?;
    Ok(page("album", album))
}

/// POST /mytravelog/album/create/
pub async fn create_album<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    media: web::Data<MediaStore>,
    req: HttpRequest,
    payload: FormPayload,
) -> Result<impl Responder, TravelogError> {
    require_ajax(&req)?;

    let session = current_session(&req, &sessions).await;
    let form = FormFields::collect(payload).await?.into_album();

    match AlbumService::create(store.get_ref(), &media, &session, form).await {
        Ok(_) => Ok(ajax_ok()),
        Err(e) => ajax_failure(e),
    }
}

/// POST /mytravelog/album/update/{id}/
pub async fn update_album<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    media: web::Data<MediaStore>,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: FormPayload,
) -> Result<impl Responder, TravelogError> {
    require_ajax(&req)?;

    let session = current_session(&req, &sessions).await;
    let form = FormFields::collect(payload).await?.into_album();

    match AlbumService::update(store.get_ref(), &media, &session, path.into_inner(), form).await {
        Ok(_) => Ok(ajax_ok()),
        Err(e) => ajax_failure(e),
    }
}

/// POST /mytravelog/album/delete/{id}/
pub async fn delete_album<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    media: web::Data<MediaStore>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelogError> {
    require_ajax(&req)?;

    let session = current_session(&req, &sessions).await;

    match AlbumService::delete(store.get_ref(), &media, &session, path.into_inner()).await {
        Ok(()) => Ok(ajax_ok()),
        Err(e) => ajax_failure(e),
    }
}
