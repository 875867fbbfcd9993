// src/handlers/logs.rs
// DOCUMENTATION: AJAX travel log creation

use actix_web::{web, HttpRequest, Responder};

use crate::db::TravelogStore;
use crate::errors::TravelogError;
use crate::handlers::forms::{FormFields, FormPayload};
use crate::handlers::responses::{ajax_failure, ajax_ok, current_session, require_ajax};
use crate::services::{LogService, MediaStore, SessionStore};

/// POST /mytravelog/log/create/
/// Pictures arrive as `log_picture_1` .. `log_picture_10`
pub async fn create_log<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    media: web::Data<MediaStore>,
    req: HttpRequest,
    payload: FormPayload,
) -> Result<impl Responder, TravelogError> {
    require_ajax(&req)?;

    let session = current_session(&req, &sessions).await;
    let form = FormFields::collect(payload).await?.into_log();

    match LogService::create(store.get_ref(), &media, &session, form).await {
        Ok(_) => Ok(ajax_ok()),
        Err(e) => ajax_failure(e),
    }
}
