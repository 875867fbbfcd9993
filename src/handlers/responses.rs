// src/handlers/responses.rs
// DOCUMENTATION: Page, redirect and AJAX response helpers, plus session cookies
// PURPOSE: Pages are JSON documents naming a template and its context

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::errors::TravelogError;
use crate::services::{AuthOutcome, Session, SessionStore};
use crate::urls;

pub const SESSION_COOKIE: &str = "sessionid";

/// `200` page document for `mytravelog/<name>.html`
pub fn page(name: &str, context: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "template": format!("mytravelog/{}.html", name),
        "context": context,
    }))
}

pub fn redirect(to: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, to))
        .finish()
}

/// Whether the request came through the structured (AJAX) transport
pub fn is_ajax(req: &HttpRequest) -> bool {
    req.headers()
        .get("X-Requested-With")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest")
}

/// Reject plain requests to AJAX-only routes
pub fn require_ajax(req: &HttpRequest) -> Result<(), TravelogError> {
    if is_ajax(req) {
        Ok(())
    } else {
        Err(TravelogError::NotFound(req.path().to_string()))
    }
}

pub fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub async fn current_session(req: &HttpRequest, sessions: &SessionStore) -> Session {
    sessions.resolve(session_token(req).as_deref()).await
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// Turn an account workflow outcome into a redirect, setting or clearing the cookie
pub fn auth_redirect(outcome: AuthOutcome) -> HttpResponse {
    match outcome {
        AuthOutcome::Redirect { to } => redirect(&to),
        AuthOutcome::Established { token, to } => {
            let mut response = redirect(&to);
            if let Err(e) = response.add_cookie(&session_cookie(token)) {
                log::error!("Failed to set session cookie: {}", e);
            }
            response
        }
        AuthOutcome::Cleared { to } => {
            let mut response = redirect(&to);
            let mut removal = session_cookie(String::new());
            removal.make_removal();
            if let Err(e) = response.add_cookie(&removal) {
                log::error!("Failed to clear session cookie: {}", e);
            }
            response
        }
    }
}

/// `{}` payload for a successful AJAX operation
pub fn ajax_ok() -> HttpResponse {
    HttpResponse::Ok().json(json!({}))
}

/// Map an AJAX workflow failure onto its payload
/// DOCUMENTATION: Form errors become `{"error"}`, a missing session
/// becomes `{"redirect_to"}`; anything else propagates as a real error
pub fn ajax_failure(err: TravelogError) -> Result<HttpResponse, TravelogError> {
    match err {
        TravelogError::Validation(e) => Ok(HttpResponse::Ok().json(json!({
            "error": e.to_string(),
        }))),
        TravelogError::NotAuthenticated => Ok(HttpResponse::Ok().json(json!({
            "redirect_to": urls::SIGN_IN,
        }))),
        other => Err(other),
    }
}
