// src/handlers/accounts.rs
// DOCUMENTATION: HTTP handlers for sign-up, sign-in, sign-out and user pages
// PURPOSE: Form errors render back into the page; success redirects with a session cookie

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::db::TravelogStore;
use crate::errors::TravelogError;
use crate::handlers::forms::{FormFields, FormPayload};
use crate::handlers::responses::{auth_redirect, current_session, page, session_token};
use crate::services::{AccountService, MediaStore, SessionStore};

fn form_error_page(name: &str, err: TravelogError) -> Result<HttpResponse, TravelogError> {
    match err {
        TravelogError::Validation(_) | TravelogError::InvalidCredentials => {
            Ok(page(name, json!({ "error": err.to_string() })))
        }
        other => Err(other),
    }
}

/// GET /mytravelog/sign_up/
pub async fn sign_up_page(
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
) -> impl Responder {
    let session = current_session(&req, &sessions).await;
    match AccountService::redirect_if_signed_in(&session) {
        Some(outcome) => auth_redirect(outcome),
        None => page("sign_up", json!({})),
    }
}

/// POST /mytravelog/sign_up/
pub async fn sign_up<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    media: web::Data<MediaStore>,
    req: HttpRequest,
    payload: FormPayload,
) -> Result<impl Responder, TravelogError> {
    let session = current_session(&req, &sessions).await;
    let form = FormFields::collect(payload).await?.into_sign_up();

    match AccountService::sign_up(store.get_ref(), &sessions, &media, &session, form).await {
        Ok(outcome) => Ok(auth_redirect(outcome)),
        Err(e) => form_error_page("sign_up", e),
    }
}

/// GET /mytravelog/sign_in/
pub async fn sign_in_page(
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
) -> impl Responder {
    let session = current_session(&req, &sessions).await;
    match AccountService::redirect_if_signed_in(&session) {
        Some(outcome) => auth_redirect(outcome),
        None => page("sign_in", json!({})),
    }
}

/// POST /mytravelog/sign_in/
pub async fn sign_in<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    payload: FormPayload,
) -> Result<impl Responder, TravelogError> {
    let session = current_session(&req, &sessions).await;
    let form = FormFields::collect(payload).await?.into_sign_in();

    match AccountService::sign_in(store.get_ref(), &sessions, &session, form).await {
        Ok(outcome) => Ok(auth_redirect(outcome)),
        Err(e) => form_error_page("sign_in", e),
    }
}

/// GET /mytravelog/sign_out/
pub async fn sign_out(sessions: web::Data<SessionStore>, req: HttpRequest) -> impl Responder {
    let token = session_token(&req);
    auth_redirect(AccountService::sign_out(&sessions, token.as_deref()).await)
}

/// GET /mytravelog/user/{username}/
pub async fn show_user<S: TravelogStore>(
    store: web::Data<S>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, TravelogError> {
    let session = current_session(&req, &sessions).await;
    let user = AccountService::user_page(store.get_ref(), &session, &path.into_inner()).await?;
    Ok(page("user", user))
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::*;
    use crate::db::TravelogStore;
    use actix_web::http::header;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn location(resp: &actix_web::dev::ServiceResponse) -> String {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[actix_web::test]
    async fn test_pages_render_empty_context() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(state.app_config())).await;

        for (uri, template) in [
            ("/mytravelog/sign_up/", "mytravelog/sign_up.html"),
            ("/mytravelog/sign_in/", "mytravelog/sign_in.html"),
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["template"], template);
            assert_eq!(body["context"], serde_json::json!({}));
        }
    }

    #[actix_web::test]
    async fn test_sign_out_redirects_anonymous_users_to_sign_in() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(state.app_config())).await;

        let req = test::TestRequest::get().uri("/mytravelog/sign_out/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp), "/mytravelog/sign_in/");
    }

    #[actix_web::test]
    async fn test_signed_in_users_redirected_to_profile() {
        let state = TestState::new();
        let (user, _) = state.add_user(USER1.username).await;
        let cookie = state.sign_in(&user).await;
        let app = test::init_service(App::new().configure(state.app_config())).await;

        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_in/")
            .cookie(cookie.clone())
            .set_form(USER1.form())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp), "/mytravelog/user/test_user/");

        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_up/")
            .cookie(cookie)
            .set_form(USER1.form())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp), "/mytravelog/user/test_user/");
    }

    #[actix_web::test]
    async fn test_sign_up_creates_user_and_profile() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(state.app_config())).await;

        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_up/")
            .set_form(USER1.form())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp), "/mytravelog/user/test_user/");
        assert!(resp.response().cookies().any(|c| c.name() == "sessionid"));

        let user = state.store.find_user_by_username(USER1.username).await.unwrap().unwrap();
        assert_eq!(user.first_name, USER1.first_name);
        assert_eq!(user.last_name, USER1.last_name);
        let profile = state.store.find_profile_by_user(user.id).await.unwrap().unwrap();
        assert_eq!((profile.city_count, profile.country_count, profile.rank), (0, 0, -1));
    }

    #[actix_web::test]
    async fn test_sign_in() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(state.app_config())).await;

        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_in/")
            .set_form(USER1.form())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["context"]["error"], "Incorrect username or password");

        state.add_user(USER1.username).await;
        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_in/")
            .set_form(USER1.form())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp), "/mytravelog/user/test_user/");
    }

    #[actix_web::test]
    async fn test_sign_out_ends_session() {
        let state = TestState::new();
        let (user, _) = state.add_user(USER1.username).await;
        let cookie = state.sign_in(&user).await;
        let app = test::init_service(App::new().configure(state.app_config())).await;

        let req = test::TestRequest::get()
            .uri("/mytravelog/sign_out/")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/mytravelog/sign_in/");
        assert!(!state.sessions.resolve(Some(cookie.value())).await.is_authenticated());
    }

    #[actix_web::test]
    async fn test_sign_up_validation() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(state.app_config())).await;

        // (error for the current fields, field to set next, value to set)
        let steps = [
            ("First name is required", "first_name", USER1.first_name),
            ("Last name is required", "last_name", USER1.last_name),
            ("Email is required", "email", "example.com"),
            ("Email is missing the '@' symbol", "email", USER1.email),
            ("Username is required", "username", "a b"),
            ("Username must be at least 6 characters long", "username", "abc def"),
            ("Username cannot contain spaces", "username", USER1.username),
            ("Password is required", "password", "12345"),
            ("Password must be at least 6 characters long", "password", USER1.password),
        ];

        let mut fields: Vec<(String, String)> = Vec::new();
        for (expected, key, value) in steps {
            let req = test::TestRequest::post()
                .uri("/mytravelog/sign_up/")
                .set_form(&fields)
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["context"]["error"], expected);

            fields.retain(|(k, _)| k != key);
            fields.push((key.to_string(), value.to_string()));
        }

        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_up/")
            .set_form(&fields)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);

        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_up/")
            .set_form(&fields)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["context"]["error"], "That username is not available");
    }

    #[actix_web::test]
    async fn test_sign_up_rejects_large_pictures() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(state.app_config())).await;

        for picture in ["profile_picture", "cover_picture"] {
            let (content_type, body) = multipart_body(&USER1.text_fields(), &[(picture, large_image())]);
            let req = test::TestRequest::post()
                .uri("/mytravelog/sign_up/")
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["context"]["error"], "Max image size allowed is 2 mb");
        }

        let (content_type, body) = multipart_body(
            &USER1.text_fields(),
            &[("profile_picture", small_image()), ("cover_picture", small_image())],
        );
        let req = test::TestRequest::post()
            .uri("/mytravelog/sign_up/")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 302);

        let user = state.store.find_user_by_username(USER1.username).await.unwrap().unwrap();
        let profile = state.store.find_profile_by_user(user.id).await.unwrap().unwrap();
        let stored = profile.profile_picture.unwrap();
        assert!(state.media.path_of(&stored).exists());
    }

    #[actix_web::test]
    async fn test_user_page() {
        let state = TestState::new();
        let (user, _) = state.add_user(USER1.username).await;
        let cookie = state.sign_in(&user).await;
        let app = test::init_service(App::new().configure(state.app_config())).await;

        let req = test::TestRequest::get().uri("/mytravelog/user/test_user/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["template"], "mytravelog/user.html");
        assert_eq!(body["context"]["requested_user"]["username"], "test_user");
        assert_eq!(body["context"]["can_edit_profile"], false);
        assert_eq!(body["context"]["can_follow"], false);
        assert_eq!(body["context"]["requested_user_logs"], json!([]));
        assert!(body["context"]["requested_user"].get("password_hash").is_none());
        assert!(body["context"]["requested_user"].get("email").is_none());

        let req = test::TestRequest::get()
            .uri("/mytravelog/user/test_user/")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["context"]["can_edit_profile"], true);
        assert_eq!(body["context"]["can_follow"], false);

        let req = test::TestRequest::get().uri("/mytravelog/user/nobody/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
