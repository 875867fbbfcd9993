// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Route table for pages, AJAX operations and service endpoints

pub mod accounts;
pub mod admin;
pub mod albums;
pub mod cities;
pub mod forms;
pub mod health;
pub mod logs;
pub mod responses;

use actix_web::web;

use crate::db::TravelogStore;

pub use health::config as health_config;

/// Register every route against storage backend `S`
/// DOCUMENTATION: Expects `web::Data<S>`, `SessionStore`, `MediaStore`
/// and `Config` in app data
pub fn configure<S: TravelogStore>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(forms::MAX_FORM_BODY_BYTES))
        .configure(health_config)
        .route("/mytravelog/", web::get().to(cities::show_home::<S>))
        .route("/mytravelog/search/", web::get().to(cities::search::<S>))
        .route("/mytravelog/sign_up/", web::get().to(accounts::sign_up_page))
        .route("/mytravelog/sign_up/", web::post().to(accounts::sign_up::<S>))
        .route("/mytravelog/sign_in/", web::get().to(accounts::sign_in_page))
        .route("/mytravelog/sign_in/", web::post().to(accounts::sign_in::<S>))
        .route("/mytravelog/sign_out/", web::get().to(accounts::sign_out))
        .service(
            web::scope("/mytravelog/city")
                // Before the {url_name} route, which would swallow it
                .route("/autocomplete/", web::get().to(cities::autocomplete::<S>))
                .route("/{url_name}/", web::get().to(cities::show_city::<S>)),
        )
        .service(
            web::scope("/mytravelog/user")
                .route("/{username}/", web::get().to(accounts::show_user::<S>)),
        )
        .service(
            web::scope("/mytravelog/album")
                .route("/create/", web::post().to(albums::create_album::<S>))
                .route("/update/{id}/", web::post().to(albums::update_album::<S>))
                .route("/delete/{id}/", web::post().to(albums::delete_album::<S>))
                .route("/{id}/", web::get().to(albums::show_album::<S>)),
        )
        .service(
            web::scope("/mytravelog/log")
                .route("/create/", web::post().to(logs::create_log::<S>)),
        )
        .service(
            web::scope("/admin")
                .route("/cities", web::post().to(admin::import_cities::<S>))
                .route("/rankings/users", web::post().to(admin::rerank_users::<S>))
                .route("/stats", web::get().to(admin::stats::<S>)),
        );
}
