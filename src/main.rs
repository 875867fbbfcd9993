// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, storage, sessions and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;
mod urls;

#[cfg(test)]
mod test_helpers;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{Config, StorageBackend};
use db::{MemoryStore, PgStore, TravelogStore};
use dotenv::dotenv;
use services::{start_cleanup_task, MediaStore, SessionStore};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting mytravelog...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize storage
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = match config::init_db_pool(&config).await {
                Ok(pool) => pool,
                Err(e) => {
                    log::error!("Failed to connect to database: {}", e);
                    std::process::exit(1);
                }
            };
            serve(PgStore::new(pool), config).await
        }
        StorageBackend::Memory => {
            log::info!("Using in-memory storage");
            serve(MemoryStore::new(), config).await
        }
    }
}

/// Run the HTTP server over storage backend `S`
async fn serve<S: TravelogStore>(store: S, config: Config) -> io::Result<()> {
    // 5. Sessions, with background cleanup of expired entries
    let sessions = Arc::new(SessionStore::new(config.session_ttl_seconds));
    start_cleanup_task(sessions.clone(), config.session_cleanup_interval_seconds);
    log::info!(
        "Started session cleanup task (interval: {}s)",
        config.session_cleanup_interval_seconds
    );

    let media = MediaStore::new(config.media_root.clone());
    log::info!("Media root: {}", config.media_root.display());

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    let store = web::Data::new(store);
    let sessions = web::Data::from(sessions);
    let media = web::Data::new(media);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            // Application state (store, sessions, media and config)
            .app_data(store.clone())
            .app_data(sessions.clone())
            .app_data(media.clone())
            .app_data(config.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::configure::<S>)
    })
    .bind(&server_addr)?
    .run()
    .await
}
