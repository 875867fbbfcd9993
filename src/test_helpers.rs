// src/test_helpers.rs
// DOCUMENTATION: Shared fixtures for service and handler tests
// PURPOSE: Sample data, an in-memory app state and request builders

use actix_web::cookie::Cookie;
use actix_web::web;
use tempfile::TempDir;

use crate::config::{Config, StorageBackend};
use crate::db::{MemoryStore, TravelogStore};
use crate::handlers;
use crate::handlers::responses::SESSION_COOKIE;
use crate::models::*;
use crate::services::passwords::hash_password;
use crate::services::{CityService, MediaStore, Session, SessionStore};

pub const TEST_PASSWORD: &str = "test_password";
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

pub struct SampleCity {
    pub name: &'static str,
    pub country_name: &'static str,
    pub tourist_count: i64,
    pub tourist_growth: f64,
    pub description: &'static str,
}

pub const CITY1: SampleCity = SampleCity {
    name: "city1",
    country_name: "country1",
    tourist_count: 1_000,
    tourist_growth: 1.5,
    description: "The first sample city",
};

pub const CITY2: SampleCity = SampleCity {
    name: "city2",
    country_name: "country2",
    tourist_count: 2_000,
    tourist_growth: -0.5,
    description: "The second sample city",
};

pub struct SampleUser {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub username: &'static str,
    pub password: &'static str,
}

pub const USER1: SampleUser = SampleUser {
    first_name: "Test",
    last_name: "User",
    email: "test_user@example.com",
    username: "test_user",
    password: TEST_PASSWORD,
};

impl SampleUser {
    pub fn text_fields(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("email", self.email),
            ("username", self.username),
            ("password", self.password),
        ]
    }

    pub fn form(&self) -> Vec<(&'static str, &'static str)> {
        self.text_fields()
    }
}

pub struct SampleAlbum {
    pub name: &'static str,
    pub start_date: &'static str,
    pub end_date: &'static str,
    pub start_iso: &'static str,
    pub end_iso: &'static str,
}

pub const ALBUM1: SampleAlbum = SampleAlbum {
    name: "album1",
    start_date: "2014-1-1",
    end_date: "2014-1-10",
    start_iso: "2014-01-01",
    end_iso: "2014-01-10",
};

pub const ALBUM2: SampleAlbum = SampleAlbum {
    name: "album2",
    start_date: "2014-2-1",
    end_date: "2014-2-14",
    start_iso: "2014-02-01",
    end_iso: "2014-02-14",
};

impl SampleAlbum {
    pub fn form(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", self.name),
            ("start_date", self.start_date),
            ("end_date", self.end_date),
        ]
    }
}

/// Everything a handler needs, backed by memory and a temporary media root
pub struct TestState {
    pub store: web::Data<MemoryStore>,
    pub sessions: web::Data<SessionStore>,
    pub media: web::Data<MediaStore>,
    pub config: web::Data<Config>,
    _media_dir: TempDir,
}

impl TestState {
    pub fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("temp media dir");

        let config = Config {
            database_url: String::new(),
            server_address: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            admin_token: TEST_ADMIN_TOKEN.to_string(),
            db_max_connections: 1,
            db_connection_timeout: 1,
            storage_backend: StorageBackend::Memory,
            media_root: media_dir.path().to_path_buf(),
            session_ttl_seconds: 3_600,
            session_cleanup_interval_seconds: 60,
        };

        Self {
            store: web::Data::new(MemoryStore::new()),
            sessions: web::Data::new(SessionStore::new(config.session_ttl_seconds)),
            media: web::Data::new(MediaStore::new(media_dir.path())),
            config: web::Data::new(config),
            _media_dir: media_dir,
        }
    }

    /// Route table plus shared state, for `App::configure`
    pub fn app_config(&self) -> impl FnOnce(&mut web::ServiceConfig) + 'static {
        let store = self.store.clone();
        let sessions = self.sessions.clone();
        let media = self.media.clone();
        let config = self.config.clone();

        move |cfg| {
            cfg.app_data(store)
                .app_data(sessions)
                .app_data(media)
                .app_data(config);
            handlers::configure::<MemoryStore>(cfg);
        }
    }

    pub async fn add_user(&self, username: &str) -> (User, UserProfile) {
        self.store
            .create_user_with_profile(NewUser {
                username: username.to_string(),
                password_hash: hash_password(TEST_PASSWORD).unwrap(),
                first_name: USER1.first_name.to_string(),
                last_name: USER1.last_name.to_string(),
                email: USER1.email.to_string(),
                profile_picture: None,
                cover_picture: None,
            })
            .await
            .expect("sample user")
    }

    pub async fn add_city(&self, sample: &SampleCity) -> City {
        let req = CreateCityRequest {
            name: sample.name.to_string(),
            country_name: sample.country_name.to_string(),
            tourist_count: sample.tourist_count,
            tourist_growth: sample.tourist_growth,
            description: sample.description.to_string(),
        };
        CityService::add_city(self.store.get_ref(), req)
            .await
            .expect("sample city")
    }

    pub async fn add_album(&self, profile_id: i64, sample: &SampleAlbum) -> Album {
        let record = AlbumRecord {
            name: sample.name.to_string(),
            start_date: parse_form_date(sample.start_date).expect("sample start date"),
            end_date: parse_form_date(sample.end_date).expect("sample end date"),
            cover_picture: None,
        };
        self.store
            .insert_album(profile_id, record)
            .await
            .expect("sample album")
    }

    /// Start a session for `user` and return the cookie carrying it
    pub async fn sign_in(&self, user: &User) -> Cookie<'static> {
        let token = self.sessions.create(user).await;
        Cookie::new(SESSION_COOKIE, token)
    }
}

pub fn session_for(user: &User) -> Session {
    Session::Authenticated {
        user_id: user.id,
        username: user.username.clone(),
    }
}

pub fn sign_up_form(username: &str) -> SignUpForm {
    SignUpForm {
        first_name: Some(USER1.first_name.to_string()),
        last_name: Some(USER1.last_name.to_string()),
        email: Some(USER1.email.to_string()),
        username: Some(username.to_string()),
        password: Some(TEST_PASSWORD.to_string()),
        profile_picture: None,
        cover_picture: None,
    }
}

pub fn album_form(name: &str) -> AlbumForm {
    AlbumForm {
        name: Some(name.to_string()),
        start_date: Some("2014-6-1".to_string()),
        end_date: Some("2014-6-10".to_string()),
        cover_picture: None,
    }
}

/// A log located in `city`, with no album and no pictures
pub fn log_form(city: &SampleCity) -> LogForm {
    LogForm {
        location: Some(format!("{}, {}", city.name, city.country_name)),
        description: Some("Walked around all day".to_string()),
        album: Some("None".to_string()),
        pictures: Vec::new(),
    }
}

pub fn city_request(name: &str, tourist_count: i64) -> CreateCityRequest {
    CreateCityRequest {
        name: name.to_string(),
        country_name: "country".to_string(),
        tourist_count,
        tourist_growth: 0.0,
        description: String::new(),
    }
}

pub fn small_image() -> Upload {
    Upload::new("small.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9])
}

pub fn large_image() -> Upload {
    Upload::new("large.jpg", vec![0; MAX_IMAGE_BYTES + 1])
}

pub fn ajax() -> (&'static str, &'static str) {
    ("X-Requested-With", "XMLHttpRequest")
}

/// Encode text fields and file parts as `multipart/form-data`
/// Returns the Content-Type header value and the body
pub fn multipart_body(text: &[(&str, &str)], files: &[(&str, Upload)]) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "mytravelog-test-boundary";
    let mut body = Vec::new();

    for (name, value) in text {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    for (name, upload) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, upload.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(&upload.bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
