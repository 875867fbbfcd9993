// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// A single violated form rule
/// DOCUMENTATION: Display is the exact message shown to the user,
/// the variant records which kind of rule failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingField(&'static str),

    #[error("{0}")]
    FormatViolation(&'static str),

    #[error("{0}")]
    OrderViolation(&'static str),

    #[error("{0}")]
    UniquenessViolation(&'static str),
}

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum TravelogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Media storage error: {0}")]
    MediaError(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,
}

impl TravelogError {
    fn code(&self) -> &'static str {
        match self {
            TravelogError::Validation(ValidationError::UniquenessViolation(_)) => "ALREADY_EXISTS",
            TravelogError::Validation(_) => "VALIDATION_ERROR",
            TravelogError::InvalidCredentials => "INVALID_CREDENTIALS",
            TravelogError::NotAuthenticated => "NOT_AUTHENTICATED",
            TravelogError::NotFound(_) => "NOT_FOUND",
            TravelogError::DatabaseError(_) => "DATABASE_ERROR",
            TravelogError::InvalidInput(_) => "INVALID_INPUT",
            TravelogError::MediaError(_) => "MEDIA_ERROR",
            TravelogError::PasswordHash(_) => "PASSWORD_HASH_ERROR",
            TravelogError::Unauthorized => "UNAUTHORIZED",
            TravelogError::Forbidden => "FORBIDDEN",
        }
    }
}

/// Convert TravelogError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses.
/// Form handlers render validation errors into the page context instead,
/// so this is what API consumers (admin, 404s, storage failures) see.
impl ResponseError for TravelogError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            TravelogError::Validation(ValidationError::UniquenessViolation(_)) => {
                StatusCode::CONFLICT
            }
            TravelogError::Validation(_) => StatusCode::BAD_REQUEST,
            TravelogError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            TravelogError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            TravelogError::NotFound(_) => StatusCode::NOT_FOUND,
            TravelogError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TravelogError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TravelogError::MediaError(_) | TravelogError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TravelogError::Unauthorized => StatusCode::UNAUTHORIZED,
            TravelogError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}
