//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! represent the error conditions that can occur, from database issues to
//! validation failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into HTTP responses with JSON bodies. It also provides
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError`, so handlers can
//! lean on the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to one HTTP failure class. Storage-level detail is
/// logged but never sent to the caller.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input (HTTP 400).
    Validation(String),
    /// Missing, invalid, or expired credential, or a wrong password (HTTP 401).
    Unauthenticated(String),
    /// The requested resource does not exist for this caller (HTTP 404).
    /// Ownership mismatches deliberately land here as well.
    NotFound(String),
    /// A uniqueness rule was violated, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// An error originating from the persistent store (HTTP 500).
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Store and internal failures are logged in full but reported
            // generically, so backend detail never reaches the caller.
            AppError::Database(msg) | AppError::Internal(msg) => {
                log::error!("{}", msg);
                HttpResponse::build(self.status_code()).json(json!({
                    "error": "Internal server error"
                }))
            }
            AppError::Validation(msg)
            | AppError::Unauthenticated(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => HttpResponse::build(self.status_code()).json(json!({
                "error": msg
            })),
        }
    }
}

/// `sqlx::Error::RowNotFound` maps to `NotFound`, a unique-constraint
/// violation to `Conflict`, and everything else to `Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("Record already exists".into())
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
