//! Unified error handling.
//!
//! Provides a single error type for every layer of the places backend and
//! its conversion into an HTTP response for whatever layer serves it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("Email already registered")]
    DuplicateEmail,

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Geocode(String),

    // Store failures
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store failure: {0}")]
    Store(String),

    #[cfg(feature = "jwt")]
    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // External services
    #[error("Service unavailable")]
    ServiceUnavailable(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound => "NOT_FOUND",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Geocode(_) => "GEOCODE_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "STORE_FAILURE",
            AppError::Store(_) => "STORE_FAILURE",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::InvalidCredentials => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail | AppError::Validation(_) | AppError::Geocode(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::Geocode(msg) => msg.clone(),
            AppError::DuplicateEmail => "Email already registered, please login instead.".to_string(),

            // Hide details for internal/security errors
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Something went wrong, please try again.".to_string()
            }
            AppError::Store(msg) => {
                tracing::error!("Store failure: {}", msg);
                "Something went wrong, please try again.".to_string()
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::ServiceUnavailable(service) => {
                tracing::error!("Service unavailable: {}", service);
                "A required service is unavailable, please try again later.".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Password(msg) => AppError::Validation(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn geocode(msg: impl Into<String>) -> Self {
        AppError::Geocode(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        AppError::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(service.into())
    }
}
