//! Validated inputs accepted by the services.

use serde::Deserialize;
use validator::Validate;

use common::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 5, message = "Description must be at least 5 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    /// Path of the already stored upload
    pub image: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 5, message = "Description must be at least 5 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login input is not validated; bad credentials are reported uniformly.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Run the derived validators, mapping failures to `AppError::Validation`.
pub fn validate_request<T: Validate>(request: &T) -> AppResult<()> {
    request
        .validate()
        .map_err(|e| AppError::validation(format_validation_errors(&e)))
}

/// Format validation errors into a user-friendly string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Emails are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
