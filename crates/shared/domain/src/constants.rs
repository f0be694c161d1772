//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 1;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

// =============================================================================
// Images
// =============================================================================

/// Image assigned at signup and restored when a profile picture is removed
pub const DEFAULT_PROFILE_IMAGE: &str = "uploads/images/user-profile-default.png";
