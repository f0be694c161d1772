//! Places service configuration.

use std::env;

use thiserror::Error;

use common::{DatabaseConfig, GeocoderConfig, JwtConfig, StorageConfig};
use domain::{DEFAULT_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH};

/// Secret used by debug builds when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable must be set in production")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {0} characters long")]
    JwtSecretTooShort(usize),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Places service configuration.
#[derive(Debug, Clone, Default)]
pub struct PlacesServiceConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub geocoder: GeocoderConfig,
    pub storage: StorageConfig,
}

impl PlacesServiceConfig {
    /// Load configuration from `.env` and environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingJwtSecret),
        };
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::JwtSecretTooShort(MIN_JWT_SECRET_LENGTH));
        }

        Ok(Self {
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or(defaults.database.max_connections),
                min_connections: parsed(&lookup, "DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or(defaults.database.min_connections),
            },
            jwt: JwtConfig {
                secret,
                expiration_hours: parsed(&lookup, "JWT_EXPIRATION_HOURS")?
                    .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            },
            geocoder: GeocoderConfig {
                api_base: lookup("MAP_API_BASE").unwrap_or(defaults.geocoder.api_base),
                access_token: lookup("MAP_API_KEY").unwrap_or_default(),
                timeout_ms: parsed(&lookup, "MAP_API_TIMEOUT_MS")?
                    .unwrap_or(defaults.geocoder.timeout_ms),
            },
            storage: StorageConfig {
                root: lookup("UPLOADS_ROOT").unwrap_or(defaults.storage.root),
                default_profile_image: lookup("DEFAULT_PROFILE_IMAGE")
                    .unwrap_or(defaults.storage.default_profile_image),
            },
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}
