//! JWT issuance and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{AppResult, JwtConfig};
use domain::User;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for the user.
    fn issue(&self, user: &User) -> AppResult<String>;

    /// Check signature and expiry, returning the claims.
    fn verify(&self, token: &str) -> AppResult<Claims>;
}

/// HS256 tokens signed with a shared secret.
pub struct JwtIssuer {
    secret: String,
    expiration_hours: i64,
}

impl JwtIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            expiration_hours: config.expiration_hours,
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}
