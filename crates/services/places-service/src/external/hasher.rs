//! Password hashing.

use common::AppResult;
use domain::Password;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plain text password, enforcing the minimum length.
    fn hash(&self, plain_text: &str) -> AppResult<String>;

    /// Check a plain text password against a stored hash.
    fn verify(&self, plain_text: &str, hash: &str) -> bool;
}

/// Argon2id hashing through the domain `Password` value object.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain_text: &str) -> AppResult<String> {
        Ok(Password::new(plain_text)?.into_string())
    }

    fn verify(&self, plain_text: &str, hash: &str) -> bool {
        Password::from_hash(hash).verify(plain_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;

    #[test]
    fn test_hash_then_verify() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("correct horse battery").unwrap();

        assert!(hasher.verify("correct horse battery", &hash));
        assert!(!hasher.verify("wrong horse battery", &hash));
    }

    #[test]
    fn test_short_password_is_validation_error() {
        assert!(matches!(Argon2Hasher.hash("short"), Err(AppError::Validation(_))));
    }
}
