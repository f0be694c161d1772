//! Password value object.
//!
//! Wraps an Argon2 PHC string. Plain text never leaves this module except as
//! an argument to `new` or `verify`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Hashed password, compared by value.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain text password.
    ///
    /// # Errors
    /// Returns a password error if the input is shorter than
    /// `MIN_PASSWORD_LENGTH` or hashing fails.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A malformed stored hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let hash = Password::new(plain).unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain).unwrap();
        let pass2 = Password::new(plain).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_password_too_short() {
        let result = Password::new("short");
        assert!(matches!(result, Err(DomainError::Password(_))));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let stored = Password::from_hash("not-a-phc-string");
        assert!(!stored.verify("anything"));
    }
}
