//! Authentication service - signup, login and token checks.

use std::sync::Arc;

use async_trait::async_trait;

use super::requests::{normalize_email, validate_request, LoginRequest, SignupRequest};
use crate::external::{Claims, PasswordHasher, TokenIssuer};
use crate::infra::UnitOfWork;
use common::{AppError, AppResult};
use domain::{AuthSession, User, BEARER_TOKEN_PREFIX};

/// Verified when the email is unknown so both failure paths cost the same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$3XvwvUBSHzBYTN8z3yBcUw4JDV1x3Aex5Oyk4LXJ8Pk";

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and sign them in
    async fn signup(&self, request: SignupRequest) -> AppResult<AuthSession>;

    /// Check credentials and issue a token
    async fn login(&self, request: LoginRequest) -> AppResult<AuthSession>;

    /// Verify a token, with or without the `Bearer ` prefix
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    default_profile_image: String,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance
    pub fn new(
        uow: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        default_profile_image: String,
    ) -> Self {
        Self {
            uow,
            hasher,
            tokens,
            default_profile_image,
        }
    }

    fn session_for(&self, user: &User) -> AppResult<AuthSession> {
        Ok(AuthSession {
            user_id: user.id,
            email: user.email.clone(),
            token: self.tokens.issue(user)?,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    #[tracing::instrument(skip_all)]
    async fn signup(&self, request: SignupRequest) -> AppResult<AuthSession> {
        let request = SignupRequest {
            email: normalize_email(&request.email),
            ..request
        };
        validate_request(&request)?;

        let users = self.uow.users();
        if users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(
            request.name,
            request.email,
            password_hash,
            self.default_profile_image.clone(),
        );
        users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "User signed up");
        self.session_for(&user)
    }

    #[tracing::instrument(skip_all)]
    async fn login(&self, request: LoginRequest) -> AppResult<AuthSession> {
        let email = normalize_email(&request.email);
        let user = self.uow.users().find_by_email(&email).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(DUMMY_HASH);
        let password_valid = self.hasher.verify(&request.password, stored_hash);

        match user {
            Some(user) if password_valid => {
                tracing::info!(user_id = %user.id, "User logged in");
                self.session_for(&user)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token = token.strip_prefix(BEARER_TOKEN_PREFIX).unwrap_or(token);
        self.tokens.verify(token)
    }
}
