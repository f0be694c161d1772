//! Service Container - Centralized service access.
//!
//! Wires every service over one unit of work and one set of external
//! collaborators, for whatever layer serves requests.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AuthService, Authenticator, ConsistencyManager, ConsistencyService, PlaceManager,
    PlaceService, UserManager, UserService,
};
use crate::config::PlacesServiceConfig;
use crate::external::{
    Argon2Hasher, BlobStore, Geocoder, JwtIssuer, LocalBlobStore, MapboxGeocoder, PasswordHasher,
    TokenIssuer,
};
use crate::infra::{Persistence, UnitOfWork};
use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get the multi-document mutations
    fn consistency(&self) -> Arc<dyn ConsistencyService>;

    /// Get place service
    fn places(&self) -> Arc<dyn PlaceService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;
}

/// External collaborators shared by the services.
#[derive(Clone)]
pub struct Collaborators {
    pub geocoder: Arc<dyn Geocoder>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub blobs: Arc<dyn BlobStore>,
    pub default_profile_image: String,
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    consistency_service: Arc<dyn ConsistencyService>,
    place_service: Arc<dyn PlaceService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Create a service container over any unit of work
    pub fn new<U: UnitOfWork + 'static>(uow: Arc<U>, collaborators: Collaborators) -> Self {
        let Collaborators {
            geocoder,
            hasher,
            tokens,
            blobs,
            default_profile_image,
        } = collaborators;

        Self {
            auth_service: Arc::new(Authenticator::new(
                uow.clone(),
                hasher.clone(),
                tokens,
                default_profile_image.clone(),
            )),
            consistency_service: Arc::new(ConsistencyManager::new(
                uow.clone(),
                geocoder.clone(),
                hasher,
                blobs.clone(),
                default_profile_image.clone(),
            )),
            place_service: Arc::new(PlaceManager::new(uow.clone(), geocoder)),
            user_service: Arc::new(UserManager::new(uow, blobs, default_profile_image)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: DatabaseConnection, config: &PlacesServiceConfig) -> AppResult<Self> {
        let collaborators = Collaborators {
            geocoder: Arc::new(MapboxGeocoder::new(config.geocoder.clone())?),
            hasher: Arc::new(Argon2Hasher),
            tokens: Arc::new(JwtIssuer::new(&config.jwt)),
            blobs: Arc::new(LocalBlobStore::new(&config.storage.root)),
            default_profile_image: config.storage.default_profile_image.clone(),
        };

        Ok(Self::new(Arc::new(Persistence::new(db)), collaborators))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn consistency(&self) -> Arc<dyn ConsistencyService> {
        self.consistency_service.clone()
    }

    fn places(&self) -> Arc<dyn PlaceService> {
        self.place_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
