//! Shared fixtures for the places-service integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Location, Place, SavedPlace, User};
use places_service_lib::external::{BlobStore, Claims, Geocoder, PasswordHasher, TokenIssuer};
use places_service_lib::infra::{MemoryStore, TransactionContext, TxFuture, UnitOfWork};
use places_service_lib::repository::{PlaceRepository, UserRepository};
use places_service_lib::service::{Collaborators, CreatePlaceRequest, Services};

pub const DEFAULT_IMAGE: &str = "uploads/images/user-profile-default.png";
pub const CAFE_IMAGE: &str = "uploads/images/cafe.png";

/// Reversible "hash" so tests can reason about stored credentials.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plain_text: &str) -> AppResult<String> {
        Ok(format!("hashed:{}", plain_text))
    }

    fn verify(&self, plain_text: &str, hash: &str) -> bool {
        hash == format!("hashed:{}", plain_text)
    }
}

/// Resolves one known address; everything else is unknown.
pub struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<Location> {
        match address {
            "123 Main St" => Ok(Location::new(10.0, 20.0)),
            "9 Side St" => Ok(Location::new(1.0, 2.0)),
            _ => Err(AppError::geocode(
                "Could not find location for the specified address.",
            )),
        }
    }
}

/// Remembers every path it was asked to delete.
#[derive(Default)]
pub struct RecordingBlobs {
    deleted: Mutex<Vec<String>>,
}

impl RecordingBlobs {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobs {
    async fn delete(&self, path: &str) -> AppResult<()> {
        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push(path.to_string());
        }
        Ok(())
    }
}

/// Token is the user id; enough to exercise the auth flow.
pub struct IdTokens;

impl TokenIssuer for IdTokens {
    fn issue(&self, user: &User) -> AppResult<String> {
        Ok(user.id.to_string())
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        let sub = Uuid::parse_str(token).map_err(|_| AppError::Unauthorized)?;
        Ok(Claims {
            sub,
            email: String::new(),
            iat: 0,
            exp: i64::MAX,
        })
    }
}

pub struct Harness<U: UnitOfWork> {
    pub store: Arc<U>,
    pub blobs: Arc<RecordingBlobs>,
    pub services: Services,
}

pub fn harness_over<U: UnitOfWork + 'static>(store: U) -> Harness<U> {
    harness_with(store, DEFAULT_IMAGE)
}

pub fn harness_with<U: UnitOfWork + 'static>(store: U, default_profile_image: &str) -> Harness<U> {
    let store = Arc::new(store);
    let blobs = Arc::new(RecordingBlobs::default());
    let services = Services::new(
        store.clone(),
        Collaborators {
            geocoder: Arc::new(FixedGeocoder),
            hasher: Arc::new(PlainHasher),
            tokens: Arc::new(IdTokens),
            blobs: blobs.clone(),
            default_profile_image: default_profile_image.to_string(),
        },
    );
    Harness {
        store,
        blobs,
        services,
    }
}

pub fn harness() -> Harness<MemoryStore> {
    harness_over(MemoryStore::new())
}

/// Insert a user whose password is `password`.
pub async fn seed_user<U: UnitOfWork>(store: &U, email: &str, password: &str) -> User {
    let user = User::new(
        email.split('@').next().unwrap_or("user").to_string(),
        email.to_string(),
        format!("hashed:{}", password),
        DEFAULT_IMAGE.to_string(),
    );
    store.users().insert(&user).await.unwrap();
    user
}

pub fn cafe_request() -> CreatePlaceRequest {
    CreatePlaceRequest {
        title: "Cafe".to_string(),
        description: "Good coffee".to_string(),
        address: "123 Main St".to_string(),
        image: CAFE_IMAGE.to_string(),
    }
}

/// A single repository write that a [`FaultyStore`] refuses inside transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    PushPlace,
    PullPlace,
    PushSaved,
    PullSaved,
    DeleteUser,
    AddSaver,
    RemoveSaver,
    DeletePlace,
}

fn refuse(fault: Fault, target: Fault) -> AppResult<()> {
    if fault == target {
        Err(AppError::store("write rejected"))
    } else {
        Ok(())
    }
}

/// Delegates to the wrapped repository except for the faulted write.
struct FaultyUsers<'a> {
    inner: Box<dyn UserRepository + 'a>,
    fault: Fault,
}

#[async_trait]
impl<'a> UserRepository for FaultyUsers<'a> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        self.inner.list().await
    }

    async fn find_saving(&self, place_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.inner.find_saving(place_id).await
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        self.inner.insert(user).await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        self.inner.update(user).await
    }

    async fn push_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::PushPlace)?;
        self.inner.push_place(user_id, place_id).await
    }

    async fn pull_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::PullPlace)?;
        self.inner.pull_place(user_id, place_id).await
    }

    async fn push_saved(&self, user_id: Uuid, snapshot: &SavedPlace) -> AppResult<()> {
        refuse(self.fault, Fault::PushSaved)?;
        self.inner.push_saved(user_id, snapshot).await
    }

    async fn pull_saved(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::PullSaved)?;
        self.inner.pull_saved(user_id, place_id).await
    }

    async fn pull_saved_everywhere(&self, place_id: Uuid) -> AppResult<u64> {
        self.inner.pull_saved_everywhere(place_id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::DeleteUser)?;
        self.inner.delete(id).await
    }
}

struct FaultyPlaces<'a> {
    inner: Box<dyn PlaceRepository + 'a>,
    fault: Fault,
}

#[async_trait]
impl<'a> PlaceRepository for FaultyPlaces<'a> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_creator(&self, creator: Uuid) -> AppResult<Vec<Place>> {
        self.inner.find_by_creator(creator).await
    }

    async fn insert(&self, place: &Place) -> AppResult<()> {
        self.inner.insert(place).await
    }

    async fn update(&self, place: &Place) -> AppResult<()> {
        self.inner.update(place).await
    }

    async fn add_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::AddSaver)?;
        self.inner.add_saver(place_id, user_id).await
    }

    async fn remove_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::RemoveSaver)?;
        self.inner.remove_saver(place_id, user_id).await
    }

    async fn remove_saver_everywhere(&self, user_id: Uuid) -> AppResult<u64> {
        self.inner.remove_saver_everywhere(user_id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        refuse(self.fault, Fault::DeletePlace)?;
        self.inner.delete(id).await
    }
}

/// Memory store whose transactions fail on one chosen write.
///
/// Reads outside a transaction go straight to the committed state, so a
/// test can seed through `inner` and inspect what survived.
#[derive(Clone)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    fault: Fault,
}

impl FaultyStore {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: MemoryStore::new(),
            fault,
        }
    }
}

#[async_trait]
impl UnitOfWork for FaultyStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.inner.users()
    }

    fn places(&self) -> Arc<dyn PlaceRepository> {
        self.inner.places()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let fault = self.fault;
        self.inner
            .transaction(move |ctx| {
                let (users, places) = ctx.into_parts();
                f(TransactionContext::new(
                    Box::new(FaultyUsers {
                        inner: users,
                        fault,
                    }),
                    Box::new(FaultyPlaces {
                        inner: places,
                        fault,
                    }),
                ))
            })
            .await
    }
}
