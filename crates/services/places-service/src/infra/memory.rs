//! In-memory document store.
//!
//! Holds both collections behind one lock. A transaction stages a copy of
//! the committed collections, runs against the copy and swaps it in only on
//! success, so a failed body leaves nothing behind. Transactions are
//! serialized by holding the committed lock for their whole duration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::unit_of_work::{TransactionContext, TxFuture, UnitOfWork};
use crate::repository::{PlaceRepository, UserRepository};
use common::{AppError, AppResult, OptionExt};
use domain::{Place, SavedPlace, User};

#[derive(Debug, Clone, Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    places: HashMap<Uuid, Place>,
}

type Shared = Arc<Mutex<Collections>>;

/// Document store kept in process memory.
///
/// Cloning yields another handle to the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    committed: Shared,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user and place documents currently committed.
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.committed.lock().await;
        (state.users.len(), state.places.len())
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(MemoryUsers {
            state: self.committed.clone(),
        })
    }

    fn places(&self) -> Arc<dyn PlaceRepository> {
        Arc::new(MemoryPlaces {
            state: self.committed.clone(),
        })
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let mut committed = self.committed.lock().await;
        let staged: Shared = Arc::new(Mutex::new(committed.clone()));

        let ctx = TransactionContext::new(
            Box::new(MemoryUsers {
                state: staged.clone(),
            }),
            Box::new(MemoryPlaces {
                state: staged.clone(),
            }),
        );

        let outcome = f(ctx).await;
        if outcome.is_ok() {
            *committed = std::mem::take(&mut *staged.lock().await);
        } else {
            tracing::debug!("Discarding staged changes");
        }
        outcome
    }
}

/// User collection view.
struct MemoryUsers {
    state: Shared,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_saving(&self, place_id: Uuid) -> AppResult<Vec<Uuid>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.has_saved(place_id))
            .map(|u| u.id)
            .collect())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.id) {
            return Err(AppError::store(format!("duplicate user id {}", user.id)));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::DuplicateEmail);
        }

        let stored = state.users.get_mut(&user.id).ok_or_not_found()?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.image = user.image.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn push_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .users
            .get_mut(&user_id)
            .ok_or_not_found()?
            .push_place(place_id);
        Ok(())
    }

    async fn pull_place(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .users
            .get_mut(&user_id)
            .ok_or_not_found()?
            .pull_place(place_id);
        Ok(())
    }

    async fn push_saved(&self, user_id: Uuid, snapshot: &SavedPlace) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .users
            .get_mut(&user_id)
            .ok_or_not_found()?
            .push_saved(snapshot.clone());
        Ok(())
    }

    async fn pull_saved(&self, user_id: Uuid, place_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .users
            .get_mut(&user_id)
            .ok_or_not_found()?
            .pull_saved(place_id);
        Ok(())
    }

    async fn pull_saved_everywhere(&self, place_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let changed = state
            .users
            .values_mut()
            .map(|u| u.pull_saved(place_id))
            .filter(|removed| *removed)
            .count();
        Ok(changed as u64)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.users.remove(&id).map(|_| ()).ok_or_not_found()
    }
}

/// Place collection view.
struct MemoryPlaces {
    state: Shared,
}

#[async_trait]
impl PlaceRepository for MemoryPlaces {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Place>> {
        Ok(self.state.lock().await.places.get(&id).cloned())
    }

    async fn find_by_creator(&self, creator: Uuid) -> AppResult<Vec<Place>> {
        let state = self.state.lock().await;
        let mut places: Vec<Place> = state
            .places
            .values()
            .filter(|p| p.is_owned_by(creator))
            .cloned()
            .collect();
        places.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(places)
    }

    async fn insert(&self, place: &Place) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.places.contains_key(&place.id) {
            return Err(AppError::store(format!("duplicate place id {}", place.id)));
        }
        state.places.insert(place.id, place.clone());
        Ok(())
    }

    async fn update(&self, place: &Place) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let stored = state.places.get_mut(&place.id).ok_or_not_found()?;
        stored.title = place.title.clone();
        stored.description = place.description.clone();
        stored.address = place.address.clone();
        stored.location = place.location;
        stored.image = place.image.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn add_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .places
            .get_mut(&place_id)
            .ok_or_not_found()?
            .add_saver(user_id);
        Ok(())
    }

    async fn remove_saver(&self, place_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .places
            .get_mut(&place_id)
            .ok_or_not_found()?
            .remove_saver(user_id);
        Ok(())
    }

    async fn remove_saver_everywhere(&self, user_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let changed = state
            .places
            .values_mut()
            .map(|p| p.remove_saver(user_id))
            .filter(|removed| *removed)
            .count();
        Ok(changed as u64)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.places.remove(&id).map(|_| ()).ok_or_not_found()
    }
}
