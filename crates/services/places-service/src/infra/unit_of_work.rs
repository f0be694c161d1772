//! Unit of Work pattern implementation.
//!
//! Every mutation that touches more than one document runs inside
//! [`UnitOfWork::transaction`]: the closure sees repositories bound to one
//! transaction, which commits when the closure returns `Ok` and rolls back
//! when it returns `Err`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};

use crate::repository::{PlaceRepository, PlaceStore, UserRepository, UserStore};
use common::{AppError, AppResult};

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, use [`super::MemoryStore`].
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// User repository outside any transaction
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Place repository outside any transaction
    fn places(&self) -> Arc<dyn PlaceRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access within one transaction.
///
/// All repository operations performed through this context are part of the
/// same transaction.
pub struct TransactionContext<'a> {
    users: Box<dyn UserRepository + 'a>,
    places: Box<dyn PlaceRepository + 'a>,
}

impl<'a> TransactionContext<'a> {
    pub fn new(users: Box<dyn UserRepository + 'a>, places: Box<dyn PlaceRepository + 'a>) -> Self {
        Self { users, places }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    /// Get place repository for this transaction
    pub fn places(&self) -> &dyn PlaceRepository {
        self.places.as_ref()
    }

    /// Take the repositories apart, e.g. to wrap one of them.
    pub fn into_parts(self) -> (Box<dyn UserRepository + 'a>, Box<dyn PlaceRepository + 'a>) {
        (self.users, self.places)
    }
}

/// SeaORM implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    place_repo: Arc<PlaceStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let place_repo = Arc::new(PlaceStore::new(db.clone()));
        Self {
            db,
            user_repo,
            place_repo,
        }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(
            Box::new(UserStore::new(&txn)),
            Box::new(PlaceStore::new(&txn)),
        );

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn places(&self) -> Arc<dyn PlaceRepository> {
        self.place_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        // Bodies check state before writing on it; concurrent writers must not interleave.
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}
