//! Repository layer for data access.
//!
//! Each repository is written once against [`DbHandle`], so the same code
//! serves the connection pool and an open transaction.

pub mod entities;
mod place_repository;
mod user_repository;

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, SqlErr};

use common::AppError;

pub use place_repository::{PlaceRepository, PlaceStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use place_repository::MockPlaceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

/// Something queries can run against: the pool or an open transaction.
pub trait DbHandle: Send + Sync {
    type Conn: ConnectionTrait + Send + Sync;

    fn conn(&self) -> &Self::Conn;
}

impl DbHandle for DatabaseConnection {
    type Conn = DatabaseConnection;

    fn conn(&self) -> &DatabaseConnection {
        self
    }
}

impl<'a> DbHandle for &'a DatabaseTransaction {
    type Conn = DatabaseTransaction;

    fn conn(&self) -> &DatabaseTransaction {
        self
    }
}

/// `update` on a missing row surfaces as `RecordNotUpdated`.
fn not_updated_as_not_found(err: DbErr) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::NotFound,
        other => AppError::from(other),
    }
}

/// Map a unique violation on `users.email` to `DuplicateEmail`.
fn unique_email_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateEmail,
        _ => AppError::from(err),
    }
}
