//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Users own places, and bookmark places owned by others as snapshots.

pub mod constants;
pub mod error;
pub mod password;
pub mod place;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use place::{Location, Place, SavedPlace};
pub use user::{AuthSession, User};
