//! Common utilities shared by the places backend crates.
//!
//! This crate provides:
//! - Unified error handling with HTTP status mapping
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
