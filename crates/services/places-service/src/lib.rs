//! Places Service Library
//!
//! Users own places and bookmark places owned by others. This crate keeps the
//! two document kinds and their cross-references coherent: repositories and
//! a unit of work over a document store (SeaORM or in-memory), adapters for
//! the external collaborators, and the services an HTTP layer calls.

pub mod config;
pub mod external;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use crate::config::PlacesServiceConfig;
use crate::infra::Database;
use crate::service::Services;

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &PlacesServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Verify the database is reachable and fully migrated.
pub async fn check(config: &PlacesServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;
    db.ping().await?;

    let pending: Vec<String> = db
        .migration_status()
        .await?
        .into_iter()
        .filter(|(_, applied)| !applied)
        .map(|(name, _)| name)
        .collect();

    if pending.is_empty() {
        info!("Database reachable, schema up to date");
        Ok(())
    } else {
        Err(format!("Pending migrations: {}", pending.join(", ")).into())
    }
}

/// Connect, migrate and wire every service (for an embedding HTTP layer).
pub async fn bootstrap(
    config: &PlacesServiceConfig,
) -> Result<Arc<Services>, Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;
    let services = Services::from_connection(db.get_connection(), config)?;
    Ok(Arc::new(services))
}
