//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_places_table;
mod m20240101_000003_create_place_links;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_places_table::Migration),
            Box::new(m20240101_000003_create_place_links::Migration),
        ]
    }
}
