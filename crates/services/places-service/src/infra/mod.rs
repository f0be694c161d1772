//! Infrastructure layer - database, transactions and the in-memory store.

mod db;
pub mod memory;
pub mod migrations;
pub mod unit_of_work;

pub use db::Database;
pub use memory::MemoryStore;
pub use migrations::Migrator;
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};
