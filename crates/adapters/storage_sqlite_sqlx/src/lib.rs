//! # autoflow-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the store ports defined in `autoflow-app::ports`: automations,
//!   the append-only execution log and the generic record store
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `autoflow-app` (for port traits) and `autoflow-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod automation_repo;
mod data_store;
mod error;
mod log_store;
pub mod pool;

pub use automation_repo::SqliteAutomationRepository;
pub use data_store::SqliteRecordStore;
pub use error::StorageError;
pub use log_store::SqliteAutomationLogStore;
pub use pool::{Config, Database};
