//! # structura-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `structura-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `structura-app` (for port traits) and `structura-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod settings_repo;
mod structure_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use settings_repo::SqliteSettingsRepository;
pub use structure_repo::SqliteStructureRepository;
