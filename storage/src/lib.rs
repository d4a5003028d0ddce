//! Storage crate: SQLite persistence of users seen in updates.
//!
//! ## Modules
//!
//! - [`StorageError`] – storage error types
//! - [`UserRecord`] – row model of the `users` table
//! - [`UserRepository`] – upsert/lookups, and the SQLite-backed [`modbot_core::UserDirectory`]
//! - [`SqlitePoolManager`] – pool construction

mod error;
mod sqlite_pool;
mod user_record;
mod user_repo;

pub use error::StorageError;
pub use sqlite_pool::SqlitePoolManager;
pub use user_record::UserRecord;
pub use user_repo::UserRepository;
