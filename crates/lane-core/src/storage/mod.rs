//! Storage layer
//!
//! ## Architecture
//!
//! - **Key-value store**: SQLite table, JSON files or memory
//! - **Persistence**: JSON note list and preferences under two fixed keys
//! - **Writer**: fire-and-forget saves triggered by store changes
//!
//! Nothing here is transactional across records; each save replaces one
//! full record.

pub mod error;
pub mod kv;
pub mod persistence;
pub mod schema;
pub mod sqlite;
pub mod writer;

pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persistence::{KeyValuePersistence, Persistence, NOTES_KEY, PREFERENCES_KEY};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteStore;
pub use writer::PersistenceWriter;
