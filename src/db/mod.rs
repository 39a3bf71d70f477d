//! Database module: store registry, row models and SQLite access.
//!
//! Layout:
//! - `schema.rs`: the fixed store registry and the DDL generated from it
//! - `models.rs`: sync payload types and the value kinds accepted for storage
//! - `sqlite.rs`: pool setup and every query the handlers run

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{RecentItems, RecordRow, SearchResult, StoreValue, SyncBatch, SyncItem, UpsertRecord};
pub use schema::{Domain, STORES, StoreDef};
pub use sqlite::{RecordStorage, SqlitePool, connect};
