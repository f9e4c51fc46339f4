//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: query layer over the connection pool

pub mod models;
pub mod schema;
pub mod store;

pub use models::{Package, Profile, Role, Session, SessionStatus, Subscription};
pub use schema::SQLITE_INIT;
pub use store::{CampusStorage, NewSession, SqlitePool};
