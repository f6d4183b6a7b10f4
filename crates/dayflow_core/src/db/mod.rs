//! SQLite bootstrap for the durable key-value store.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Connections are handed out only after migrations succeed.
//!
//! Failures surface as `StoreError`, the store layer's single error type.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
