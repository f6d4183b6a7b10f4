//! Persistence of layouts to a key-value store.

pub mod adapter;

pub use adapter::{
    LoadSource, LoadedState, PersistError, PersistenceAdapter, SaveStatus, SaveTrigger,
    LEGACY_STORAGE_KEY, STORAGE_KEY,
};
