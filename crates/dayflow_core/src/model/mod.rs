//! Schedule domain model.
//!
//! # Responsibility
//! - Define nodes, layouts and the persisted application root.
//! - Own the on-disk JSON shape of those types.
//!
//! # Invariants
//! - Node ids are unique across a layout, nested children included.
//! - Nesting depth is exactly one level and enforced by types.

pub mod layout;
pub mod node;
pub mod record;
