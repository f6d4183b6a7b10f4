//! Drag-and-drop reordering protocol.
//!
//! # Responsibility
//! - Carry drag payloads across the platform drag-data channel.
//! - Resolve hover position, trash arming and the final drop action.
//!
//! # See also
//! - `tree::ops` for how drop actions become sequence edits.

pub mod coordinator;
pub mod payload;

pub use coordinator::{DragCoordinator, DragState, DropAction};
pub use payload::{DragPayload, DragSource};
