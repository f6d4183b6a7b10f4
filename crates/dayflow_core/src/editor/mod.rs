//! Editing surface: controller and delete confirmation.

pub mod confirm;
pub mod controller;

pub use confirm::{DeleteConfirmation, DeleteRequest};
pub use controller::{Editor, EditorError, LayoutSummary, MAX_BRANCH_COUNT, MIN_BRANCH_COUNT};
