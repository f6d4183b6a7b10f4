//! Core of the Dayflow timeline editor.
//! Node tree, drag/drop, canvas geometry and persistence, with no UI
//! toolkit dependency.

pub mod config;
pub mod db;
pub mod dnd;
pub mod editor;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod persist;
pub mod store;
pub mod timer;
pub mod tree;

pub use config::{ConfigError, EditorConfig};
pub use dnd::{DragCoordinator, DragPayload, DragSource, DragState, DropAction};
pub use editor::{Editor, EditorError, LayoutSummary};
pub use geometry::{SnakeLayout, ViewMode, Viewport};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::layout::{AppData, Layout, LayoutId};
pub use model::node::{LeafKind, LeafNode, Node, NodeAttrs, NodeBody, NodeId, NodeKind};
pub use persist::{PersistError, PersistenceAdapter, SaveStatus};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use timer::{Clock, ManualClock, SystemClock};
pub use tree::{DropPosition, NodeFactory};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
