//! Canvas geometry: viewport transform, pointer gestures and map layout.
//!
//! # Responsibility
//! - Pure math from pointer/wheel input to pan/zoom state.
//! - Serpentine placement of nodes for the map view.

pub mod gesture;
pub mod snake;
pub mod viewport;

pub use gesture::{GestureUpdate, PointerGesture};
pub use snake::{snake_path, snake_position, PathSegment, SnakeCell, SnakeLayout};
pub use viewport::{ViewMode, Viewport};
