//! Pointer drag gestures: canvas panning and block resizing.
//!
//! # Invariants
//! - At most one gesture is active at a time.
//! - `pointer_up` always ends the gesture, whatever state it was in.
//! - Resize deltas are converted to world units using the zoom at move time.

use crate::config::BlockSizing;
use crate::model::node::NodeId;
use kurbo::{Point, Size, Vec2};

/// Active pointer gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerGesture {
    #[default]
    Idle,
    Panning {
        origin: Point,
        start_pan: Vec2,
    },
    Resizing {
        node_id: NodeId,
        origin: Point,
        start_size: Size,
    },
}

/// Effect of one pointer move.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureUpdate {
    None,
    Pan(Vec2),
    Resize { node_id: NodeId, size: Size },
}

impl PointerGesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Computes the update for the pointer now at `screen`.
    pub fn pointer_move(&self, screen: Point, zoom: f64, sizing: &BlockSizing) -> GestureUpdate {
        match self {
            Self::Idle => GestureUpdate::None,
            Self::Panning { origin, start_pan } => GestureUpdate::Pan(*start_pan + (screen - *origin)),
            Self::Resizing {
                node_id,
                origin,
                start_size,
            } => {
                let delta = (screen - *origin) / zoom;
                GestureUpdate::Resize {
                    node_id: node_id.clone(),
                    size: Size::new(
                        (start_size.width + delta.x).max(sizing.min_width),
                        (start_size.height + delta.y).max(sizing.min_height),
                    ),
                }
            }
        }
    }

    /// Ends the gesture and returns the one that was active.
    pub fn pointer_up(&mut self) -> Self {
        std::mem::take(self)
    }
}
