//! Drag-and-drop state machine.
//!
//! # Responsibility
//! - Track the in-flight drag, its hover target and the resolved position.
//! - Turn a drop into a single tree action for the controller to apply.
//!
//! # Invariants
//! - States are `Idle`, `Dragging`, `Hovering` and `OverTrash`; hovering a
//!   node and hovering the trash are mutually exclusive by construction.
//! - Every drop and cancel returns the machine to `Idle`.
//! - Hover events received while `Idle` are ignored.

use crate::dnd::payload::{DragPayload, DragSource};
use crate::model::node::NodeId;
use crate::tree::DropPosition;
use log::debug;

/// Current phase of a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging over empty canvas or outside any drop zone.
    Dragging { payload: DragPayload },
    /// Over a concrete node's drop zone.
    Hovering {
        payload: DragPayload,
        target: NodeId,
        position: DropPosition,
    },
    /// Over the trash zone.
    OverTrash { payload: DragPayload },
}

impl DragState {
    fn payload(&self) -> Option<&DragPayload> {
        match self {
            Self::Idle => None,
            Self::Dragging { payload }
            | Self::Hovering { payload, .. }
            | Self::OverTrash { payload } => Some(payload),
        }
    }
}

/// Tree action resolved from a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    /// Nothing to apply.
    None,
    /// Insert a new node or move an existing one.
    Insert {
        payload: DragPayload,
        target: Option<NodeId>,
        position: DropPosition,
    },
    /// Remove the dragged canvas node.
    Delete(NodeId),
}

/// Drag-and-drop coordinator.
#[derive(Debug, Default)]
pub struct DragCoordinator {
    state: DragState,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Whether the trash zone should render armed.
    pub fn is_over_trash(&self) -> bool {
        matches!(self.state, DragState::OverTrash { .. })
    }

    /// Current hover target and side, if any.
    pub fn hover_target(&self) -> Option<(&NodeId, DropPosition)> {
        match &self.state {
            DragState::Hovering {
                target, position, ..
            } => Some((target, *position)),
            _ => None,
        }
    }

    /// Enters `Dragging` and returns the encoded channel data.
    pub fn begin(&mut self, payload: DragPayload) -> String {
        let encoded = payload.encode();
        debug!(
            "event=drag_start module=dnd status=ok source={:?} kind={}",
            payload.source,
            payload.kind.as_str()
        );
        self.state = DragState::Dragging { payload };
        encoded
    }

    /// Pointer over a node's drop zone spanning `zone_start..zone_start+zone_extent`
    /// on the primary axis.
    pub fn hover_node(&mut self, target: NodeId, pointer: f64, zone_start: f64, zone_extent: f64) {
        if self.is_over_trash() {
            return;
        }
        let Some(payload) = self.state.payload().cloned() else {
            return;
        };
        let position = DropPosition::from_pointer(pointer, zone_start, zone_extent);
        self.state = DragState::Hovering {
            payload,
            target,
            position,
        };
    }

    /// Pointer over empty canvas space: clears any node target.
    pub fn hover_canvas(&mut self) {
        if self.is_over_trash() {
            return;
        }
        if let Some(payload) = self.state.payload().cloned() {
            self.state = DragState::Dragging { payload };
        }
    }

    pub fn enter_trash(&mut self) {
        if let Some(payload) = self.state.payload().cloned() {
            self.state = DragState::OverTrash { payload };
        }
    }

    pub fn leave_trash(&mut self) {
        if let DragState::OverTrash { payload } = &self.state {
            self.state = DragState::Dragging {
                payload: payload.clone(),
            };
        }
    }

    /// Abandons the drag without producing an action.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Resolves a drop using the payload read back from the drag channel.
    ///
    /// Falls back to the payload recorded at `begin` when the channel data
    /// cannot be decoded. Always leaves the machine `Idle`.
    pub fn drop(&mut self, channel_data: &str) -> DropAction {
        let state = std::mem::take(&mut self.state);
        let Some(payload) = DragPayload::decode(channel_data).or_else(|| state.payload().cloned())
        else {
            return DropAction::None;
        };

        let action = match state {
            DragState::Idle => DropAction::None,
            DragState::OverTrash { .. } => match payload.canvas_id() {
                Some(id) => DropAction::Delete(id.clone()),
                None => DropAction::None,
            },
            DragState::Hovering {
                target, position, ..
            } => {
                if payload.canvas_id() == Some(&target) {
                    DropAction::None
                } else {
                    DropAction::Insert {
                        payload,
                        target: Some(target),
                        position,
                    }
                }
            }
            DragState::Dragging { .. } => match payload.source {
                DragSource::Sidebar => DropAction::Insert {
                    payload,
                    target: None,
                    position: DropPosition::Append,
                },
                DragSource::Canvas => DropAction::None,
            },
        };
        debug!("event=drop module=dnd status=ok action={:?}", action);
        action
    }
}
