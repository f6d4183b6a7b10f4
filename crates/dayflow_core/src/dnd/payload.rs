//! Drag payload carried through the platform drag-data channel.

use crate::model::node::{NodeId, NodeKind};
use log::warn;
use serde::{Deserialize, Serialize};

/// Surface a drag started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragSource {
    /// Palette tool; carries only a kind.
    Sidebar,
    /// Existing node on the canvas; carries its id.
    Canvas,
}

/// Structured drag message `{ source, id?, type }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub source: DragSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl DragPayload {
    /// Payload for a palette tool of `kind`.
    pub fn sidebar(kind: NodeKind) -> Self {
        Self {
            source: DragSource::Sidebar,
            id: None,
            kind,
        }
    }

    /// Payload for an existing canvas node.
    pub fn canvas(id: NodeId, kind: NodeKind) -> Self {
        Self {
            source: DragSource::Canvas,
            id: Some(id),
            kind,
        }
    }

    /// Id of the dragged node when it came from the canvas.
    pub fn canvas_id(&self) -> Option<&NodeId> {
        match self.source {
            DragSource::Canvas => self.id.as_ref(),
            DragSource::Sidebar => None,
        }
    }

    /// Serializes the payload for the drag-data channel.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parses channel data; foreign or malformed data yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(
                    "event=drag_payload_decode module=dnd status=error len={} error={}",
                    raw.len(),
                    err
                );
                None
            }
        }
    }
}
