//! Schedule node domain model.
//!
//! # Responsibility
//! - Define the closed set of node kinds and their per-kind payloads.
//! - Encode the one-level nesting rule in the type system.
//!
//! # Invariants
//! - `id` is unique across the top-level sequence and every nested child.
//! - Branch children and block side events are `LeafNode`s, never containers.
//! - A node's kind never changes after creation.
//! - `duration` is opaque display text and is never parsed.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable node identifier.
///
/// Ids are caller-generated strings; fresh ones come from a time-ordered
/// source so they sort by creation within one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh identifier from the time-ordered UUID source.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Derives a child identifier, e.g. `abc-1` for branch child one of `abc`.
    pub fn derive(&self, suffix: impl Display) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Discriminant for every node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Point-in-time marker.
    Time,
    /// Actionable item.
    Task,
    /// Location stop.
    Place,
    /// Group of concurrent leaf activities.
    Branch,
    /// Resizable span hosting side events.
    Block,
}

impl NodeKind {
    /// Returns the leaf kind when this kind has no children.
    pub fn as_leaf(self) -> Option<LeafKind> {
        match self {
            Self::Time => Some(LeafKind::Time),
            Self::Task => Some(LeafKind::Task),
            Self::Place => Some(LeafKind::Place),
            Self::Branch | Self::Block => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Task => "task",
            Self::Place => "place",
            Self::Branch => "branch",
            Self::Block => "block",
        }
    }
}

/// Kinds allowed below a branch or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Time,
    Task,
    Place,
}

impl From<LeafKind> for NodeKind {
    fn from(value: LeafKind) -> Self {
        match value {
            LeafKind::Time => Self::Time,
            LeafKind::Task => Self::Task,
            LeafKind::Place => Self::Place,
        }
    }
}

/// Editable attributes shared by every kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeAttrs {
    /// Required display title.
    pub title: String,
    pub subtitle: Option<String>,
    /// Free-form label such as `30分钟`.
    pub duration: Option<String>,
    /// Icon key resolved by the renderer.
    pub icon: Option<String>,
    /// Color key resolved by the renderer.
    pub color: Option<String>,
    /// Draw the incoming connection dashed.
    pub dashed: bool,
}

impl NodeAttrs {
    /// Creates attributes with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Node that can live at any level of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub id: NodeId,
    pub kind: LeafKind,
    pub attrs: NodeAttrs,
}

impl LeafNode {
    pub fn new(id: NodeId, kind: LeafKind, attrs: NodeAttrs) -> Self {
        Self { id, kind, attrs }
    }
}

/// Kind-dependent payload of a top-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// Time, task or place: no children.
    Leaf(LeafKind),
    /// Concurrent sub-activities, normally two or three.
    Branch { branches: Vec<LeafNode> },
    /// Time span with interruptions and an optional size override.
    Block {
        side_events: Vec<LeafNode>,
        custom_width: Option<f64>,
        custom_height: Option<f64>,
    },
}

/// Top-level schedule node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub attrs: NodeAttrs,
    pub body: NodeBody,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match &self.body {
            NodeBody::Leaf(kind) => (*kind).into(),
            NodeBody::Branch { .. } => NodeKind::Branch,
            NodeBody::Block { .. } => NodeKind::Block,
        }
    }

    /// Nested children in display order; empty for leaves.
    pub fn children(&self) -> &[LeafNode] {
        match &self.body {
            NodeBody::Leaf(_) => &[],
            NodeBody::Branch { branches } => branches,
            NodeBody::Block { side_events, .. } => side_events,
        }
    }

    /// Mutable access to the nested child list, if this kind has one.
    pub fn children_mut(&mut self) -> Option<&mut Vec<LeafNode>> {
        match &mut self.body {
            NodeBody::Leaf(_) => None,
            NodeBody::Branch { branches } => Some(branches),
            NodeBody::Block { side_events, .. } => Some(side_events),
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.body, NodeBody::Leaf(_))
    }
}

impl From<LeafNode> for Node {
    fn from(value: LeafNode) -> Self {
        Self {
            id: value.id,
            attrs: value.attrs,
            body: NodeBody::Leaf(value.kind),
        }
    }
}

impl TryFrom<Node> for LeafNode {
    type Error = Node;

    /// Fails with the original node when it is a branch or block.
    fn try_from(value: Node) -> Result<Self, Self::Error> {
        match value.body {
            NodeBody::Leaf(kind) => Ok(Self {
                id: value.id,
                kind,
                attrs: value.attrs,
            }),
            _ => Err(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LeafKind, LeafNode, Node, NodeAttrs, NodeBody, NodeId, NodeKind};

    #[test]
    fn generated_ids_are_distinct() {
        let first = NodeId::generate();
        let second = NodeId::generate();
        assert_ne!(first, second);
        assert_eq!(first.derive(2).as_str(), format!("{first}-2"));
    }

    #[test]
    fn leaf_conversion_keeps_identity_and_refuses_containers() {
        let leaf = LeafNode::new("a".into(), LeafKind::Place, NodeAttrs::titled("Cafe"));
        let node = Node::from(leaf.clone());
        assert_eq!(node.kind(), NodeKind::Place);
        assert_eq!(LeafNode::try_from(node), Ok(leaf));

        let branch = Node {
            id: "b".into(),
            attrs: NodeAttrs::titled("Split"),
            body: NodeBody::Branch { branches: vec![] },
        };
        assert!(LeafNode::try_from(branch).is_err());
        assert_eq!(NodeKind::Block.as_leaf(), None);
    }
}
