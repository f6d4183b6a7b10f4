//! Persisted JSON shape of schedule nodes.
//!
//! # Responsibility
//! - Map the tagged `Node` union to the flat record stored on disk.
//! - Reject records that break the one-level nesting rule while decoding.
//!
//! # Invariants
//! - Optional attributes are omitted when empty and default when missing.
//! - `branches` is only accepted on `branch`, `sideEvents` only on `block`.
//! - Size overrides outside a block are ignored, at any depth.

use crate::model::node::{LeafNode, Node, NodeAttrs, NodeBody, NodeId, NodeKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures raised while decoding a node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A branch child or side event is itself a container.
    NestedContainer { parent: String, child: String },
    /// A leaf kind carries a child array or size override.
    UnexpectedField { id: String, field: &'static str },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NestedContainer { parent, child } => write!(
                f,
                "node `{child}` under `{parent}` must be a time, task or place node"
            ),
            Self::UnexpectedField { id, field } => {
                write!(f, "node `{id}` must not carry field `{field}`")
            }
        }
    }
}

impl Error for RecordError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: NodeId,
    #[serde(rename = "type")]
    kind: NodeKind,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    is_dashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branches: Option<Vec<NodeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    side_events: Option<Vec<NodeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_height: Option<f64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeRecord {
    fn bare(id: &NodeId, kind: NodeKind, attrs: &NodeAttrs) -> Self {
        Self {
            id: id.clone(),
            kind,
            title: attrs.title.clone(),
            subtitle: attrs.subtitle.clone(),
            duration: attrs.duration.clone(),
            icon: attrs.icon.clone(),
            color: attrs.color.clone(),
            is_dashed: attrs.dashed,
            branches: None,
            side_events: None,
            custom_width: None,
            custom_height: None,
        }
    }

    fn from_leaf(leaf: &LeafNode) -> Self {
        Self::bare(&leaf.id, leaf.kind.into(), &leaf.attrs)
    }

    fn from_node(node: &Node) -> Self {
        let mut record = Self::bare(&node.id, node.kind(), &node.attrs);
        match &node.body {
            NodeBody::Leaf(_) => {}
            NodeBody::Branch { branches } => {
                record.branches = Some(branches.iter().map(Self::from_leaf).collect());
            }
            NodeBody::Block {
                side_events,
                custom_width,
                custom_height,
            } => {
                record.side_events = Some(side_events.iter().map(Self::from_leaf).collect());
                record.custom_width = *custom_width;
                record.custom_height = *custom_height;
            }
        }
        record
    }

    fn attrs(&self) -> NodeAttrs {
        NodeAttrs {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            duration: self.duration.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            dashed: self.is_dashed,
        }
    }

    fn reject_field(&self, present: bool, field: &'static str) -> Result<(), RecordError> {
        if present {
            return Err(RecordError::UnexpectedField {
                id: self.id.to_string(),
                field,
            });
        }
        Ok(())
    }

    fn into_leaf(self, parent: &NodeId) -> Result<LeafNode, RecordError> {
        let kind = self
            .kind
            .as_leaf()
            .ok_or_else(|| RecordError::NestedContainer {
                parent: parent.to_string(),
                child: self.id.to_string(),
            })?;
        self.reject_field(self.branches.is_some(), "branches")?;
        self.reject_field(self.side_events.is_some(), "sideEvents")?;
        Ok(LeafNode::new(self.id.clone(), kind, self.attrs()))
    }

    fn into_node(self) -> Result<Node, RecordError> {
        let attrs = self.attrs();
        let body = match self.kind.as_leaf() {
            Some(kind) => {
                self.reject_field(self.branches.is_some(), "branches")?;
                self.reject_field(self.side_events.is_some(), "sideEvents")?;
                NodeBody::Leaf(kind)
            }
            None if self.kind == NodeKind::Branch => {
                self.reject_field(self.side_events.is_some(), "sideEvents")?;
                let branches = self
                    .branches
                    .unwrap_or_default()
                    .into_iter()
                    .map(|child| child.into_leaf(&self.id))
                    .collect::<Result<Vec<_>, _>>()?;
                NodeBody::Branch { branches }
            }
            None => {
                self.reject_field(self.branches.is_some(), "branches")?;
                let side_events = self
                    .side_events
                    .unwrap_or_default()
                    .into_iter()
                    .map(|child| child.into_leaf(&self.id))
                    .collect::<Result<Vec<_>, _>>()?;
                NodeBody::Block {
                    side_events,
                    custom_width: self.custom_width,
                    custom_height: self.custom_height,
                }
            }
        };
        Ok(Node {
            id: self.id,
            attrs,
            body,
        })
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRecord::from_node(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        NodeRecord::deserialize(deserializer)?
            .into_node()
            .map_err(serde::de::Error::custom)
    }
}
