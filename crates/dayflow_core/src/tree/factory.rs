//! Default node construction for palette drops and child growth.
//!
//! # Invariants
//! - Field defaults are deterministic per kind; only ids vary.
//! - New branch nodes always start with exactly two children.

use crate::model::node::{LeafKind, LeafNode, Node, NodeAttrs, NodeBody, NodeId, NodeKind};

/// Default title of a generated branch child.
pub const BRANCH_CHILD_TITLE: &str = "并行任务";
/// Default title of a generated side event.
pub const SIDE_EVENT_TITLE: &str = "插入事件";

const INITIAL_BRANCH_CHILDREN: usize = 2;

/// Builds fresh nodes with default attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactory;

impl NodeFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a top-level node of `kind` with a freshly generated id.
    pub fn create(&self, kind: NodeKind) -> Node {
        self.create_with_id(kind, NodeId::generate())
    }

    /// Creates a top-level node of `kind` with a caller-provided id.
    pub fn create_with_id(&self, kind: NodeKind, id: NodeId) -> Node {
        let attrs = default_attrs(kind);
        let body = match kind.as_leaf() {
            Some(leaf) => NodeBody::Leaf(leaf),
            None if kind == NodeKind::Branch => NodeBody::Branch {
                branches: (1..=INITIAL_BRANCH_CHILDREN)
                    .map(|index| self.branch_child(id.derive(index)))
                    .collect(),
            },
            None => NodeBody::Block {
                side_events: Vec::new(),
                custom_width: None,
                custom_height: None,
            },
        };
        Node { id, attrs, body }
    }

    /// Creates a default concurrent activity for a branch.
    pub fn branch_child(&self, id: NodeId) -> LeafNode {
        LeafNode::new(id, LeafKind::Task, task_attrs(BRANCH_CHILD_TITLE))
    }

    /// Creates a default side event for a block.
    pub fn side_event(&self, id: NodeId) -> LeafNode {
        LeafNode::new(id, LeafKind::Task, task_attrs(SIDE_EVENT_TITLE))
    }
}

fn task_attrs(title: &str) -> NodeAttrs {
    NodeAttrs {
        title: title.to_string(),
        ..default_attrs(NodeKind::Task)
    }
}

fn default_attrs(kind: NodeKind) -> NodeAttrs {
    let (title, duration, icon, color) = match kind {
        NodeKind::Time => ("09:00", None, "clock", "blue"),
        NodeKind::Task => ("新任务", Some("30分钟"), "check-circle", "green"),
        NodeKind::Place => ("新地点", None, "map-pin", "orange"),
        NodeKind::Branch => ("并行分支", None, "git-branch", "purple"),
        NodeKind::Block => ("时间块", Some("1小时"), "layers", "slate"),
    };
    NodeAttrs {
        title: title.to_string(),
        subtitle: None,
        duration: duration.map(str::to_string),
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        dashed: false,
    }
}
