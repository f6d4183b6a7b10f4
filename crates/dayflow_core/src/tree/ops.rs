//! Pure mutation algebra over a top-level node sequence.
//!
//! # Responsibility
//! - Find, update, delete, insert and move nodes across one nesting level.
//! - Provide the kind-specific child operations for branches and blocks.
//!
//! # Invariants
//! - Every function returns a new sequence and never mutates its input.
//! - Unknown ids are a silent no-op; unknown anchors degrade to append.
//! - Node kinds are never changed by an update.

use crate::model::node::{LeafNode, Node, NodeBody, NodeId};
use crate::tree::factory::NodeFactory;
use log::{debug, warn};
use std::collections::HashSet;

/// Where an inserted node lands relative to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    /// End of the top-level sequence, anchor ignored.
    Append,
}

impl DropPosition {
    /// Resolves the drop side from a pointer coordinate on the primary axis.
    ///
    /// Strictly before the zone midpoint is `Before`; at or after is `After`.
    pub fn from_pointer(pointer: f64, zone_start: f64, zone_extent: f64) -> Self {
        let midpoint = zone_start + zone_extent / 2.0;
        if pointer < midpoint {
            Self::Before
        } else {
            Self::After
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Append => "append",
        }
    }
}

/// Finds a node by id, searching the top level before nested children.
///
/// Nested matches are returned as standalone leaf nodes.
pub fn find_node(nodes: &[Node], id: &NodeId) -> Option<Node> {
    if let Some(node) = nodes.iter().find(|node| &node.id == id) {
        return Some(node.clone());
    }
    nodes
        .iter()
        .flat_map(|node| node.children())
        .find(|child| &child.id == id)
        .map(|child| Node::from(child.clone()))
}

/// Lists every id in the sequence, nested children included, in tree order.
pub fn node_ids(nodes: &[Node]) -> Vec<&NodeId> {
    let mut ids = Vec::new();
    for node in nodes {
        ids.push(&node.id);
        ids.extend(node.children().iter().map(|child| &child.id));
    }
    ids
}

/// Replaces the node whose id matches `updated.id`.
pub fn update_node(nodes: &[Node], updated: &Node) -> Vec<Node> {
    if let Some(index) = nodes.iter().position(|node| node.id == updated.id) {
        let mut next = nodes.to_vec();
        if next[index].kind() != updated.kind() {
            warn!(
                "event=node_update module=tree status=rejected reason=kind_change id={} from={} to={}",
                updated.id,
                next[index].kind().as_str(),
                updated.kind().as_str()
            );
            return next;
        }
        next[index] = updated.clone();
        return next;
    }

    let replacement = match LeafNode::try_from(updated.clone()) {
        Ok(leaf) => leaf,
        Err(_) => {
            debug!(
                "event=node_update module=tree status=skipped reason=not_found id={}",
                updated.id
            );
            return nodes.to_vec();
        }
    };

    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if let Some(children) = node.children_mut() {
                for child in children.iter_mut() {
                    if child.id != replacement.id {
                        continue;
                    }
                    if child.kind != replacement.kind {
                        warn!(
                            "event=node_update module=tree status=rejected reason=kind_change id={}",
                            child.id
                        );
                        continue;
                    }
                    *child = replacement.clone();
                }
            }
            node
        })
        .collect()
}

/// Removes the node with `id` from the top level or from any container.
pub fn delete_node(nodes: &[Node], id: &NodeId) -> Vec<Node> {
    nodes
        .iter()
        .filter(|node| &node.id != id)
        .map(|node| {
            let mut node = node.clone();
            if let Some(children) = node.children_mut() {
                children.retain(|child| &child.id != id);
            }
            node
        })
        .collect()
}

/// Inserts `node` at the top level relative to `anchor`.
pub fn insert_node(
    nodes: &[Node],
    node: Node,
    anchor: Option<&NodeId>,
    position: DropPosition,
) -> Vec<Node> {
    let mut next = nodes.to_vec();
    let anchor_index = match (position, anchor) {
        (DropPosition::Append, _) | (_, None) => None,
        (_, Some(anchor)) => next.iter().position(|candidate| &candidate.id == anchor),
    };

    match (anchor_index, position) {
        (Some(index), DropPosition::Before) => next.insert(index, node),
        (Some(index), DropPosition::After) => next.insert(index + 1, node),
        _ => next.push(node),
    }
    next
}

/// Moves an existing node next to `anchor`, modeled as delete then insert.
///
/// Dropping a node onto itself, or moving an unknown id, is a no-op.
pub fn move_node(
    nodes: &[Node],
    id: &NodeId,
    anchor: Option<&NodeId>,
    position: DropPosition,
) -> Vec<Node> {
    if anchor == Some(id) {
        return nodes.to_vec();
    }
    let Some(node) = find_node(nodes, id) else {
        return nodes.to_vec();
    };
    let remaining = delete_node(nodes, id);
    insert_node(&remaining, node, anchor, position)
}

/// Appends a side event to the block with `block_id`.
pub fn add_side_event(nodes: &[Node], block_id: &NodeId, event: LeafNode) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if &node.id == block_id {
                if let NodeBody::Block { side_events, .. } = &mut node.body {
                    side_events.push(event.clone());
                }
            }
            node
        })
        .collect()
}

/// Grows or truncates the branch with `branch_id` to `count` children.
///
/// Existing children keep their position and content; new ones are default
/// leaves whose ids derive from the branch id, skipping any id already used
/// anywhere in the sequence.
pub fn set_branch_count(
    nodes: &[Node],
    branch_id: &NodeId,
    count: usize,
    factory: &NodeFactory,
) -> Vec<Node> {
    let mut taken: HashSet<NodeId> = node_ids(nodes).into_iter().cloned().collect();
    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if &node.id != branch_id {
                return node;
            }
            if let NodeBody::Branch { branches } = &mut node.body {
                branches.truncate(count);
                let mut suffix = branches.len() + 1;
                while branches.len() < count {
                    let mut child_id = branch_id.derive(suffix);
                    while taken.contains(&child_id) {
                        suffix += 1;
                        child_id = branch_id.derive(suffix);
                    }
                    taken.insert(child_id.clone());
                    branches.push(factory.branch_child(child_id));
                    suffix += 1;
                }
            }
            node
        })
        .collect()
}

/// Sets the custom footprint of the block with `block_id`.
pub fn resize_block(nodes: &[Node], block_id: &NodeId, width: f64, height: f64) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if &node.id == block_id {
                if let NodeBody::Block {
                    custom_width,
                    custom_height,
                    ..
                } = &mut node.body
                {
                    *custom_width = Some(width);
                    *custom_height = Some(height);
                }
            }
            node
        })
        .collect()
}
