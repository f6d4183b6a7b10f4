//! Node-tree mutation algebra.
//!
//! # Responsibility
//! - Produce new node sequences for every structural edit.
//! - Build default nodes for palette drops and child growth.
//!
//! # Invariants
//! - Operations are total: edge cases fall back instead of failing.

pub mod factory;
pub mod ops;

pub use factory::NodeFactory;
pub use ops::{
    add_side_event, delete_node, find_node, insert_node, move_node, node_ids, resize_block,
    set_branch_count, update_node, DropPosition,
};
