use dayflow_core::tree::{self, DropPosition, NodeFactory};
use dayflow_core::{AppData, Node, NodeId, NodeKind};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add(NodeKind),
    Delete(usize),
    Move { from: usize, to: usize, after: bool },
    Branches { index: usize, count: usize },
    SideEvent(usize),
}

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Time),
        Just(NodeKind::Task),
        Just(NodeKind::Place),
        Just(NodeKind::Branch),
        Just(NodeKind::Block),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        kind_strategy().prop_map(Op::Add),
        any::<usize>().prop_map(Op::Delete),
        (any::<usize>(), any::<usize>(), any::<bool>())
            .prop_map(|(from, to, after)| Op::Move { from, to, after }),
        (any::<usize>(), 0usize..6).prop_map(|(index, count)| Op::Branches { index, count }),
        any::<usize>().prop_map(Op::SideEvent),
    ]
}

fn all_ids(nodes: &[Node]) -> Vec<NodeId> {
    tree::node_ids(nodes).into_iter().cloned().collect()
}

fn pick(ids: &[NodeId], index: usize) -> Option<NodeId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

fn apply(nodes: Vec<Node>, op: &Op, factory: &NodeFactory) -> Vec<Node> {
    let ids = all_ids(&nodes);
    let top: Vec<NodeId> = nodes.iter().map(|node| node.id.clone()).collect();
    match op {
        Op::Add(kind) => tree::insert_node(&nodes, factory.create(*kind), None, DropPosition::Append),
        Op::Delete(index) => match pick(&ids, *index) {
            Some(id) => tree::delete_node(&nodes, &id),
            None => nodes,
        },
        Op::Move { from, to, after } => match (pick(&ids, *from), pick(&top, *to)) {
            (Some(id), Some(anchor)) => {
                let position = if *after {
                    DropPosition::After
                } else {
                    DropPosition::Before
                };
                tree::move_node(&nodes, &id, Some(&anchor), position)
            }
            _ => nodes,
        },
        Op::Branches { index, count } => match pick(&top, *index) {
            Some(id) => tree::set_branch_count(&nodes, &id, *count, factory),
            None => nodes,
        },
        Op::SideEvent(index) => match pick(&top, *index) {
            Some(id) => tree::add_side_event(&nodes, &id, factory.side_event(NodeId::generate())),
            None => nodes,
        },
    }
}

fn build(ops: &[Op]) -> Vec<Node> {
    let factory = NodeFactory::new();
    let start = AppData::builtin().layouts[0].nodes.clone();
    ops.iter().fold(start, |nodes, op| apply(nodes, op, &factory))
}

proptest! {
    #[test]
    fn ids_stay_unique_under_any_edit_sequence(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let nodes = build(&ops);
        let ids = all_ids(&nodes);
        let unique: HashSet<&NodeId> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn delete_removes_target_everywhere_and_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..30),
        choice in any::<usize>(),
    ) {
        let nodes = build(&ops);
        let ids = all_ids(&nodes);
        let Some(target) = pick(&ids, choice) else {
            return Ok(());
        };

        let after = tree::delete_node(&nodes, &target);
        prop_assert!(tree::find_node(&after, &target).is_none());
        prop_assert_eq!(tree::delete_node(&after, &target), after.clone());

        // Nothing else disappears except the target's own children.
        let removed_children: HashSet<NodeId> = nodes
            .iter()
            .filter(|node| node.id == target)
            .flat_map(|node| node.children().iter().map(|child| child.id.clone()))
            .collect();
        let remaining: HashSet<NodeId> = all_ids(&after).into_iter().collect();
        for id in ids {
            if id != target && !removed_children.contains(&id) {
                prop_assert!(remaining.contains(&id));
            }
        }
    }

    #[test]
    fn update_changes_only_the_target(
        ops in prop::collection::vec(op_strategy(), 0..30),
        choice in any::<usize>(),
    ) {
        let nodes = build(&ops);
        let ids = all_ids(&nodes);
        let Some(target) = pick(&ids, choice) else {
            return Ok(());
        };

        let mut edited = tree::find_node(&nodes, &target).expect("picked id exists");
        edited.attrs.title = "edited".to_string();
        let after = tree::update_node(&nodes, &edited);

        for id in all_ids(&nodes) {
            let before_node = tree::find_node(&nodes, &id).expect("id exists before");
            let after_node = tree::find_node(&after, &id).expect("id exists after");
            if id == target {
                prop_assert_eq!(after_node.attrs.title.as_str(), "edited");
            } else {
                prop_assert_eq!(after_node.attrs, before_node.attrs);
            }
        }
    }
}
