//! Property tests for composite indices and priority numbering.

use arbor_behaviour_tree::prelude::*;
use arbor_graph::link::NodeLink;
use arbor_graph::node::{BranchId, NodeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Activate { interrupt: bool, is_revaluator: bool },
    Execute,
    ChildExecuted(NodeStatus),
    Interrupt(usize),
    Connect(i32),
    Disconnect(usize),
    Sort,
}

fn status() -> impl Strategy<Value = NodeStatus> {
    prop_oneof![
        Just(NodeStatus::Running),
        Just(NodeStatus::Success),
        Just(NodeStatus::Failure),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), any::<bool>()).prop_map(|(interrupt, is_revaluator)| Op::Activate {
            interrupt,
            is_revaluator
        }),
        Just(Op::Execute),
        status().prop_map(Op::ChildExecuted),
        (0_usize..10).prop_map(Op::Interrupt),
        (-5_i32..5).prop_map(Op::Connect),
        (0_usize..10).prop_map(Op::Disconnect),
        Just(Op::Sort),
    ]
}

fn policy(name: usize) -> &'static str {
    [
        "sequence",
        "selector",
        "parallel",
        "parallel_any",
        "memory_sequence",
        "memory_selector",
    ][name % 6]
}

proptest! {
    #[test]
    fn current_index_stays_in_bounds(
        policy_index in 0_usize..6,
        initial in 0_usize..6,
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let registry = PolicyRegistry::with_builtins();
        let mut node = CompositeNode::new(registry.create(policy(policy_index)).unwrap());
        let mut next_branch = 1_u32;
        let target = NodeLink::to(NodeId::from_raw(99).unwrap());

        for _ in 0..initial {
            node.connect_child(BranchId::from_raw(next_branch).unwrap(), target, 0);
            next_branch += 1;
        }

        for op in ops {
            match op {
                Op::Activate { interrupt, is_revaluator } => node.on_activate(interrupt, is_revaluator),
                Op::Execute => {
                    if let CompositeStep::Push { index, .. } = node.on_execute() {
                        prop_assert!(index < node.children().len());
                    }
                }
                Op::ChildExecuted(status) => node.on_child_executed(status),
                Op::Interrupt(index) => node.on_interrupt(index),
                Op::Connect(sort_key) => {
                    node.connect_child(BranchId::from_raw(next_branch).unwrap(), target, sort_key);
                    next_branch += 1;
                }
                Op::Disconnect(position) => {
                    let branch = node.children().get(position).map(|slot| slot.branch_id);
                    if let Some(branch) = branch {
                        node.disconnect_child(branch);
                    }
                }
                Op::Sort => node.sort_children(),
            }
            let len = node.children().len();
            prop_assert!(node.current_index().is_none_or(|index| index < len));
        }
    }

    #[test]
    fn priority_numbering_is_idempotent(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 1..24),
        keys in prop::collection::vec(-3_i32..3, 24),
    ) {
        let mut tree = BehaviourTree::new();
        let mut composites = vec![tree.add_composite("c0", Sequence)];
        tree.connect(tree.root(), composites[0], 0).unwrap();

        for (i, parent) in parents.iter().enumerate() {
            let parent = composites[parent.index(composites.len())];
            let child = if i % 3 == 0 {
                tree.add_action(format!("a{i}"), Constant(NodeStatus::Success))
            } else {
                let id = tree.add_composite(format!("c{i}"), Selector);
                composites.push(id);
                id
            };
            tree.connect(parent, child, keys[i]).unwrap();
        }

        tree.calculate_priority();
        let first: Vec<_> = tree.graph().ids().into_iter().map(|id| tree.priority(id)).collect();
        tree.calculate_priority();
        let second: Vec<_> = tree.graph().ids().into_iter().map(|id| tree.priority(id)).collect();

        prop_assert_eq!(&first, &second);

        let mut numbers: Vec<u32> = first.into_iter().flatten().collect();
        numbers.sort_unstable();
        let expected: Vec<u32> = (0..numbers.len() as u32).collect();
        prop_assert_eq!(numbers, expected);
    }
}
