//! Composite nodes: ordered children driven by a [`CompositePolicy`].

use core::fmt;

use arbor_graph::link::{NodeLink, NodeLinkSlot};
use arbor_graph::node::BranchId;

use crate::policy::CompositePolicy;
use crate::status::NodeStatus;

/// What a composite wants the tree to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeStep {
    /// Enter the child at `index`, reached through `link`.
    Push {
        /// Position of the child in the sorted child list.
        index: usize,
        /// Edge to the child, possibly through reroutes.
        link: NodeLink,
    },
    /// The composite is done with the given success flag.
    Finish(bool),
}

/// A node that runs its children one at a time.
///
/// `current_index` is either a valid index into `children` or `None`; every
/// mutation re-normalizes it.
pub struct CompositeNode {
    children: Vec<NodeLinkSlot>,
    current_index: Option<usize>,
    child_status: NodeStatus,
    policy: Option<Box<dyn CompositePolicy>>,
    /// The running child was disconnected and `current_index` already names
    /// its successor.
    running_removed: bool,
}

impl CompositeNode {
    /// Creates a composite with no children.
    #[must_use]
    pub fn new(policy: Box<dyn CompositePolicy>) -> Self {
        Self {
            children: Vec::new(),
            current_index: None,
            child_status: NodeStatus::Running,
            policy: Some(policy),
            running_removed: false,
        }
    }

    /// Creates a composite with no policy. It fails whenever it runs.
    #[must_use]
    pub fn without_policy() -> Self {
        Self {
            children: Vec::new(),
            current_index: None,
            child_status: NodeStatus::Running,
            policy: None,
            running_removed: false,
        }
    }

    /// Returns the policy's registry name, if a policy is attached.
    #[must_use]
    pub fn policy_name(&self) -> Option<&'static str> {
        self.policy.as_ref().map(|policy| policy.name())
    }

    /// Replaces the policy.
    pub fn set_policy(&mut self, policy: Box<dyn CompositePolicy>) {
        self.policy = Some(policy);
    }

    /// Returns the child edges in execution order.
    #[must_use]
    pub fn children(&self) -> &[NodeLinkSlot] {
        &self.children
    }

    /// Returns the index of the child that runs or ran last.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Returns the status of the most recently finished child.
    #[must_use]
    pub fn child_status(&self) -> NodeStatus {
        self.child_status
    }

    /// Iterates over the child links in execution order.
    pub fn child_links(&self) -> impl Iterator<Item = NodeLink> + '_ {
        self.children.iter().map(|slot| slot.link)
    }

    fn normalize(&self, index: Option<usize>) -> Option<usize> {
        index.filter(|&index| index < self.children.len())
    }

    /// Prepares the composite to run.
    ///
    /// A fresh activation, or an activation by a lower-priority abort,
    /// restarts from the policy's first index. An activation on an
    /// interrupt path keeps the previous index; the tree positions it with
    /// [`on_interrupt`](Self::on_interrupt) right after.
    pub fn on_activate(&mut self, interrupt: bool, is_revaluator: bool) {
        self.running_removed = false;
        if interrupt && !is_revaluator {
            return;
        }
        let begin = match self.policy.as_mut() {
            Some(policy) => {
                policy.on_activate();
                policy.begin_index(self.children.len())
            }
            None => None,
        };
        self.current_index = self.normalize(begin);
        self.child_status = NodeStatus::Running;
    }

    /// Called when the composite leaves the execution stack.
    pub fn on_deactivate(&mut self) {
        self.child_status = NodeStatus::Running;
    }

    /// Decides the next step.
    pub fn on_execute(&mut self) -> CompositeStep {
        let Some(policy) = self.policy.as_mut() else {
            tracing::warn!("composite has no policy, finishing with failure");
            return CompositeStep::Finish(false);
        };

        if let Some(index) = self.current_index
            && let Some(slot) = self.children.get(index)
            && policy.can_execute(self.child_status)
        {
            return CompositeStep::Push {
                index,
                link: slot.link,
            };
        }

        let success = policy.finish_status(self.child_status);
        policy.on_finish(success);
        CompositeStep::Finish(success)
    }

    /// Records a finished child and advances the index.
    ///
    /// If the finished child was disconnected while it ran, the index is
    /// left on the child that took its place.
    pub fn on_child_executed(&mut self, status: NodeStatus) {
        self.child_status = status;
        let stay = core::mem::take(&mut self.running_removed);
        let len = self.children.len();
        let next = match (self.policy.as_mut(), self.current_index) {
            (Some(policy), Some(index)) => {
                policy.on_child_executed(index, status);
                if stay {
                    Some(index)
                } else {
                    policy.next_index(index, len)
                }
            }
            _ => None,
        };
        self.current_index = self.normalize(next);
    }

    /// Repositions the composite onto the branch at `child_index`, which is
    /// taking over execution from a lower-priority branch.
    pub fn on_interrupt(&mut self, child_index: usize) {
        let index = self
            .policy
            .as_ref()
            .map(|policy| policy.interrupt_index(child_index));
        self.current_index = self.normalize(index);
        self.child_status = NodeStatus::Running;
        self.running_removed = false;
    }

    /// Appends a child edge.
    ///
    /// Children are kept in `sort_key` order from the next
    /// [`sort_children`](Self::sort_children) call.
    pub fn connect_child(&mut self, branch: BranchId, target: NodeLink, sort_key: i32) {
        self.children.push(NodeLinkSlot::new(branch, target, sort_key));
    }

    /// Removes the child edge with the given branch id.
    ///
    /// Removing an earlier child shifts the running index so it keeps
    /// pointing at the same child. Removing the running child keeps the
    /// numeric index, so the following child takes its place and runs once
    /// the removed child finishes.
    pub fn disconnect_child(&mut self, branch: BranchId) -> Option<NodeLinkSlot> {
        let position = self
            .children
            .iter()
            .position(|slot| slot.branch_id == branch)?;
        let removed = self.children.remove(position);

        let index = match self.current_index {
            Some(current) if position < current => Some(current - 1),
            Some(current) if position == current => {
                self.running_removed = true;
                Some(current)
            }
            other => other,
        };
        self.current_index = self.normalize(index);
        Some(removed)
    }

    /// Returns the child edge with the given branch id.
    #[must_use]
    pub fn child(&self, branch: BranchId) -> Option<&NodeLinkSlot> {
        self.children.iter().find(|slot| slot.branch_id == branch)
    }

    /// Stable-sorts children by `sort_key`, keeping the running index on the
    /// same branch.
    pub fn sort_children(&mut self) {
        let running = self
            .current_index
            .and_then(|index| self.children.get(index))
            .map(|slot| slot.branch_id);
        self.children.sort_by_key(|slot| slot.sort_key);
        if let Some(branch) = running {
            self.current_index = self
                .children
                .iter()
                .position(|slot| slot.branch_id == branch);
        }
    }
}

impl fmt::Debug for CompositeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeNode")
            .field("policy", &self.policy_name())
            .field("children", &self.children)
            .field("current_index", &self.current_index)
            .field("child_status", &self.child_status)
            .field("running_removed", &self.running_removed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Selector, Sequence};
    use arbor_graph::node::NodeId;

    fn branch(raw: u32) -> BranchId {
        BranchId::from_raw(raw).unwrap()
    }

    fn link(raw: u32) -> NodeLink {
        NodeLink::to(NodeId::from_raw(raw).unwrap())
    }

    fn with_children(policy: Box<dyn CompositePolicy>, count: u32) -> CompositeNode {
        let mut node = CompositeNode::new(policy);
        for i in 1..=count {
            node.connect_child(branch(i), link(i + 10), 0);
        }
        node
    }

    #[test]
    fn sequence_walks_until_failure() {
        let mut node = with_children(Box::new(Sequence), 3);
        node.on_activate(false, false);

        let mut indices = vec![node.current_index()];
        for status in [NodeStatus::Success, NodeStatus::Success, NodeStatus::Failure] {
            assert!(matches!(node.on_execute(), CompositeStep::Push { .. }));
            node.on_child_executed(status);
            indices.push(node.current_index());
        }

        assert_eq!(indices, vec![Some(0), Some(1), Some(2), None]);
        assert_eq!(node.on_execute(), CompositeStep::Finish(false));
    }

    #[test]
    fn selector_stops_at_first_success() {
        let mut node = with_children(Box::new(Selector), 3);
        node.on_activate(false, false);

        node.on_child_executed(NodeStatus::Failure);
        node.on_child_executed(NodeStatus::Success);
        assert_eq!(node.current_index(), Some(2));
        assert_eq!(node.on_execute(), CompositeStep::Finish(true));
    }

    #[test]
    fn missing_policy_fails() {
        let mut node = CompositeNode::without_policy();
        node.connect_child(branch(1), link(11), 0);
        node.on_activate(false, false);
        assert_eq!(node.on_execute(), CompositeStep::Finish(false));
    }

    #[test]
    fn interrupt_activation_keeps_index() {
        let mut node = with_children(Box::new(Sequence), 3);
        node.on_activate(false, false);
        node.on_child_executed(NodeStatus::Success);
        node.on_child_executed(NodeStatus::Success);

        node.on_activate(true, false);
        assert_eq!(node.current_index(), Some(2));

        node.on_activate(true, true);
        assert_eq!(node.current_index(), Some(0));

        node.on_interrupt(1);
        assert_eq!(node.current_index(), Some(1));
        node.on_interrupt(7);
        assert_eq!(node.current_index(), None);
    }

    #[test]
    fn disconnect_rederives_index() {
        let mut node = with_children(Box::new(Sequence), 3);
        node.on_activate(false, false);
        node.on_child_executed(NodeStatus::Success);
        assert_eq!(node.current_index(), Some(1));

        node.disconnect_child(branch(1)).unwrap();
        assert_eq!(node.current_index(), Some(0));
        assert_eq!(node.children()[0].branch_id, branch(2));

        // Running child removed, last slot: index falls off the end.
        node.on_child_executed(NodeStatus::Success);
        assert_eq!(node.current_index(), Some(1));
        node.disconnect_child(branch(3)).unwrap();
        assert_eq!(node.current_index(), None);

        assert!(node.disconnect_child(branch(9)).is_none());
    }

    #[test]
    fn successor_of_removed_running_child_runs_next() {
        let mut node = with_children(Box::new(Sequence), 3);
        node.on_activate(false, false);
        node.on_child_executed(NodeStatus::Success);
        assert_eq!(node.current_index(), Some(1));

        node.disconnect_child(branch(2)).unwrap();
        assert_eq!(node.current_index(), Some(1));

        // The removed child reports back; its successor is next in line.
        node.on_child_executed(NodeStatus::Success);
        assert_eq!(node.current_index(), Some(1));
        assert_eq!(
            node.on_execute(),
            CompositeStep::Push {
                index: 1,
                link: link(13)
            }
        );

        node.on_child_executed(NodeStatus::Success);
        assert_eq!(node.current_index(), None);
        assert_eq!(node.on_execute(), CompositeStep::Finish(true));
    }

    #[test]
    fn sort_follows_running_branch() {
        let mut node = CompositeNode::new(Box::new(Sequence));
        node.connect_child(branch(1), link(11), 20);
        node.connect_child(branch(2), link(12), 10);
        node.connect_child(branch(3), link(13), 10);
        node.on_activate(false, false);
        assert_eq!(node.current_index(), Some(0));

        node.sort_children();
        let order: Vec<_> = node.children().iter().map(|slot| slot.branch_id).collect();
        assert_eq!(order, vec![branch(2), branch(3), branch(1)]);
        assert_eq!(node.current_index(), Some(2));
    }
}
