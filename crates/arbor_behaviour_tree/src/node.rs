//! Behaviour tree node payloads.

use core::fmt;

use arbor_graph::link::{NodeLink, NodeLinkSlot, NodeLinks};
use arbor_graph::node::NodeId;

use crate::action::ActionBehaviour;
use crate::composite::CompositeNode;
use crate::decorator::DecoratorSlot;
use crate::status::NodeStatus;

/// Entry point of a tree. Runs its single child and reports its result.
#[derive(Debug, Default)]
pub struct RootNode {
    pub(crate) child: Option<NodeLinkSlot>,
    pub(crate) started: bool,
    pub(crate) result: Option<NodeStatus>,
}

impl RootNode {
    /// Returns the child edge, if connected.
    #[must_use]
    pub fn child(&self) -> Option<&NodeLinkSlot> {
        self.child.as_ref()
    }

    pub(crate) fn reset(&mut self) {
        self.started = false;
        self.result = None;
    }
}

/// Leaf node holding an [`ActionBehaviour`].
#[derive(Default)]
pub struct ActionNode {
    pub(crate) behaviour: Option<Box<dyn ActionBehaviour>>,
}

impl ActionNode {
    /// Wraps a behaviour.
    #[must_use]
    pub fn new(behaviour: Box<dyn ActionBehaviour>) -> Self {
        Self {
            behaviour: Some(behaviour),
        }
    }

    /// Returns the attached behaviour.
    #[must_use]
    pub fn behaviour(&self) -> Option<&dyn ActionBehaviour> {
        self.behaviour.as_deref()
    }

    /// Returns the attached behaviour mutably.
    pub fn behaviour_mut(&mut self) -> Option<&mut (dyn ActionBehaviour + 'static)> {
        self.behaviour.as_deref_mut()
    }
}

impl fmt::Debug for ActionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionNode")
            .field("has_behaviour", &self.behaviour.is_some())
            .finish()
    }
}

/// The three node roles in a tree.
#[derive(Debug)]
pub enum TreeNodeKind {
    /// The tree's entry point.
    Root(RootNode),
    /// A node with ordered children.
    Composite(CompositeNode),
    /// A leaf that does work.
    Action(ActionNode),
}

/// Payload of every non-reroute node in a behaviour tree graph.
#[derive(Debug)]
pub struct TreeNode {
    pub(crate) kind: TreeNodeKind,
    pub(crate) decorators: Vec<DecoratorSlot>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) priority: Option<u32>,
    pub(crate) active: bool,
}

impl TreeNode {
    /// Creates an inactive node.
    #[must_use]
    pub fn new(kind: TreeNodeKind) -> Self {
        Self {
            kind,
            decorators: Vec::new(),
            parent: None,
            priority: None,
            active: false,
        }
    }

    /// Returns the node's role.
    #[must_use]
    pub fn kind(&self) -> &TreeNodeKind {
        &self.kind
    }

    /// Returns the node's role mutably.
    pub fn kind_mut(&mut self) -> &mut TreeNodeKind {
        &mut self.kind
    }

    /// Returns the attached decorators.
    #[must_use]
    pub fn decorators(&self) -> &[DecoratorSlot] {
        &self.decorators
    }

    /// Returns the parent found by the last priority pass.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the depth-first execution order from the last priority pass.
    ///
    /// Smaller numbers run first. `None` for nodes unreachable from the root.
    #[must_use]
    pub fn priority(&self) -> Option<u32> {
        self.priority
    }

    /// Returns whether the node is on the execution stack.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the composite payload, if this is a composite.
    #[must_use]
    pub fn as_composite(&self) -> Option<&CompositeNode> {
        match &self.kind {
            TreeNodeKind::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Returns the composite payload mutably, if this is a composite.
    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeNode> {
        match &mut self.kind {
            TreeNodeKind::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Returns the action payload, if this is an action.
    #[must_use]
    pub fn as_action(&self) -> Option<&ActionNode> {
        match &self.kind {
            TreeNodeKind::Action(action) => Some(action),
            _ => None,
        }
    }

    /// Returns the action payload mutably, if this is an action.
    pub fn as_action_mut(&mut self) -> Option<&mut ActionNode> {
        match &mut self.kind {
            TreeNodeKind::Action(action) => Some(action),
            _ => None,
        }
    }
}

impl NodeLinks for TreeNode {
    fn links(&self) -> Vec<NodeLink> {
        match &self.kind {
            TreeNodeKind::Root(root) => root.child.iter().map(|slot| slot.link).collect(),
            TreeNodeKind::Composite(composite) => composite.child_links().collect(),
            TreeNodeKind::Action(_) => Vec::new(),
        }
    }
}
