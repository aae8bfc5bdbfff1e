//! The behaviour tree runtime.
//!
//! A [`BehaviourTree`] owns its node graph, an execution stack with the root
//! at the bottom, a blackboard and a frame clock. Each [`tick`](BehaviourTree::tick):
//!
//! 1. advances the clock,
//! 2. renumbers nodes depth-first ([`calculate_priority`](BehaviourTree::calculate_priority)),
//! 3. re-checks decorators with abort flags,
//! 4. steps the stack until an action reports [`NodeStatus::Running`], the
//!    root finishes or the step budget is spent.
//!
//! ```
//! use arbor_behaviour_tree::prelude::*;
//!
//! let mut tree = BehaviourTree::new();
//! let sequence = tree.add_composite("Sequence", Sequence);
//! let first = tree.add_action("First", Constant(NodeStatus::Success));
//! let second = tree.add_action("Second", Constant(NodeStatus::Success));
//!
//! tree.connect(tree.root(), sequence, 0).unwrap();
//! tree.connect(sequence, first, 0).unwrap();
//! tree.connect(sequence, second, 1).unwrap();
//!
//! tree.play();
//! let result = tree.tick();
//! assert_eq!(result.finished, Some(NodeStatus::Success));
//! ```

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use arbor_core::{Blackboard, FrameClock, TreeConfig};
use arbor_graph::error::ValidationError;
use arbor_graph::graph::NodeGraph;
use arbor_graph::hooks::{ExitReason, GraphEvent, HooksAPI};
use arbor_graph::instance::{GraphInstanceId, PlayState};
use arbor_graph::link::{NodeLink, NodeLinkSlot, NodeLinks};
use arbor_graph::node::{BranchId, NodeId};
use arbor_graph::resolver::resolve;
use hashbrown::HashSet;

use crate::action::ActionBehaviour;
use crate::composite::{CompositeNode, CompositeStep};
use crate::context::TickContext;
use crate::decorator::{AbortFlags, Decorator, DecoratorSlot};
use crate::error::TreeError;
use crate::node::{ActionNode, RootNode, TreeNode, TreeNodeKind};
use crate::policy::{CompositePolicy, PolicyRegistry};
use crate::status::NodeStatus;

/// Summary of one [`BehaviourTree::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickResult {
    /// Number of stack steps taken.
    pub steps: usize,
    /// Node on top of the stack after the tick.
    pub current: Option<NodeId>,
    /// Set when the root's child finished during this tick.
    pub finished: Option<NodeStatus>,
}

enum Step {
    Continue,
    Yield,
    Finished(NodeStatus),
}

enum Plan {
    Push(NodeLink),
    Finish(NodeStatus),
    Execute,
    Done(NodeStatus),
}

#[derive(Clone, Copy)]
struct Frame {
    delta: Duration,
    elapsed: Duration,
    frame: u64,
}

impl Frame {
    fn of(clock: &FrameClock) -> Self {
        Self {
            delta: clock.delta(),
            elapsed: clock.elapsed(),
            frame: clock.frame(),
        }
    }

    fn context(self, blackboard: &mut Blackboard) -> TickContext<'_> {
        TickContext {
            blackboard,
            delta: self.delta,
            elapsed: self.elapsed,
            frame: self.frame,
        }
    }
}

fn exit_reason(status: NodeStatus) -> ExitReason {
    if status == NodeStatus::Success {
        ExitReason::Success
    } else {
        ExitReason::Failure
    }
}

/// A behaviour tree instance.
pub struct BehaviourTree {
    instance: GraphInstanceId,
    graph: NodeGraph<TreeNode>,
    root: NodeId,
    stack: Vec<NodeId>,
    state: PlayState,
    pending_restart: bool,
    last_result: Option<NodeStatus>,
    clock: FrameClock,
    blackboard: Blackboard,
    config: TreeConfig,
    policies: PolicyRegistry,
    hooks: Option<Arc<HooksAPI>>,
    span: tracing::Span,
}

impl Default for BehaviourTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviourTree {
    /// Creates an empty tree holding only its root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Creates an empty tree with the given configuration.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        let instance = GraphInstanceId::new();
        let mut graph = NodeGraph::new();
        let root = graph.add_node("Root", TreeNode::new(TreeNodeKind::Root(RootNode::default())));
        let span = tracing::debug_span!("behaviour_tree", graph = %instance);

        Self {
            instance,
            graph,
            root,
            stack: Vec::new(),
            state: PlayState::Stopped,
            pending_restart: false,
            last_result: None,
            clock: FrameClock::default(),
            blackboard: Blackboard::new(),
            config,
            policies: PolicyRegistry::with_builtins(),
            hooks: None,
            span,
        }
    }

    /// Replaces the generated instance id.
    #[must_use]
    pub fn with_instance_id(mut self, instance: GraphInstanceId) -> Self {
        self.span = tracing::debug_span!("behaviour_tree", graph = %instance);
        self.instance = instance;
        self
    }

    /// Uses `clock` for frame time.
    #[must_use]
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Starts with the given blackboard contents.
    #[must_use]
    pub fn with_blackboard(mut self, blackboard: Blackboard) -> Self {
        self.blackboard = blackboard;
        self
    }

    /// Uses `policies` for [`add_composite_named`](Self::add_composite_named).
    #[must_use]
    pub fn with_policies(mut self, policies: PolicyRegistry) -> Self {
        self.policies = policies;
        self
    }

    /// Dispatches lifecycle events to `hooks`.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<HooksAPI>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the instance id.
    #[must_use]
    pub fn instance(&self) -> &GraphInstanceId {
        &self.instance
    }

    /// Returns the root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node graph.
    #[must_use]
    pub fn graph(&self) -> &NodeGraph<TreeNode> {
        &self.graph
    }

    /// Returns the node graph mutably, for renaming nodes and editing
    /// reroutes.
    pub fn graph_mut(&mut self) -> &mut NodeGraph<TreeNode> {
        &mut self.graph
    }

    /// Returns a node's payload.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.graph.behaviour(id)
    }

    /// Returns the typed behaviour of an action node.
    #[must_use]
    pub fn action<T: ActionBehaviour>(&self, id: NodeId) -> Option<&T> {
        self.graph
            .behaviour(id)?
            .as_action()?
            .behaviour()?
            .downcast_ref::<T>()
    }

    /// Returns the typed behaviour of an action node mutably.
    pub fn action_mut<T: ActionBehaviour>(&mut self, id: NodeId) -> Option<&mut T> {
        self.graph
            .behaviour_mut(id)?
            .as_action_mut()?
            .behaviour_mut()?
            .downcast_mut::<T>()
    }

    /// Returns the depth-first order from the last priority pass.
    #[must_use]
    pub fn priority(&self, id: NodeId) -> Option<u32> {
        self.graph.behaviour(id).and_then(TreeNode::priority)
    }

    /// Returns the play state.
    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Returns whether the tree is playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Returns whether the tree is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == PlayState::Paused
    }

    /// Returns the result of the last completed run.
    #[must_use]
    pub fn last_result(&self) -> Option<NodeStatus> {
        self.last_result
    }

    /// Returns the execution stack, root first.
    #[must_use]
    pub fn active_path(&self) -> &[NodeId] {
        &self.stack
    }

    /// Returns the node on top of the execution stack.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// Returns the blackboard.
    #[must_use]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// Returns the blackboard mutably.
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Returns the frame clock.
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Returns the policy registry.
    pub fn policies_mut(&mut self) -> &mut PolicyRegistry {
        &mut self.policies
    }

    /// Checks the graph for dangling links, unconnected child edges and
    /// reroute cycles.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in node id order.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        self.graph.validate()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authoring
    // ─────────────────────────────────────────────────────────────────────

    fn add(&mut self, name: impl Into<String>, kind: TreeNodeKind) -> NodeId {
        let id = self.graph.add_node(name, TreeNode::new(kind));
        tracing::trace!(node = %id, "tree node added");
        id
    }

    /// Adds a composite node.
    pub fn add_composite(
        &mut self,
        name: impl Into<String>,
        policy: impl CompositePolicy + 'static,
    ) -> NodeId {
        self.add_composite_boxed(name, Box::new(policy))
    }

    /// Adds a composite node with a boxed policy.
    pub fn add_composite_boxed(
        &mut self,
        name: impl Into<String>,
        policy: Box<dyn CompositePolicy>,
    ) -> NodeId {
        self.add(name, TreeNodeKind::Composite(CompositeNode::new(policy)))
    }

    /// Adds a composite node whose policy is looked up by name.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownPolicy`] if the registry has no such policy.
    pub fn add_composite_named(
        &mut self,
        name: impl Into<String>,
        policy: &str,
    ) -> Result<NodeId, TreeError> {
        let policy = self.policies.create(policy)?;
        Ok(self.add_composite_boxed(name, policy))
    }

    /// Adds an action node.
    pub fn add_action(
        &mut self,
        name: impl Into<String>,
        behaviour: impl ActionBehaviour,
    ) -> NodeId {
        self.add(
            name,
            TreeNodeKind::Action(ActionNode::new(Box::new(behaviour))),
        )
    }

    /// Adds a reroute node.
    pub fn add_reroute(&mut self, name: impl Into<String>, link: impl Into<NodeLink>) -> NodeId {
        self.graph.add_reroute(name, link.into())
    }

    /// Points a reroute at a new target.
    ///
    /// # Errors
    ///
    /// Fails if `reroute` is not a reroute or the link would close a cycle.
    pub fn connect_reroute(
        &mut self,
        reroute: NodeId,
        link: impl Into<NodeLink>,
    ) -> Result<(), TreeError> {
        self.graph.connect_reroute(reroute, link.into())?;
        Ok(())
    }

    /// Adds a child edge from `parent` to `child`.
    ///
    /// Children run in ascending `sort_key` order; ties keep insertion order.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NodeNotFound`] if `parent` does not exist
    /// - [`TreeError::NotAParent`] if `parent` is an action or a reroute
    /// - [`TreeError::RootOccupied`] if `parent` is the root and already has a child
    /// - [`TreeError::Graph`] if branch ids are exhausted
    pub fn connect(
        &mut self,
        parent: NodeId,
        child: impl Into<NodeLink>,
        sort_key: i32,
    ) -> Result<BranchId, TreeError> {
        let link = child.into();
        if !self.graph.contains(parent) {
            return Err(TreeError::NodeNotFound(parent));
        }
        match self.graph.behaviour(parent).map(TreeNode::kind) {
            Some(TreeNodeKind::Root(root)) if root.child.is_some() => {
                return Err(TreeError::RootOccupied(parent));
            }
            Some(TreeNodeKind::Root(_) | TreeNodeKind::Composite(_)) => {}
            Some(TreeNodeKind::Action(_)) | None => return Err(TreeError::NotAParent(parent)),
        }

        let branch = self.graph.allocate_branch_id()?;
        match self.graph.behaviour_mut(parent).map(TreeNode::kind_mut) {
            Some(TreeNodeKind::Root(root)) => {
                root.child = Some(NodeLinkSlot::new(branch, link, sort_key));
            }
            Some(TreeNodeKind::Composite(composite)) => {
                composite.connect_child(branch, link, sort_key);
            }
            Some(TreeNodeKind::Action(_)) | None => return Err(TreeError::NotAParent(parent)),
        }
        tracing::debug!(node = %parent, branch = %branch, %link, "child connected");
        Ok(branch)
    }

    /// Removes the child edge `branch` from `parent` and returns its link.
    ///
    /// A running child keeps running until it finishes on its own.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::BranchNotFound`] if `parent` has no such edge.
    pub fn disconnect(&mut self, parent: NodeId, branch: BranchId) -> Result<NodeLink, TreeError> {
        let node = self
            .graph
            .behaviour_mut(parent)
            .ok_or(TreeError::NodeNotFound(parent))?;
        let removed = match &mut node.kind {
            TreeNodeKind::Root(root) => root
                .child
                .take_if(|slot| slot.branch_id == branch),
            TreeNodeKind::Composite(composite) => composite.disconnect_child(branch),
            TreeNodeKind::Action(_) => return Err(TreeError::NotAParent(parent)),
        };
        let slot = removed.ok_or(TreeError::BranchNotFound {
            node: parent,
            branch,
        })?;
        tracing::debug!(node = %parent, branch = %branch, "child disconnected");
        Ok(slot.link)
    }

    /// Attaches a decorator to a node.
    ///
    /// # Errors
    ///
    /// Fails if the node does not exist, is a reroute or is the root.
    pub fn add_decorator(
        &mut self,
        node: NodeId,
        decorator: impl Decorator + 'static,
        abort: AbortFlags,
    ) -> Result<(), TreeError> {
        if node == self.root {
            return Err(TreeError::RootDecorator(node));
        }
        let target = self
            .graph
            .behaviour_mut(node)
            .ok_or(TreeError::NodeNotFound(node))?;
        target
            .decorators
            .push(DecoratorSlot::new(Box::new(decorator), abort));
        Ok(())
    }

    /// Removes a node. Links that pointed at it become dangling.
    ///
    /// An active node is interrupted first, together with everything above
    /// it on the stack, and its parent sees a failure.
    ///
    /// # Errors
    ///
    /// Fails for the root and for unknown ids.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::CannotRemoveRoot(id));
        }
        if !self.graph.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }
        if let Some(depth) = self.stack.iter().position(|&active| active == id) {
            self.unwind_to(depth, ExitReason::Interrupted);
            self.deliver_child_result(NodeStatus::Failure);
        }
        self.graph.remove_node(id);
        tracing::debug!(node = %id, "tree node removed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hosting
    // ─────────────────────────────────────────────────────────────────────

    /// Starts the tree, or resumes it if paused.
    pub fn play(&mut self) {
        match self.state {
            PlayState::Playing => {}
            PlayState::Paused => self.resume(),
            PlayState::Stopped => {
                let span = self.span.clone();
                let _guard = span.enter();
                self.clock.reset();
                self.state = PlayState::Playing;
                self.begin();
            }
        }
    }

    /// Runs one frame.
    ///
    /// Does nothing unless the tree is playing.
    pub fn tick(&mut self) -> TickResult {
        let mut result = TickResult::default();
        if self.state != PlayState::Playing {
            return result;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.clock.advance();
        if self.pending_restart {
            self.pending_restart = false;
            self.begin();
        }

        self.calculate_priority();
        self.revaluate_self();
        self.revaluate_lower_priority();

        while result.steps < self.config.max_steps_per_tick {
            result.steps += 1;
            match self.step() {
                Step::Continue => {}
                Step::Yield => break,
                Step::Finished(status) => {
                    result.finished = Some(status);
                    break;
                }
            }
        }
        if result.steps == self.config.max_steps_per_tick {
            tracing::trace!(steps = result.steps, "step budget spent");
        }

        result.current = self.current();
        result
    }

    /// Freezes the tree in place.
    pub fn pause(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        self.state = PlayState::Paused;
        self.clock.pause();
        for &id in &self.stack {
            if let Some(behaviour) = self
                .graph
                .behaviour_mut(id)
                .and_then(TreeNode::as_action_mut)
                .and_then(ActionNode::behaviour_mut)
            {
                behaviour.on_pause();
            }
        }
        tracing::debug!(graph = %self.instance, "tree paused");
        self.emit(|graph| GraphEvent::GraphPaused { graph });
    }

    /// Continues a paused tree.
    pub fn resume(&mut self) {
        if self.state != PlayState::Paused {
            return;
        }
        self.state = PlayState::Playing;
        self.clock.resume();
        for &id in &self.stack {
            if let Some(behaviour) = self
                .graph
                .behaviour_mut(id)
                .and_then(TreeNode::as_action_mut)
                .and_then(ActionNode::behaviour_mut)
            {
                behaviour.on_resume();
            }
        }
        tracing::debug!(graph = %self.instance, "tree resumed");
        self.emit(|graph| GraphEvent::GraphResumed { graph });
    }

    /// Interrupts every active node, leaf first, and resets the tree.
    pub fn stop(&mut self) {
        if self.state == PlayState::Stopped {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.unwind_to(0, ExitReason::Stopped);
        self.state = PlayState::Stopped;
        self.pending_restart = false;
        self.clock.reset();
        tracing::debug!("tree stopped");
        self.emit(|graph| GraphEvent::GraphStop { graph });
    }

    /// Stops and plays again.
    pub fn restart(&mut self) {
        self.stop();
        self.play();
    }

    /// Renumbers every node reachable from the root in depth-first order.
    ///
    /// Composite children are sorted by `sort_key` on the way. Unreachable
    /// nodes lose their priority and parent. Running this twice without
    /// editing the graph gives the same numbering.
    pub fn calculate_priority(&mut self) {
        for id in self.graph.ids() {
            if let Some(node) = self.graph.behaviour_mut(id) {
                node.priority = None;
                node.parent = None;
            }
        }

        let mut visited = HashSet::new();
        let mut order: u32 = 0;
        let mut pending = vec![(self.root, None)];
        while let Some((id, parent)) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.graph.behaviour_mut(id) else {
                continue;
            };
            node.priority = Some(order);
            node.parent = parent;
            order = order.saturating_add(1);
            if let Some(composite) = node.as_composite_mut() {
                composite.sort_children();
            }

            let links = node.links();
            for link in links.into_iter().rev() {
                if let Some(child) = resolve(&self.graph, link).target() {
                    pending.push((child, Some(id)));
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────

    fn emit(&self, event: impl FnOnce(GraphInstanceId) -> GraphEvent) {
        if let Some(hooks) = &self.hooks {
            hooks.dispatch(&event(self.instance.clone()));
        }
    }

    fn node_name(&self, id: NodeId) -> String {
        self.graph
            .get_node(id)
            .map(|node| node.name().to_string())
            .unwrap_or_default()
    }

    fn begin(&mut self) {
        tracing::debug!(nodes = self.graph.node_count(), "tree started");
        self.emit(|graph| GraphEvent::GraphStart {
            graph,
            node_count: self.graph.node_count(),
        });
        self.enter(self.root, false, false);
    }

    /// Activates `id` and pushes it. Returns `false` if the node could not
    /// be entered, in which case it counts as a failed child.
    fn enter(&mut self, id: NodeId, interrupt: bool, is_revaluator: bool) -> bool {
        let frame = Frame::of(&self.clock);
        let Some(node) = self.graph.behaviour_mut(id) else {
            tracing::warn!(node = %id, "cannot enter missing node");
            return false;
        };
        if node.active {
            tracing::warn!(node = %id, "node is already active, re-entry counted as failure");
            return false;
        }

        let mut ctx = frame.context(&mut self.blackboard);
        let passed = node
            .decorators
            .iter_mut()
            .fold(true, |passed, slot| slot.evaluate(&ctx) && passed);
        if !passed {
            tracing::debug!(node = %id, "decorator rejected node");
            return false;
        }

        node.active = true;
        match &mut node.kind {
            TreeNodeKind::Root(root) => root.reset(),
            TreeNodeKind::Composite(composite) => composite.on_activate(interrupt, is_revaluator),
            TreeNodeKind::Action(action) => {
                if let Some(behaviour) = action.behaviour.as_mut() {
                    behaviour.on_start(&mut ctx);
                }
            }
        }
        self.stack.push(id);

        tracing::trace!(node = %id, depth = self.stack.len(), "node entered");
        self.emit(|graph| GraphEvent::NodeEnter {
            graph,
            node_id: id,
            node_name: self.node_name(id),
        });
        true
    }

    /// Pops and deactivates the top of the stack.
    fn exit(&mut self, reason: ExitReason) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let frame = Frame::of(&self.clock);
        if let Some(node) = self.graph.behaviour_mut(id) {
            node.active = false;
            match &mut node.kind {
                TreeNodeKind::Root(_) => {}
                TreeNodeKind::Composite(composite) => composite.on_deactivate(),
                TreeNodeKind::Action(action) => {
                    if let Some(behaviour) = action.behaviour.as_mut() {
                        let interrupted =
                            matches!(reason, ExitReason::Interrupted | ExitReason::Stopped);
                        let mut ctx = frame.context(&mut self.blackboard);
                        behaviour.on_end(&mut ctx, interrupted);
                    }
                }
            }
        }

        tracing::trace!(node = %id, %reason, "node exited");
        self.emit(|graph| GraphEvent::NodeExit {
            graph,
            node_id: id,
            node_name: self.node_name(id),
            reason,
        });
        Some(id)
    }

    fn unwind_to(&mut self, len: usize, reason: ExitReason) {
        while self.stack.len() > len {
            self.exit(reason);
        }
    }

    /// Hands a finished child's status to the node now on top of the stack.
    fn deliver_child_result(&mut self, status: NodeStatus) {
        let Some(&parent) = self.stack.last() else {
            return;
        };
        match self.graph.behaviour_mut(parent).map(TreeNode::kind_mut) {
            Some(TreeNodeKind::Root(root)) => root.result = Some(status),
            Some(TreeNodeKind::Composite(composite)) => composite.on_child_executed(status),
            Some(TreeNodeKind::Action(_)) | None => {
                tracing::warn!(node = %parent, "child result delivered to a node without children");
            }
        }
    }

    fn step(&mut self) -> Step {
        let Some(&top) = self.stack.last() else {
            return Step::Yield;
        };

        let plan = match self.graph.behaviour_mut(top).map(TreeNode::kind_mut) {
            Some(TreeNodeKind::Root(root)) => match root.result {
                Some(status) => Plan::Done(status),
                None if !root.started => {
                    root.started = true;
                    Plan::Push(root.child.map_or(NodeLink::UNCONNECTED, |slot| slot.link))
                }
                // Child left without reporting.
                None => Plan::Done(NodeStatus::Failure),
            },
            Some(TreeNodeKind::Composite(composite)) => match composite.on_execute() {
                CompositeStep::Push { link, .. } => Plan::Push(link),
                CompositeStep::Finish(success) => Plan::Finish(NodeStatus::from_success(success)),
            },
            Some(TreeNodeKind::Action(_)) => Plan::Execute,
            None => Plan::Finish(NodeStatus::Failure),
        };

        match plan {
            Plan::Push(link) => {
                self.push_child(top, link);
                Step::Continue
            }
            Plan::Finish(status) => {
                self.finish_top(status);
                Step::Continue
            }
            Plan::Execute => self.execute_action(top),
            Plan::Done(status) => {
                self.finish_tree(status);
                Step::Finished(status)
            }
        }
    }

    fn push_child(&mut self, parent: NodeId, link: NodeLink) {
        match resolve(&self.graph, link).target() {
            Some(child) => {
                if !self.enter(child, false, false) {
                    self.deliver_child_result(NodeStatus::Failure);
                }
            }
            None => {
                tracing::debug!(node = %parent, %link, "child link unresolved, counted as failure");
                self.deliver_child_result(NodeStatus::Failure);
            }
        }
    }

    fn finish_top(&mut self, status: NodeStatus) {
        self.exit(exit_reason(status));
        self.deliver_child_result(status);
    }

    fn execute_action(&mut self, id: NodeId) -> Step {
        let frame = Frame::of(&self.clock);
        let mut ctx = frame.context(&mut self.blackboard);
        let status = match self
            .graph
            .behaviour_mut(id)
            .and_then(TreeNode::as_action_mut)
            .and_then(|action| action.behaviour.as_mut())
        {
            Some(behaviour) => behaviour.on_execute(&mut ctx),
            None => {
                tracing::warn!(node = %id, "action has no behaviour, finishing with failure");
                NodeStatus::Failure
            }
        };

        if status == NodeStatus::Running {
            tracing::trace!(node = %id, "action running");
            return Step::Yield;
        }
        self.finish_top(status);
        Step::Continue
    }

    fn finish_tree(&mut self, status: NodeStatus) {
        self.exit(exit_reason(status));
        self.last_result = Some(status);
        tracing::debug!(%status, "tree finished");

        if self.config.restart_on_finish {
            self.pending_restart = true;
        } else {
            self.stop();
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Conditional aborts
    // ─────────────────────────────────────────────────────────────────────

    /// Aborts the lowest active node whose self-abort condition turned false.
    fn revaluate_self(&mut self) {
        let frame = Frame::of(&self.clock);
        let ctx = frame.context(&mut self.blackboard);

        let mut abort_at = None;
        for (depth, &id) in self.stack.iter().enumerate() {
            let Some(node) = self.graph.behaviour_mut(id) else {
                continue;
            };
            let turned_false = node
                .decorators
                .iter_mut()
                .filter(|slot| slot.abort().contains(AbortFlags::SELF))
                .fold(false, |hit, slot| slot.revaluate(&ctx) == Some(false) || hit);
            if turned_false {
                abort_at = Some((depth, id));
                break;
            }
        }

        let Some((depth, id)) = abort_at else {
            return;
        };
        tracing::debug!(node = %id, "condition turned false, aborting node");
        self.unwind_to(depth, ExitReason::Interrupted);
        self.deliver_child_result(NodeStatus::Failure);
    }

    /// Switches to the highest-priority inactive node whose lower-priority
    /// abort condition turned true.
    fn revaluate_lower_priority(&mut self) {
        let Some(leaf_priority) = self
            .stack
            .last()
            .and_then(|&leaf| self.graph.behaviour(leaf))
            .and_then(TreeNode::priority)
        else {
            return;
        };

        let frame = Frame::of(&self.clock);
        let ctx = frame.context(&mut self.blackboard);
        let mut candidate: Option<(u32, NodeId)> = None;
        for id in self.graph.ids() {
            let Some(node) = self.graph.behaviour_mut(id) else {
                continue;
            };
            let Some(priority) = node.priority else {
                continue;
            };
            if node.active || priority >= leaf_priority {
                continue;
            }
            let turned_true = node
                .decorators
                .iter_mut()
                .filter(|slot| slot.abort().contains(AbortFlags::LOWER_PRIORITY))
                .fold(false, |hit, slot| slot.revaluate(&ctx) == Some(true) || hit);
            if turned_true && candidate.is_none_or(|(best, _)| priority < best) {
                candidate = Some((priority, id));
            }
        }

        if let Some((_, id)) = candidate {
            self.interrupt_with(id);
        }
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        let composite = self.graph.behaviour(parent)?.as_composite()?;
        composite
            .children()
            .iter()
            .position(|slot| resolve(&self.graph, slot.link).target() == Some(child))
    }

    /// Unwinds to the nearest active ancestor of `candidate` and enters the
    /// path down to it.
    fn interrupt_with(&mut self, candidate: NodeId) {
        let mut path = vec![candidate];
        let mut cursor = candidate;
        let ancestor = loop {
            let Some(parent) = self.graph.behaviour(cursor).and_then(TreeNode::parent) else {
                return;
            };
            if self.graph.behaviour(parent).is_some_and(TreeNode::is_active) {
                break parent;
            }
            path.push(parent);
            cursor = parent;
        };
        let Some(depth) = self.stack.iter().position(|&id| id == ancestor) else {
            return;
        };
        path.reverse();

        tracing::debug!(node = %candidate, ancestor = %ancestor, "lower-priority branch interrupted");
        self.unwind_to(depth + 1, ExitReason::Interrupted);
        self.emit(|graph| GraphEvent::Interrupt {
            graph,
            interrupted: ancestor,
            by: candidate,
        });

        let mut parent = ancestor;
        for (position, &id) in path.iter().enumerate() {
            let Some(index) = self.child_index(parent, id) else {
                tracing::warn!(node = %id, parent = %parent, "interrupt path no longer connected");
                return;
            };
            if let Some(composite) = self
                .graph
                .behaviour_mut(parent)
                .and_then(TreeNode::as_composite_mut)
            {
                composite.on_interrupt(index);
            }
            let is_revaluator = position + 1 == path.len();
            if !self.enter(id, true, is_revaluator) {
                self.deliver_child_result(NodeStatus::Failure);
                return;
            }
            parent = id;
        }
    }
}

impl fmt::Debug for BehaviourTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviourTree")
            .field("instance", &self.instance)
            .field("state", &self.state)
            .field("stack", &self.stack)
            .field("nodes", &self.graph.node_count())
            .field("last_result", &self.last_result)
            .finish_non_exhaustive()
    }
}
