//! The state machine runtime.
//!
//! A [`StateMachine`] owns a graph of [`State`]s, the current state, a
//! single [`TransitionReservation`] and a frame clock. The host drives it
//! with [`update`](StateMachine::update) and
//! [`late_update`](StateMachine::late_update) once per frame (or
//! [`tick`](StateMachine::tick), which does both):
//!
//! 1. `update` applies a reservation due at [`ReconcilePoint::NextUpdate`],
//!    then updates the current state and every resident state.
//! 2. `late_update` late-updates the same states, then applies a
//!    reservation due at [`ReconcilePoint::LateUpdate`].
//!
//! Behaviours request transitions through their [`StateContext`]. Requests
//! are processed right after the callback that made them returns.
//!
//! ```
//! use arbor_state_machine::prelude::*;
//!
//! let mut fsm = StateMachine::new();
//! let idle = fsm.add_state("Idle");
//! let alert = fsm.add_state("Alert");
//!
//! let link = StateLink::new("Spotted", TransitionTiming::Immediate).with_target(alert);
//! fsm.add_behaviour(idle, FlagTransition::new("spotted", link)).unwrap();
//!
//! fsm.start().unwrap();
//! fsm.tick();
//! assert_eq!(fsm.current(), Some(idle));
//!
//! fsm.blackboard_mut().set("spotted", true);
//! fsm.tick();
//! assert_eq!(fsm.current(), Some(alert));
//! ```

use core::fmt;
use std::sync::Arc;

use arbor_core::{Blackboard, FrameClock, FsmConfig};
use arbor_graph::error::ValidationError;
use arbor_graph::graph::NodeGraph;
use arbor_graph::hooks::{ExitReason, GraphEvent, HooksAPI};
use arbor_graph::instance::{GraphInstanceId, PlayState};
use arbor_graph::link::NodeLink;
use arbor_graph::node::NodeId;
use arbor_graph::resolver::resolve;

use crate::context::StateContext;
use crate::error::StateMachineError;
use crate::history::{TransitionHistory, TransitionRecord};
use crate::link::{ReconcilePoint, StateLink, TransitionTiming};
use crate::reservation::{
    ReserveOutcome, ReservedTransition, TransitionRequest, TransitionReservation,
};
use crate::state::{State, StateBehaviour};

/// Name recorded for the transition into the start state.
pub const START_LINK_NAME: &str = "Start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Update,
    LateUpdate,
}

#[derive(Debug, Clone, Copy)]
enum Callback {
    Awake,
    Begin,
    Update,
    LateUpdate,
    End,
}

impl Callback {
    fn is_frame(self) -> bool {
        matches!(self, Self::Update | Self::LateUpdate)
    }
}

/// A finite state machine instance.
pub struct StateMachine {
    instance: GraphInstanceId,
    graph: NodeGraph<State>,
    start: Option<NodeId>,
    current: Option<NodeId>,
    state: PlayState,
    reservation: TransitionReservation,
    requests: Vec<TransitionRequest>,
    phase: Phase,
    in_transition: bool,
    history: TransitionHistory,
    clock: FrameClock,
    blackboard: Blackboard,
    config: FsmConfig,
    hooks: Option<Arc<HooksAPI>>,
    span: tracing::Span,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Creates an empty state machine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FsmConfig::default())
    }

    /// Creates an empty state machine with the given configuration.
    #[must_use]
    pub fn with_config(config: FsmConfig) -> Self {
        let instance = GraphInstanceId::new();
        let span = tracing::debug_span!("state_machine", graph = %instance);

        Self {
            instance,
            graph: NodeGraph::new(),
            start: None,
            current: None,
            state: PlayState::Stopped,
            reservation: TransitionReservation::new(),
            requests: Vec::new(),
            phase: Phase::Idle,
            in_transition: false,
            history: TransitionHistory::new(config.history_capacity),
            clock: FrameClock::default(),
            blackboard: Blackboard::new(),
            config,
            hooks: None,
            span,
        }
    }

    /// Replaces the generated instance id.
    #[must_use]
    pub fn with_instance_id(mut self, instance: GraphInstanceId) -> Self {
        self.span = tracing::debug_span!("state_machine", graph = %instance);
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

    /// Returns the node graph.
    #[must_use]
    pub fn graph(&self) -> &NodeGraph<State> {
        &self.graph
    }

    /// Returns the node graph mutably, for renaming nodes and editing
    /// reroutes.
    pub fn graph_mut(&mut self) -> &mut NodeGraph<State> {
        &mut self.graph
    }

    /// Returns a state's payload.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&State> {
        self.graph.behaviour(id)
    }

    /// Returns the first behaviour of type `T` attached to `state`.
    #[must_use]
    pub fn behaviour<T: StateBehaviour>(&self, state: NodeId) -> Option<&T> {
        self.graph.behaviour(state)?.behaviour::<T>()
    }

    /// Returns the first behaviour of type `T` attached to `state` mutably.
    pub fn behaviour_mut<T: StateBehaviour>(&mut self, state: NodeId) -> Option<&mut T> {
        self.graph.behaviour_mut(state)?.behaviour_mut::<T>()
    }

    /// Returns the state entered by [`start`](Self::start).
    #[must_use]
    pub fn start_state(&self) -> Option<NodeId> {
        self.start
    }

    /// Returns the current state.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Returns the play state.
    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Returns whether the machine is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Returns whether the machine is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == PlayState::Paused
    }

    /// Returns the pending reservation.
    #[must_use]
    pub fn reservation(&self) -> Option<&ReservedTransition> {
        self.reservation.pending()
    }

    /// Returns the recent transitions.
    #[must_use]
    pub fn history(&self) -> &TransitionHistory {
        &self.history
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
    pub fn config(&self) -> &FsmConfig {
        &self.config
    }

    /// Checks the graph for dangling and unconnected state links and
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

    /// Adds a state. The first regular state added becomes the start state.
    pub fn add_state(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.graph.add_node(name, State::new());
        if self.start.is_none() {
            self.start = Some(id);
        }
        tracing::trace!(state = %id, "state added");
        id
    }

    /// Adds a resident state.
    pub fn add_resident_state(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.graph.add_node(name, State::resident());
        tracing::trace!(state = %id, "resident state added");
        id
    }

    /// Attaches a behaviour to a state and returns its index.
    ///
    /// # Errors
    ///
    /// Fails if `state` does not exist or is a reroute.
    pub fn add_behaviour(
        &mut self,
        state: NodeId,
        behaviour: impl StateBehaviour,
    ) -> Result<usize, StateMachineError> {
        let node = self.state_mut(state)?;
        node.behaviours.push(Box::new(behaviour));
        Ok(node.behaviours.len() - 1)
    }

    /// Chooses the state entered by [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Fails for unknown ids, reroutes and resident states.
    pub fn set_start_state(&mut self, state: NodeId) -> Result<(), StateMachineError> {
        if self.state_mut(state)?.resident {
            return Err(StateMachineError::ResidentStartState(state));
        }
        self.start = Some(state);
        Ok(())
    }

    /// Enables or disables the break point on a state.
    ///
    /// # Errors
    ///
    /// Fails if `state` does not exist or is a reroute.
    pub fn set_break_point(
        &mut self,
        state: NodeId,
        enabled: bool,
    ) -> Result<(), StateMachineError> {
        self.state_mut(state)?.break_point = enabled;
        Ok(())
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
    ) -> Result<(), StateMachineError> {
        self.graph.connect_reroute(reroute, link.into())?;
        Ok(())
    }

    /// Removes a node.
    ///
    /// Removing an active state ends it first. Links pointing at the removed
    /// node dangle, and transitions along them are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StateMachineError::NodeNotFound`] for unknown ids.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), StateMachineError> {
        if !self.graph.contains(id) {
            return Err(StateMachineError::NodeNotFound(id));
        }

        let was_current = self.current == Some(id);
        if was_current {
            self.current = None;
        }
        if self.state != PlayState::Stopped && (was_current || self.is_resident(id)) {
            self.in_transition = true;
            self.run_state(id, Callback::End);
            self.in_transition = false;
            self.emit_exit(id, ExitReason::Interrupted);
        }
        if self.start == Some(id) {
            self.start = None;
        }

        self.graph.remove_node(id);
        tracing::debug!(node = %id, "node removed");
        Ok(())
    }

    /// Requests a transition along `link` on behalf of the current state.
    ///
    /// Does nothing while no state is current.
    pub fn request_transition(&mut self, link: &StateLink) {
        let Some(current) = self.current else {
            tracing::debug!(link = %link.name, "no current state, request ignored");
            return;
        };
        self.requests.push(TransitionRequest::new(current, link));
        self.process_requests();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hosting
    // ─────────────────────────────────────────────────────────────────────

    /// Begins every resident state, then enters the start state.
    ///
    /// Does nothing if the machine is already running or paused.
    ///
    /// # Errors
    ///
    /// Returns [`StateMachineError::NoStartState`] if no start state is set.
    pub fn start(&mut self) -> Result<(), StateMachineError> {
        if self.state != PlayState::Stopped {
            return Ok(());
        }
        let start = self
            .start
            .filter(|&id| self.graph.behaviour(id).is_some())
            .ok_or(StateMachineError::NoStartState)?;
        let span = self.span.clone();
        let _guard = span.enter();

        self.clock.reset();
        self.state = PlayState::Playing;
        tracing::debug!(states = self.graph.node_count(), "state machine started");
        self.emit(|graph| GraphEvent::GraphStart {
            graph,
            node_count: self.graph.node_count(),
        });

        self.in_transition = true;
        for resident in self.residents() {
            self.begin_state(resident);
        }
        self.in_transition = false;

        self.transition_to(start, START_LINK_NAME.to_string());
        Ok(())
    }

    /// Runs the update half of a frame.
    pub fn update(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.clock.advance();
        self.phase = Phase::Update;
        self.reconcile(ReconcilePoint::NextUpdate);
        self.run_active(Callback::Update);
        self.phase = Phase::Idle;
    }

    /// Runs the late-update half of a frame.
    pub fn late_update(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.phase = Phase::LateUpdate;
        self.run_active(Callback::LateUpdate);
        if self.state == PlayState::Playing {
            self.reconcile(ReconcilePoint::LateUpdate);
        }
        self.phase = Phase::Idle;
    }

    /// Runs a whole frame and returns the current state afterwards.
    pub fn tick(&mut self) -> Option<NodeId> {
        self.update();
        self.late_update();
        self.current
    }

    /// Freezes the machine in place.
    pub fn pause(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        self.state = PlayState::Paused;
        self.clock.pause();
        self.notify_active(|behaviour| behaviour.on_pause());
        tracing::debug!(graph = %self.instance, "state machine paused");
        self.emit(|graph| GraphEvent::GraphPaused { graph });
    }

    /// Continues a paused machine.
    pub fn resume(&mut self) {
        if self.state != PlayState::Paused {
            return;
        }
        self.state = PlayState::Playing;
        self.clock.resume();
        self.notify_active(|behaviour| behaviour.on_resume());
        tracing::debug!(graph = %self.instance, "state machine resumed");
        self.emit(|graph| GraphEvent::GraphResumed { graph });
    }

    /// Ends the current state and every resident state, and discards any
    /// pending transition.
    pub fn stop(&mut self) {
        if self.state == PlayState::Stopped {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.state = PlayState::Stopped;
        let active = self.active_states();
        self.current = None;
        for id in active {
            self.run_state(id, Callback::End);
            self.emit_exit(id, ExitReason::Stopped);
        }

        self.reservation.clear();
        self.requests.clear();
        self.in_transition = false;
        self.phase = Phase::Idle;
        self.clock.reset();
        tracing::debug!("state machine stopped");
        self.emit(|graph| GraphEvent::GraphStop { graph });
    }

    /// Stops and starts again.
    ///
    /// # Errors
    ///
    /// Returns [`StateMachineError::NoStartState`] if no start state is set.
    pub fn restart(&mut self) -> Result<(), StateMachineError> {
        self.stop();
        self.start()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────

    fn emit(&self, event: impl FnOnce(GraphInstanceId) -> GraphEvent) {
        if let Some(hooks) = &self.hooks {
            hooks.dispatch(&event(self.instance.clone()));
        }
    }

    fn emit_exit(&self, id: NodeId, reason: ExitReason) {
        tracing::trace!(state = %id, %reason, "state exited");
        self.emit(|graph| GraphEvent::NodeExit {
            graph,
            node_id: id,
            node_name: self.node_name(id),
            reason,
        });
    }

    fn node_name(&self, id: NodeId) -> String {
        self.graph
            .get_node(id)
            .map(|node| node.name().to_string())
            .unwrap_or_default()
    }

    fn state_mut(&mut self, id: NodeId) -> Result<&mut State, StateMachineError> {
        self.graph
            .get_node_mut(id)
            .ok_or(StateMachineError::NodeNotFound(id))?
            .behaviour_mut()
            .ok_or(StateMachineError::NotAState(id))
    }

    fn is_resident(&self, id: NodeId) -> bool {
        self.graph.behaviour(id).is_some_and(State::is_resident)
    }

    fn is_active(&self, id: NodeId) -> bool {
        self.current == Some(id) || self.is_resident(id)
    }

    fn residents(&self) -> Vec<NodeId> {
        self.graph
            .ids()
            .into_iter()
            .filter(|&id| self.is_resident(id))
            .collect()
    }

    fn active_states(&self) -> Vec<NodeId> {
        self.current.into_iter().chain(self.residents()).collect()
    }

    fn notify_active(&mut self, mut f: impl FnMut(&mut Box<dyn StateBehaviour>)) {
        for id in self.active_states() {
            if let Some(state) = self.graph.behaviour_mut(id) {
                state.behaviours.iter_mut().for_each(&mut f);
            }
        }
    }

    fn run_active(&mut self, callback: Callback) {
        if let Some(current) = self.current {
            self.run_state(current, callback);
        }
        for resident in self.residents() {
            self.run_state(resident, callback);
        }
    }

    /// Calls `callback` on each behaviour of `id` in order, processing the
    /// requests each call makes before moving on. Frame callbacks stop once
    /// the state is no longer running.
    fn run_state(&mut self, id: NodeId, callback: Callback) {
        let mut index = 0;
        loop {
            if callback.is_frame() && !(self.is_playing() && self.is_active(id)) {
                break;
            }
            let Some(behaviour) = self
                .graph
                .behaviour_mut(id)
                .and_then(|state| state.behaviours.get_mut(index))
            else {
                break;
            };

            let mut ctx =
                StateContext::new(&mut self.blackboard, &self.clock, id, &mut self.requests);
            match callback {
                Callback::Awake => behaviour.on_awake(&mut ctx),
                Callback::Begin => behaviour.on_state_begin(&mut ctx),
                Callback::Update => behaviour.on_state_update(&mut ctx),
                Callback::LateUpdate => behaviour.on_state_late_update(&mut ctx),
                Callback::End => behaviour.on_state_end(&mut ctx),
            }
            index += 1;
            self.process_requests();
        }
    }

    fn begin_state(&mut self, id: NodeId) {
        let first_entry = self
            .graph
            .behaviour_mut(id)
            .is_some_and(|state| !core::mem::replace(&mut state.awakened, true));
        if first_entry {
            self.run_state(id, Callback::Awake);
        }
        self.run_state(id, Callback::Begin);

        tracing::trace!(state = %id, "state entered");
        self.emit(|graph| GraphEvent::NodeEnter {
            graph,
            node_id: id,
            node_name: self.node_name(id),
        });
    }

    fn process_requests(&mut self) {
        if self.requests.is_empty() {
            return;
        }
        for request in core::mem::take(&mut self.requests) {
            self.process_request(request);
        }
    }

    fn process_request(&mut self, mut request: TransitionRequest) {
        if self.state == PlayState::Stopped {
            tracing::trace!(link = %request.link_name, "machine stopped, request discarded");
            return;
        }
        if !self.is_active(request.from) {
            tracing::debug!(
                state = %request.from,
                link = %request.link_name,
                "request from inactive state discarded"
            );
            self.report_dropped(&request, "source state is not active");
            return;
        }
        let Some(to) = self.resolve_target(&request) else {
            return;
        };

        if request.timing == TransitionTiming::Immediate {
            if !self.in_transition {
                self.reservation.clear();
                self.transition_to(to, request.link_name);
                return;
            }
            let point = if self.phase == Phase::Update {
                ReconcilePoint::LateUpdate
            } else {
                ReconcilePoint::NextUpdate
            };
            request.timing = TransitionTiming::overwriting(point);
            tracing::debug!(
                link = %request.link_name,
                %point,
                "immediate transition requested during a transition, deferred"
            );
        }

        match self.reservation.reserve(request.clone()) {
            ReserveOutcome::Reserved | ReserveOutcome::Replaced => {
                tracing::debug!(
                    link = %request.link_name,
                    timing = ?request.timing,
                    "transition reserved"
                );
            }
            ReserveOutcome::Dropped => {
                tracing::debug!(link = %request.link_name, "reservation slot occupied");
                self.report_dropped(&request, "reservation slot occupied");
            }
        }
    }

    fn report_dropped(&self, request: &TransitionRequest, reason: &'static str) {
        self.emit(|graph| GraphEvent::TransitionDropped {
            graph,
            from: request.from,
            link_name: request.link_name.clone(),
            reason,
        });
    }

    /// Resolves a request's target to a regular state.
    fn resolve_target(&self, request: &TransitionRequest) -> Option<NodeId> {
        let resolved = resolve(&self.graph, request.target).target();
        match resolved.map(|id| (id, self.graph.behaviour(id))) {
            Some((id, Some(state))) if !state.resident => Some(id),
            Some((id, Some(_))) => {
                tracing::warn!(
                    state = %request.from,
                    link = %request.link_name,
                    target = %id,
                    "transition into a resident state ignored"
                );
                self.report_dropped(request, "target is a resident state");
                None
            }
            Some((_, None)) | None => {
                tracing::warn!(
                    state = %request.from,
                    link = %request.link_name,
                    target = %request.target,
                    "transition target does not resolve to a state"
                );
                self.report_dropped(request, "unresolved target");
                None
            }
        }
    }

    fn reconcile(&mut self, point: ReconcilePoint) {
        let Some(reserved) = self.reservation.take_due(point) else {
            return;
        };
        tracing::trace!(link = %reserved.request.link_name, %point, "applying reservation");
        if let Some(to) = self.resolve_target(&reserved.request) {
            self.transition_to(to, reserved.request.link_name);
        }
    }

    /// Leaves the current state and enters `to`. Requests made by the
    /// exiting and entering behaviours are reserved, never applied
    /// recursively.
    fn transition_to(&mut self, to: NodeId, link_name: String) {
        let from = self.current;
        self.in_transition = true;
        if let Some(from) = from {
            self.run_state(from, Callback::End);
            self.emit_exit(from, ExitReason::Transition);
        }

        self.current = Some(to);
        let break_point = match self.graph.behaviour_mut(to) {
            Some(state) => {
                state.transition_count = state.transition_count.saturating_add(1);
                state.break_point
            }
            None => false,
        };
        self.history.push(TransitionRecord {
            from,
            to,
            link_name: link_name.clone(),
            frame: self.clock.frame(),
        });
        tracing::debug!(from = ?from, to = %to, link = %link_name, "transition applied");
        self.emit(|graph| GraphEvent::TransitionApplied {
            graph,
            from,
            to,
            link_name,
        });

        self.begin_state(to);
        self.in_transition = false;

        if break_point {
            tracing::debug!(state = %to, "break point reached");
            self.emit(|graph| GraphEvent::BreakPoint { graph, node_id: to });
            if self.config.pause_on_break_point {
                self.pause();
            }
        }
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("instance", &self.instance)
            .field("states", &self.graph.node_count())
            .field("current", &self.current)
            .field("state", &self.state)
            .field("reservation", &self.reservation.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_without_states_fails() {
        let mut fsm = StateMachine::new();
        assert_eq!(fsm.start(), Err(StateMachineError::NoStartState));
        assert_eq!(fsm.state(), PlayState::Stopped);
    }

    #[test]
    fn first_regular_state_is_start() {
        let mut fsm = StateMachine::new();
        fsm.add_resident_state("Watch");
        let first = fsm.add_state("First");
        fsm.add_state("Second");
        assert_eq!(fsm.start_state(), Some(first));

        fsm.start().unwrap();
        assert_eq!(fsm.current(), Some(first));
        assert_eq!(fsm.node(first).map(State::transition_count), Some(1));
    }

    #[test]
    fn start_state_must_be_regular() {
        let mut fsm = StateMachine::new();
        let watch = fsm.add_resident_state("Watch");
        let reroute = fsm.add_reroute("Reroute", NodeLink::UNCONNECTED);

        assert_eq!(
            fsm.set_start_state(watch),
            Err(StateMachineError::ResidentStartState(watch))
        );
        assert_eq!(
            fsm.set_start_state(reroute),
            Err(StateMachineError::NotAState(reroute))
        );
        let missing = NodeId::from_raw(99).unwrap();
        assert_eq!(
            fsm.set_break_point(missing, true),
            Err(StateMachineError::NodeNotFound(missing))
        );
    }

    #[test]
    fn removing_start_state_clears_it() {
        let mut fsm = StateMachine::new();
        let only = fsm.add_state("Only");
        fsm.remove_node(only).unwrap();
        assert_eq!(fsm.start_state(), None);
        assert_eq!(fsm.start(), Err(StateMachineError::NoStartState));
    }

    #[test]
    fn host_request_uses_current_state() {
        let mut fsm = StateMachine::new();
        let a = fsm.add_state("A");
        let b = fsm.add_state("B");
        fsm.request_transition(&StateLink::new("early", TransitionTiming::Immediate).with_target(b));
        assert_eq!(fsm.current(), None);

        fsm.start().unwrap();
        fsm.request_transition(&StateLink::new("go", TransitionTiming::Immediate).with_target(b));
        assert_eq!(fsm.current(), Some(b));
        assert_eq!(
            fsm.history().last().map(|record| record.from),
            Some(Some(a))
        );
    }
}
