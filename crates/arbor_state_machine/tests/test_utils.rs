//! Shared test utilities for `arbor_state_machine` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities — not all items used in every test binary"
)]

use std::sync::Arc;
use std::time::Instant;

use arbor_core::{Clock, FrameClock, MockClock};
use arbor_graph::node::NodeId;
use arbor_state_machine::context::StateContext;
use arbor_state_machine::link::{StateLink, TransitionTiming};
use arbor_state_machine::state::StateBehaviour;
use parking_lot::Mutex;

/// Shared lifecycle log written by [`Probe`] behaviours.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Returns and clears the recorded entries.
    pub fn take(&self) -> Vec<String> {
        core::mem::take(&mut *self.0.lock())
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }
}

/// Behaviour that records every callback and requests scripted transitions.
///
/// Entries are `awake:name`, `begin:name`, `update:name`, `late:name`,
/// `end:name`, `pause:name` and `resume:name`. Links registered for a
/// callback are requested, in order, every time that callback runs.
pub struct Probe {
    name: &'static str,
    log: Log,
    begin: Vec<StateLink>,
    update: Vec<StateLink>,
    late_update: Vec<StateLink>,
    end: Vec<StateLink>,
}

impl Probe {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            begin: Vec::new(),
            update: Vec::new(),
            late_update: Vec::new(),
            end: Vec::new(),
        }
    }

    pub fn requests_on_begin(mut self, link: StateLink) -> Self {
        self.begin.push(link);
        self
    }

    pub fn requests_on_update(mut self, link: StateLink) -> Self {
        self.update.push(link);
        self
    }

    pub fn requests_on_late_update(mut self, link: StateLink) -> Self {
        self.late_update.push(link);
        self
    }

    pub fn requests_on_end(mut self, link: StateLink) -> Self {
        self.end.push(link);
        self
    }

    /// Stops requesting anything.
    pub fn silence(&mut self) {
        self.begin.clear();
        self.update.clear();
        self.late_update.clear();
        self.end.clear();
    }

    fn record(&self, kind: &str) {
        self.log.push(format!("{kind}:{}", self.name));
    }
}

fn request_all(ctx: &mut StateContext<'_>, links: &[StateLink]) {
    for link in links {
        ctx.transition(link);
    }
}

impl StateBehaviour for Probe {
    fn on_awake(&mut self, _ctx: &mut StateContext<'_>) {
        self.record("awake");
    }

    fn on_state_begin(&mut self, ctx: &mut StateContext<'_>) {
        self.record("begin");
        request_all(ctx, &self.begin);
    }

    fn on_state_update(&mut self, ctx: &mut StateContext<'_>) {
        self.record("update");
        request_all(ctx, &self.update);
    }

    fn on_state_late_update(&mut self, ctx: &mut StateContext<'_>) {
        self.record("late");
        request_all(ctx, &self.late_update);
    }

    fn on_state_end(&mut self, ctx: &mut StateContext<'_>) {
        self.record("end");
        request_all(ctx, &self.end);
    }

    fn on_pause(&mut self) {
        self.record("pause");
    }

    fn on_resume(&mut self) {
        self.record("resume");
    }

    fn state_links(&self) -> Vec<&StateLink> {
        self.begin
            .iter()
            .chain(&self.update)
            .chain(&self.late_update)
            .chain(&self.end)
            .collect()
    }
}

/// Link named `name` to `target`.
pub fn link(name: &str, timing: TransitionTiming, target: NodeId) -> StateLink {
    StateLink::new(name, timing).with_target(target)
}

/// Frame clock driven by a [`MockClock`].
pub fn mock_frame_clock() -> (Arc<MockClock>, FrameClock) {
    let mock = Arc::new(MockClock::new(Instant::now()));
    let frames = FrameClock::new(Clock::with_provider(mock.clone()));
    (mock, frames)
}
