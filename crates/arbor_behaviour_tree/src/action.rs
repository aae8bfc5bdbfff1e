//! Leaf behaviours.
//!
//! An action is the only kind of node that does work. The tree calls
//! [`on_start`](ActionBehaviour::on_start) once when the action is entered,
//! [`on_execute`](ActionBehaviour::on_execute) every tick until it returns a
//! terminal status, and [`on_end`](ActionBehaviour::on_end) exactly once when
//! it leaves the execution stack for any reason.

use core::time::Duration;

use downcast_rs::{Downcast, impl_downcast};

use crate::context::TickContext;
use crate::status::NodeStatus;

/// Behaviour attached to an action node.
pub trait ActionBehaviour: Downcast + Send {
    /// Called when the action is entered.
    fn on_start(&mut self, _ctx: &mut TickContext<'_>) {}

    /// Called every tick while the action is on top of the execution stack.
    fn on_execute(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus;

    /// Called once when the action leaves the stack.
    ///
    /// `interrupted` is `true` when the action was aborted, pre-empted by a
    /// higher-priority branch or stopped before it finished on its own.
    fn on_end(&mut self, _ctx: &mut TickContext<'_>, _interrupted: bool) {}

    /// Called when the tree is paused while the action is running.
    fn on_pause(&mut self) {}

    /// Called when the tree resumes.
    fn on_resume(&mut self) {}
}

impl_downcast!(ActionBehaviour);

// ─────────────────────────────────────────────────────────────────────────────
// Built-in actions
// ─────────────────────────────────────────────────────────────────────────────

/// Action backed by a closure called on every execute.
pub struct FnAction<F> {
    f: F,
}

impl<F> FnAction<F>
where
    F: FnMut(&mut TickContext<'_>) -> NodeStatus + Send + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ActionBehaviour for FnAction<F>
where
    F: FnMut(&mut TickContext<'_>) -> NodeStatus + Send + 'static,
{
    fn on_execute(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        (self.f)(ctx)
    }
}

/// Action that always finishes with the same status.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub NodeStatus);

impl ActionBehaviour for Constant {
    fn on_execute(&mut self, _ctx: &mut TickContext<'_>) -> NodeStatus {
        self.0
    }
}

/// Waits for an amount of tree time, then succeeds.
///
/// Time is measured with the tree's frame clock, so a paused tree does not
/// advance the wait.
#[derive(Debug, Clone)]
pub struct Wait {
    duration: Duration,
    waited: Duration,
}

impl Wait {
    /// Creates a wait of `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            waited: Duration::ZERO,
        }
    }

    /// Returns how long the current activation has waited.
    #[must_use]
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

impl ActionBehaviour for Wait {
    fn on_start(&mut self, _ctx: &mut TickContext<'_>) {
        self.waited = Duration::ZERO;
    }

    fn on_execute(&mut self, ctx: &mut TickContext<'_>) -> NodeStatus {
        self.waited += ctx.delta;
        if self.waited >= self.duration {
            NodeStatus::Success
        } else {
            NodeStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::Blackboard;

    #[test]
    fn wait_accumulates_delta() {
        let mut board = Blackboard::new();
        let mut wait = Wait::new(Duration::from_millis(30));
        let mut ctx = TickContext::detached(&mut board);

        wait.on_start(&mut ctx);
        ctx.delta = Duration::from_millis(20);
        assert_eq!(wait.on_execute(&mut ctx), NodeStatus::Running);
        assert_eq!(wait.on_execute(&mut ctx), NodeStatus::Success);

        wait.on_start(&mut ctx);
        assert_eq!(wait.waited(), Duration::ZERO);
    }

    #[test]
    fn fn_action_sees_blackboard() {
        let mut board = Blackboard::new();
        board.set("ready", true);
        let mut action = FnAction::new(|ctx: &mut TickContext<'_>| {
            NodeStatus::from_success(ctx.blackboard.flag("ready"))
        });

        let mut ctx = TickContext::detached(&mut board);
        assert_eq!(action.on_execute(&mut ctx), NodeStatus::Success);
    }

    #[test]
    fn boxed_action_downcasts() {
        let boxed: Box<dyn ActionBehaviour> = Box::new(Wait::new(Duration::from_secs(1)));
        assert!(boxed.downcast_ref::<Wait>().is_some());
        assert!(boxed.downcast_ref::<Constant>().is_none());
    }
}
