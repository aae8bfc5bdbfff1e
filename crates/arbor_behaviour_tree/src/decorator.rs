//! Conditions attached to tree nodes.
//!
//! Every decorator on a node is checked when the node is entered; if any
//! condition is false the node finishes with failure without starting.
//! Decorators with [`AbortFlags`] are also re-checked every tick:
//!
//! - [`AbortFlags::SELF`] on an active node: the condition turning false
//!   aborts the node and its subtree.
//! - [`AbortFlags::LOWER_PRIORITY`] on an inactive node that runs before the
//!   current leaf: the condition turning true interrupts the running branch
//!   and switches execution to the decorated node.

use core::fmt;
use core::ops::BitOr;

use serde_json::Value;

use crate::context::TickContext;

/// When a decorator's condition is re-checked while the tree runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AbortFlags(u8);

impl AbortFlags {
    /// Checked on entry only.
    pub const NONE: Self = Self(0);
    /// Aborts the decorated node when the condition turns false.
    pub const SELF: Self = Self(1);
    /// Interrupts lower-priority branches when the condition turns true.
    pub const LOWER_PRIORITY: Self = Self(1 << 1);
    /// Both behaviours.
    pub const BOTH: Self = Self(Self::SELF.0 | Self::LOWER_PRIORITY.0);

    /// Returns whether every flag in `other` is set.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether no flag is set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AbortFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A condition guarding a tree node.
pub trait Decorator: Send {
    /// Evaluates the condition.
    fn condition(&mut self, ctx: &TickContext<'_>) -> bool;
}

/// A decorator together with its abort flags and last result.
pub struct DecoratorSlot {
    decorator: Box<dyn Decorator>,
    abort: AbortFlags,
    last: Option<bool>,
}

impl DecoratorSlot {
    /// Wraps a decorator.
    #[must_use]
    pub fn new(decorator: Box<dyn Decorator>, abort: AbortFlags) -> Self {
        Self {
            decorator,
            abort,
            last: None,
        }
    }

    /// Returns the abort flags.
    #[must_use]
    pub fn abort(&self) -> AbortFlags {
        self.abort
    }

    /// Returns the result of the most recent evaluation.
    #[must_use]
    pub fn last_result(&self) -> Option<bool> {
        self.last
    }

    /// Evaluates the condition and records the result.
    pub fn evaluate(&mut self, ctx: &TickContext<'_>) -> bool {
        let result = self.decorator.condition(ctx);
        self.last = Some(result);
        result
    }

    /// Re-evaluates and reports whether the result changed.
    ///
    /// A decorator that has never been evaluated counts as previously false.
    pub fn revaluate(&mut self, ctx: &TickContext<'_>) -> Option<bool> {
        let previous = self.last.unwrap_or(false);
        let result = self.evaluate(ctx);
        (result != previous).then_some(result)
    }
}

impl fmt::Debug for DecoratorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorSlot")
            .field("abort", &self.abort)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in decorators
// ─────────────────────────────────────────────────────────────────────────────

/// Decorator backed by a closure.
pub struct FnCondition<F> {
    f: F,
}

impl<F> FnCondition<F>
where
    F: FnMut(&TickContext<'_>) -> bool + Send + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Decorator for FnCondition<F>
where
    F: FnMut(&TickContext<'_>) -> bool + Send + 'static,
{
    fn condition(&mut self, ctx: &TickContext<'_>) -> bool {
        (self.f)(ctx)
    }
}

/// Passes when a blackboard key holds an expected value.
#[derive(Debug, Clone)]
pub struct BlackboardCondition {
    key: String,
    expected: Value,
}

impl BlackboardCondition {
    /// Passes when `key` equals `expected`.
    #[must_use]
    pub fn equals(key: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// Passes when `key` holds `true`.
    #[must_use]
    pub fn is_set(key: impl Into<String>) -> Self {
        Self::equals(key, true)
    }
}

impl Decorator for BlackboardCondition {
    fn condition(&mut self, ctx: &TickContext<'_>) -> bool {
        ctx.blackboard.get(&self.key) == Some(&self.expected)
    }
}
