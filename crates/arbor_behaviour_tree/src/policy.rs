//! Child-selection policies for composite nodes.
//!
//! A [`CompositePolicy`] decides where a composite starts, how it advances
//! after each child, whether it keeps going and what it reports when done.
//! The composite owns the running index and keeps it in bounds; policies only
//! propose indices.
//!
//! Built-in policies are registered by name in a [`PolicyRegistry`] so
//! authoring tools can refer to them as strings:
//!
//! ```
//! use arbor_behaviour_tree::policy::PolicyRegistry;
//!
//! let registry = PolicyRegistry::with_builtins();
//! let policy = registry.create("selector").unwrap();
//! assert_eq!(policy.name(), "selector");
//! ```

use core::fmt;

use hashbrown::HashMap;

use crate::error::TreeError;
use crate::status::NodeStatus;

/// Strategy deciding how a composite walks its children.
pub trait CompositePolicy: Send {
    /// Registry name of the policy.
    fn name(&self) -> &'static str;

    /// Called on every fresh activation, before [`begin_index`](Self::begin_index).
    fn on_activate(&mut self) {}

    /// Index of the first child to run, or `None` to finish immediately.
    fn begin_index(&self, child_count: usize) -> Option<usize> {
        (child_count > 0).then_some(0)
    }

    /// Index to run after the child at `current` finished.
    ///
    /// Out-of-range results end the composite.
    fn next_index(&mut self, current: usize, _child_count: usize) -> Option<usize> {
        current.checked_add(1)
    }

    /// Index to resume at after the branch under `child_index` interrupted
    /// a lower-priority child.
    fn interrupt_index(&self, child_index: usize) -> usize {
        child_index
    }

    /// Whether to run another child given the last child's status.
    /// `Running` means no child has finished yet in this activation.
    fn can_execute(&self, last: NodeStatus) -> bool;

    /// Called after the child at `index` finished with `status`.
    fn on_child_executed(&mut self, _index: usize, _status: NodeStatus) {}

    /// Whether the composite succeeds, given the last child's status.
    fn finish_status(&self, last: NodeStatus) -> bool {
        last == NodeStatus::Success
    }

    /// Called once when the composite finishes on its own.
    fn on_finish(&mut self, _success: bool) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence / Selector
// ─────────────────────────────────────────────────────────────────────────────

/// Runs children in order until one fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequence;

impl CompositePolicy for Sequence {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn can_execute(&self, last: NodeStatus) -> bool {
        last != NodeStatus::Failure
    }
}

/// Runs children in order until one succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector;

impl CompositePolicy for Selector {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn can_execute(&self, last: NodeStatus) -> bool {
        last != NodeStatus::Success
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parallel
// ─────────────────────────────────────────────────────────────────────────────

/// How a [`Parallel`] composite turns child results into its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Succeeds only if every child succeeded.
    #[default]
    RequireAll,
    /// Succeeds if at least one child succeeded.
    RequireOne,
}

/// Runs every child once, regardless of individual results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel {
    policy: ParallelPolicy,
    successes: usize,
    failures: usize,
}

impl Parallel {
    /// Creates a parallel composite with the given success policy.
    #[must_use]
    pub fn new(policy: ParallelPolicy) -> Self {
        Self {
            policy,
            successes: 0,
            failures: 0,
        }
    }
}

impl CompositePolicy for Parallel {
    fn name(&self) -> &'static str {
        match self.policy {
            ParallelPolicy::RequireAll => "parallel",
            ParallelPolicy::RequireOne => "parallel_any",
        }
    }

    fn on_activate(&mut self) {
        self.successes = 0;
        self.failures = 0;
    }

    fn can_execute(&self, _last: NodeStatus) -> bool {
        true
    }

    fn on_child_executed(&mut self, _index: usize, status: NodeStatus) {
        match status {
            NodeStatus::Success => self.successes += 1,
            NodeStatus::Failure => self.failures += 1,
            NodeStatus::Running => {}
        }
    }

    fn finish_status(&self, _last: NodeStatus) -> bool {
        match self.policy {
            ParallelPolicy::RequireAll => self.successes > 0 && self.failures == 0,
            ParallelPolicy::RequireOne => self.successes > 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory composites
// ─────────────────────────────────────────────────────────────────────────────

/// Sequence that resumes at the child that failed last time.
///
/// The memory is cleared once every child succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySequence {
    memory: Option<usize>,
}

impl CompositePolicy for MemorySequence {
    fn name(&self) -> &'static str {
        "memory_sequence"
    }

    fn begin_index(&self, child_count: usize) -> Option<usize> {
        match self.memory {
            Some(index) if index < child_count => Some(index),
            _ => (child_count > 0).then_some(0),
        }
    }

    fn can_execute(&self, last: NodeStatus) -> bool {
        last != NodeStatus::Failure
    }

    fn on_child_executed(&mut self, index: usize, status: NodeStatus) {
        if status == NodeStatus::Failure {
            self.memory = Some(index);
        }
    }

    fn on_finish(&mut self, success: bool) {
        if success {
            self.memory = None;
        }
    }
}

/// Selector that resumes at the child that succeeded last time.
///
/// The memory is cleared once every child fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySelector {
    memory: Option<usize>,
}

impl CompositePolicy for MemorySelector {
    fn name(&self) -> &'static str {
        "memory_selector"
    }

    fn begin_index(&self, child_count: usize) -> Option<usize> {
        match self.memory {
            Some(index) if index < child_count => Some(index),
            _ => (child_count > 0).then_some(0),
        }
    }

    fn can_execute(&self, last: NodeStatus) -> bool {
        last != NodeStatus::Success
    }

    fn on_child_executed(&mut self, index: usize, status: NodeStatus) {
        if status == NodeStatus::Success {
            self.memory = Some(index);
        }
    }

    fn on_finish(&mut self, success: bool) {
        if !success {
            self.memory = None;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PolicyRegistry
// ─────────────────────────────────────────────────────────────────────────────

type PolicyFactory = Box<dyn Fn() -> Box<dyn CompositePolicy> + Send + Sync>;

/// Static name-to-constructor map for composite policies.
///
/// Populated explicitly at startup; there is no discovery.
#[derive(Default)]
pub struct PolicyRegistry {
    factories: HashMap<String, PolicyFactory>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in policies:
    /// `sequence`, `selector`, `parallel`, `parallel_any`,
    /// `memory_sequence` and `memory_selector`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, fn() -> Box<dyn CompositePolicy>); 6] = [
            ("sequence", || Box::new(Sequence)),
            ("selector", || Box::new(Selector)),
            ("parallel", || Box::new(Parallel::new(ParallelPolicy::RequireAll))),
            ("parallel_any", || Box::new(Parallel::new(ParallelPolicy::RequireOne))),
            ("memory_sequence", || Box::new(MemorySequence::default())),
            ("memory_selector", || Box::new(MemorySelector::default())),
        ];
        for (name, factory) in builtins {
            registry.factories.insert(name.to_string(), Box::new(factory));
        }
        registry
    }

    /// Registers a constructor under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicatePolicy`] if the name is taken.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), TreeError>
    where
        F: Fn() -> Box<dyn CompositePolicy> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(TreeError::DuplicatePolicy(name));
        }
        tracing::debug!(policy = %name, "composite policy registered");
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Builds a fresh policy instance.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownPolicy`] if nothing is registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn CompositePolicy>, TreeError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| TreeError::UnknownPolicy(name.to_string()))
    }

    /// Returns whether a policy is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("policies", &self.names())
            .finish()
    }
}
