//! Hook registration API.
//!
//! The [`HooksAPI`] is a registry of observers keyed by schedule. Graph
//! runtimes hold it behind an `Arc` and dispatch a [`GraphEvent`] at every
//! lifecycle point; observers react without being able to change the graph.
//!
//! # Multi-Schedule Registration
//!
//! ```
//! use arbor_graph::hooks::{GraphEvent, HooksAPI};
//! use arbor_graph::hooks::schedule::{OnNodeEnter, OnNodeExit};
//!
//! let hooks = HooksAPI::new();
//! hooks
//!     .register_observer::<(OnNodeEnter, OnNodeExit), _>("tracker", |event: &GraphEvent| {
//!         tracing::debug!(%event, "node lifecycle");
//!     })
//!     .unwrap();
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::events::GraphEvent;
use super::schedule::{IntoScheduleIds, ScheduleId};

// ─────────────────────────────────────────────────────────────────────────────
// BoxedHook
// ─────────────────────────────────────────────────────────────────────────────

/// Type-erased hook that receives `&GraphEvent`.
///
/// Most users should use [`HooksAPI::register_observer`] instead of creating
/// `BoxedHook` directly.
pub struct BoxedHook {
    handler: Arc<dyn Fn(&GraphEvent) + Send + Sync>,
}

impl BoxedHook {
    /// Wraps a handler.
    #[must_use]
    pub fn new(handler: impl Fn(&GraphEvent) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Invokes the hook.
    pub fn invoke(&self, event: &GraphEvent) {
        (self.handler)(event);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HookRegistrationError {
    /// A hook with this name already exists on the schedule.
    #[error("hook '{name}' already registered for schedule '{}'", .schedule.type_name())]
    DuplicateName {
        /// The schedule where the duplicate was found.
        schedule: ScheduleId,
        /// The duplicate hook name.
        name: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HooksAPI
// ─────────────────────────────────────────────────────────────────────────────

struct HookEntry {
    name: String,
    hook: BoxedHook,
}

/// Registry of lifecycle observers.
///
/// # Thread Safety
///
/// Uses [`RwLock`] so one registry can be shared by graphs on different
/// threads. Dispatch takes a read lock; hooks must not register new hooks
/// from inside a callback.
#[derive(Default)]
pub struct HooksAPI {
    hooks: RwLock<HashMap<ScheduleId, Vec<HookEntry>>>,
}

impl HooksAPI {
    /// Creates a new empty hooks registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for one or more schedules.
    ///
    /// When registered on several schedules the hook is stored once per
    /// schedule under `name@ScheduleType`.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the name is taken
    /// on any of the schedules. Schedules earlier in the tuple stay registered.
    pub fn register_observer<S, F>(
        &self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        S: IntoScheduleIds,
        F: Fn(&GraphEvent) + Send + Sync + 'static,
    {
        let schedules = S::schedule_ids();
        let name = name.into();
        let hook: Arc<dyn Fn(&GraphEvent) + Send + Sync> = Arc::new(hook);

        for schedule in &schedules {
            let hook_name = if schedules.len() > 1 {
                format!("{}@{}", name, schedule.type_name())
            } else {
                name.clone()
            };
            self.register_boxed(
                *schedule,
                hook_name,
                BoxedHook {
                    handler: Arc::clone(&hook),
                },
            )?;
        }
        Ok(self)
    }

    /// Registers a pre-built [`BoxedHook`] for the given schedule.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if the name is taken.
    pub fn register_boxed(
        &self,
        schedule: ScheduleId,
        name: impl Into<String>,
        hook: BoxedHook,
    ) -> Result<(), HookRegistrationError> {
        let name = name.into();

        let mut hooks = self.hooks.write();
        let entries = hooks.entry(schedule).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            return Err(HookRegistrationError::DuplicateName { schedule, name });
        }

        tracing::trace!(hook = %name, schedule = schedule.type_name(), "hook registered");
        entries.push(HookEntry { name, hook });
        Ok(())
    }

    /// Removes a hook by name. Returns whether it existed.
    pub fn unregister(&self, schedule: ScheduleId, name: &str) -> bool {
        let mut hooks = self.hooks.write();
        let Some(entries) = hooks.get_mut(&schedule) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.name != name);
        before != entries.len()
    }

    /// Invokes all hooks registered for `schedule`, in registration order.
    pub fn invoke(&self, schedule: ScheduleId, event: &GraphEvent) {
        let hooks = self.hooks.read();

        if let Some(entries) = hooks.get(&schedule) {
            for entry in entries {
                entry.hook.invoke(event);
            }
        }
    }

    /// Invokes the hooks registered for the event's own schedule.
    pub fn dispatch(&self, event: &GraphEvent) {
        self.invoke(event.schedule_id(), event);
    }

    /// Returns the number of hooks registered for the given schedule.
    #[must_use]
    pub fn hook_count(&self, schedule: ScheduleId) -> usize {
        let hooks = self.hooks.read();
        hooks.get(&schedule).map_or(0, Vec::len)
    }

    /// Checks if a hook with the given name exists on the schedule.
    #[must_use]
    pub fn contains_hook(&self, schedule: ScheduleId, name: &str) -> bool {
        let hooks = self.hooks.read();
        hooks
            .get(&schedule)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }
}

impl core::fmt::Debug for HooksAPI {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let hooks = self.hooks.read();
        let mut map = f.debug_map();
        for (schedule, entries) in hooks.iter() {
            let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            map.entry(&schedule.type_name(), &names);
        }
        map.finish()
    }
}
