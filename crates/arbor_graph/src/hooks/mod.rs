//! Lifecycle hooks for running graphs.
//!
//! Hooks let a host observe a behaviour tree or state machine without
//! touching its code: debuggers, recorders and loggers register observers and
//! receive a [`GraphEvent`] at every lifecycle point.
//!
//! # Design Principles
//!
//! - Hooks execute in registration order
//! - Hooks observe; they never change graph state
//! - Registration is by schedule marker type, singly or as a tuple
//!
//! # Architecture
//!
//! - **Schedule markers** ([`schedule`]): Empty types that identify hook points
//! - **Events** ([`events`]): `GraphEvent` enum carrying context to hooks
//! - **API** ([`api`]): Registration and invocation mechanism
//!
//! # Example
//!
//! ```
//! use arbor_graph::hooks::{GraphEvent, HooksAPI};
//! use arbor_graph::hooks::schedule::{OnBreakPoint, OnTransitionApplied};
//!
//! let hooks = HooksAPI::new();
//! hooks
//!     .register_observer::<OnTransitionApplied, _>("logger", |event: &GraphEvent| {
//!         if let GraphEvent::TransitionApplied { to, link_name, .. } = event {
//!             tracing::info!(state = %to, link = %link_name, "transition");
//!         }
//!     })
//!     .unwrap()
//!     .register_observer::<OnBreakPoint, _>("breaker", |_: &GraphEvent| {})
//!     .unwrap();
//! ```

pub mod api;
pub mod events;
pub mod schedule;

pub use api::{BoxedHook, HookRegistrationError, HooksAPI};
pub use events::{ExitReason, GraphEvent};
pub use schedule::{IntoScheduleIds, Schedule, ScheduleId};
