//! Core infrastructure for Arbor.
//!
//! This crate provides the pieces every graph runtime needs regardless of
//! whether it interprets a behaviour tree or a state machine:
//!
//! - [`RuntimeConfig`] - Serde-backed configuration for trees, state machines and tracing
//! - [`FrameClock`] - Per-graph frame time accounting that freezes while paused
//! - [`Blackboard`] - Shared parameter store read and written by behaviours
//! - [`TracingConfig`] - Installs the `tracing` subscriber
//!
//! # Feature Flags
//!
//! - `test-utils` - Enables `MockClock` for deterministic time testing
//!
//! # Example
//!
//! ```no_run
//! use arbor_core::{RuntimeConfig, TracingFormat};
//!
//! let config = RuntimeConfig::from_json_str(r#"{ "tree": { "max_steps_per_tick": 64 } }"#)
//!     .expect("valid config");
//! config.tracing.clone().with_format(TracingFormat::Compact).init();
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`arbor_core`): configuration, time, blackboard, tracing (this crate)
//! - **Layer 2** (`arbor_graph`): node store, link resolution, hooks
//! - **Layer 3** (`arbor_behaviour_tree`, `arbor_state_machine`): graph interpreters

mod blackboard;
mod config;
mod time;
mod tracing_setup;

pub use blackboard::Blackboard;
pub use config::{ConfigError, FsmConfig, RuntimeConfig, TreeConfig};
pub use time::{Clock, ClockProvider, FrameClock};
pub use tracing_setup::{TracingConfig, TracingFormat};

// Re-export test utilities
#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;
