//! Graph instance identity.

use core::fmt;
use std::sync::Arc;

/// Unique identifier for one running graph instance.
///
/// Instance ids are generated using nanoid, so hosts running many trees and
/// state machines can tell their log lines and hook events apart without
/// coordinating id assignment.
///
/// Internally uses `Arc<str>` for cheap cloning (reference count bump only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphInstanceId(Arc<str>);

impl GraphInstanceId {
    /// Creates a new instance id with a unique nanoid.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Creates an instance id from a specific string value.
    ///
    /// Useful for tests or when a host names its graphs itself.
    #[must_use]
    pub fn from_string(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether a graph instance is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayState {
    /// Not running; nothing is active.
    #[default]
    Stopped,
    /// Running every frame.
    Playing,
    /// Frozen in place; frames are ignored.
    Paused,
}

impl Default for GraphInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph_{}", self.0)
    }
}
