//! Node execution status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Tri-state result of executing a tree node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Still executing; will be ticked again.
    #[default]
    Running,
    /// Finished successfully.
    Success,
    /// Finished unsuccessfully.
    Failure,
}

impl NodeStatus {
    /// Returns whether the status is terminal.
    #[must_use]
    pub fn is_finished(self) -> bool {
        !matches!(self, NodeStatus::Running)
    }

    /// Converts a success flag to a terminal status.
    #[must_use]
    pub fn from_success(success: bool) -> Self {
        if success {
            NodeStatus::Success
        } else {
            NodeStatus::Failure
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStatus::Running => "running",
            NodeStatus::Success => "success",
            NodeStatus::Failure => "failure",
        };
        f.write_str(name)
    }
}
