//! Runtime configuration.
//!
//! Configuration is passed explicitly to every graph runtime; there is no
//! global settings object. All structs deserialize with defaults for any
//! missing field, so a partial JSON document is a valid configuration.
//!
//! ```
//! use arbor_core::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_json_str(
//!     r#"{ "fsm": { "history_capacity": 8 }, "tracing": { "level": "debug" } }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.fsm.history_capacity, 8);
//! assert!(config.tree.restart_on_finish);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tracing_setup::TracingConfig;

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration document is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the runtime cannot work with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// TreeConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Behaviour tree runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Restart the tree on the tick after the root's child finishes.
    /// When `false` the tree stops and keeps its last result.
    pub restart_on_finish: bool,
    /// Upper bound on execution steps within a single tick.
    pub max_steps_per_tick: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            restart_on_finish: true,
            max_steps_per_tick: 256,
        }
    }
}

impl TreeConfig {
    /// Sets whether the tree restarts after finishing.
    #[must_use]
    pub fn with_restart_on_finish(mut self, restart: bool) -> Self {
        self.restart_on_finish = restart;
        self
    }

    /// Sets the per-tick step bound.
    #[must_use]
    pub fn with_max_steps_per_tick(mut self, steps: usize) -> Self {
        self.max_steps_per_tick = steps;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FsmConfig
// ─────────────────────────────────────────────────────────────────────────────

/// State machine runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmConfig {
    /// Number of applied transitions kept in the history ring.
    /// Zero disables history.
    pub history_capacity: usize,
    /// Pause the machine when it enters a state flagged as a break point.
    pub pause_on_break_point: bool,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            history_capacity: 32,
            pause_on_break_point: true,
        }
    }
}

impl FsmConfig {
    /// Sets the transition history capacity.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets whether break points pause the machine.
    #[must_use]
    pub fn with_pause_on_break_point(mut self, pause: bool) -> Self {
        self.pause_on_break_point = pause;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RuntimeConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for an Arbor host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Log output settings.
    pub tracing: TracingConfig,
    /// Behaviour tree settings.
    pub tree: TreeConfig,
    /// State machine settings.
    pub fsm: FsmConfig,
}

impl RuntimeConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tracing settings.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Replaces the behaviour tree settings.
    #[must_use]
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Replaces the state machine settings.
    #[must_use]
    pub fn with_fsm(mut self, fsm: FsmConfig) -> Self {
        self.fsm = fsm;
        self
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded runtime config");
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot drive a runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tree.max_steps_per_tick == 0 {
            return Err(ConfigError::Invalid {
                field: "tree.max_steps_per_tick",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = RuntimeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.tree.max_steps_per_tick, 256);
        assert_eq!(config.fsm.history_capacity, 32);
        assert!(config.fsm.pause_on_break_point);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config =
            RuntimeConfig::from_json_str(r#"{ "tree": { "restart_on_finish": false } }"#).unwrap();
        assert!(!config.tree.restart_on_finish);
        assert_eq!(config.tree.max_steps_per_tick, 256);
    }

    #[test]
    fn zero_step_budget_is_invalid() {
        let err = RuntimeConfig::from_json_str(r#"{ "tree": { "max_steps_per_tick": 0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "tree.max_steps_per_tick",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RuntimeConfig::from_json_str("{ tree: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builders_compose() {
        let config = RuntimeConfig::new()
            .with_tree(TreeConfig::default().with_max_steps_per_tick(8))
            .with_fsm(
                FsmConfig::default()
                    .with_history_capacity(0)
                    .with_pause_on_break_point(false),
            );
        assert_eq!(config.tree.max_steps_per_tick, 8);
        assert_eq!(config.fsm.history_capacity, 0);
        assert!(!config.fsm.pause_on_break_point);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fsm": {{ "history_capacity": 4 }} }}"#).unwrap();

        let config = RuntimeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.fsm.history_capacity, 4);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
