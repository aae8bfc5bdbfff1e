//! Tracing subscriber configuration.
//!
//! [`TracingConfig`] describes how log output should look and installs the
//! global `tracing` subscriber on [`TracingConfig::init`]. Graph runtimes only
//! emit events and spans; whether and how they are printed is decided here by
//! the host.
//!
//! # Example
//!
//! ```
//! use arbor_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! // Development: pretty output with debug level and span enter/exit
//! let dev = TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true);
//!
//! // Production: JSON output for log aggregation
//! let prod = TracingConfig::default()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("arbor_state_machine=info,arbor_behaviour_tree=warn");
//! # let _ = (dev, prod);
//! ```

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing and logging configuration.
///
/// Deserializable as part of [`RuntimeConfig`](crate::RuntimeConfig):
///
/// ```json
/// { "level": "debug", "format": "json", "env_filter": "arbor_graph=trace" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Maximum log level.
    #[serde(with = "level_name")]
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Environment filter (e.g., `"arbor_graph=debug,arbor_state_machine=warn"`).
    pub env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a new `TracingConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Builds the [`EnvFilter`] described by this configuration.
    ///
    /// An unparsable filter string falls back to the configured level.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Returns `false` if a subscriber was already installed, in which case
    /// the existing one is kept.
    pub fn init(&self) -> bool {
        let env_filter = self.env_filter();

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
        };

        if installed {
            tracing::info!(
                level = %self.level,
                format = ?self.format,
                "tracing initialized"
            );
        }
        installed
    }
}

/// Serializes [`Level`] by its lowercase name.
mod level_name {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub(super) fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.as_str().to_ascii_lowercase())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse::<Level>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn tracing_config_default_level_is_info() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.span_events);
    }

    #[test]
    fn builder_methods_apply() {
        let config = TracingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("arbor_graph=debug")
            .with_span_events(true);

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("arbor_graph=debug"));
        assert!(config.span_events);
    }

    #[test]
    fn level_deserializes_from_name() {
        let config: TracingConfig =
            serde_json::from_str(r#"{ "level": "warn", "format": "compact" }"#).unwrap();
        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, TracingFormat::Compact);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let result = serde_json::from_str::<TracingConfig>(r#"{ "level": "loud" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn level_round_trips_lowercase() {
        let json = serde_json::to_string(&TracingConfig::default()).unwrap();
        assert!(json.contains(r#""level":"info""#));
    }

    #[test]
    fn second_init_keeps_existing_subscriber() {
        let config = TracingConfig::default().with_format(TracingFormat::Compact);
        config.init();
        assert!(!config.init());
    }
}
