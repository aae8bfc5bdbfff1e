//! Versioned persistence for state links.
//!
//! Version 0 records stored the target as `state_id` and the timing as an
//! `immediate_transition` flag. Version 1 stores `target` and a full
//! [`TransitionTiming`].
//!
//! ```
//! use arbor_state_machine::prelude::*;
//! use serde_json::json;
//!
//! let link = StateLink::load(json!({
//!     "name": "Flee",
//!     "state_id": 7,
//!     "immediate_transition": true,
//! }))
//! .unwrap();
//! assert_eq!(link.timing, TransitionTiming::Immediate);
//! assert_eq!(link.target.raw(), 7);
//! ```

use arbor_graph::link::NodeLink;
use arbor_graph::migrate::{Migrate, MigrationError, load_versioned, save_versioned};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::link::{StateLink, TransitionTiming};

/// Persisted form of a [`StateLink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLinkRecord {
    /// Link name.
    pub name: String,
    /// Raw target id, `0` when unconnected.
    pub target: NodeLink,
    /// Transition timing.
    #[serde(default)]
    pub timing: TransitionTiming,
}

impl Migrate for StateLinkRecord {
    const CURRENT_VERSION: u32 = 1;

    fn upgrade_from_version(mut value: Value, from: u32) -> Result<Value, MigrationError> {
        if from == 0 {
            let object = value.as_object_mut().ok_or(MigrationError::NotAnObject)?;
            let target = object
                .remove("state_id")
                .ok_or(MigrationError::MissingField {
                    version: 0,
                    field: "state_id",
                })?;
            let immediate = object
                .remove("immediate_transition")
                .as_ref()
                .and_then(Value::as_bool)
                .ok_or(MigrationError::MissingField {
                    version: 0,
                    field: "immediate_transition",
                })?;
            let timing = if immediate {
                TransitionTiming::Immediate
            } else {
                TransitionTiming::LateUpdateDontOverwrite
            };
            object.insert("target".to_string(), target);
            object.insert("timing".to_string(), serde_json::to_value(timing)?);
        }
        Ok(value)
    }
}

impl From<&StateLink> for StateLinkRecord {
    fn from(link: &StateLink) -> Self {
        Self {
            name: link.name.clone(),
            target: link.target,
            timing: link.timing,
        }
    }
}

impl From<StateLinkRecord> for StateLink {
    fn from(record: StateLinkRecord) -> Self {
        Self {
            name: record.name,
            target: record.target,
            timing: record.timing,
        }
    }
}

impl StateLink {
    /// Loads a link from a persisted record of any supported version.
    ///
    /// # Errors
    ///
    /// Returns a [`MigrationError`] if the record cannot be upgraded or does
    /// not match the current schema.
    pub fn load(value: Value) -> Result<Self, MigrationError> {
        load_versioned::<StateLinkRecord>(value).map(Self::from)
    }

    /// Saves the link as a current-version record.
    ///
    /// # Errors
    ///
    /// Returns a [`MigrationError`] if serialization fails.
    pub fn save(&self) -> Result<Value, MigrationError> {
        save_versioned(&StateLinkRecord::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_graph::node::NodeId;
    use serde_json::json;

    #[test]
    fn v0_deferred_link_upgrades_to_default_timing() {
        let link = StateLink::load(json!({
            "name": "Patrol",
            "state_id": 3,
            "immediate_transition": false,
        }))
        .unwrap();

        assert_eq!(link.name, "Patrol");
        assert_eq!(link.target.target(), NodeId::from_raw(3));
        assert_eq!(link.timing, TransitionTiming::LateUpdateDontOverwrite);
    }

    #[test]
    fn v0_unconnected_link_stays_unconnected() {
        let link = StateLink::load(json!({
            "name": "Nowhere",
            "state_id": 0,
            "immediate_transition": true,
        }))
        .unwrap();
        assert!(!link.target.is_connected());
    }

    #[test]
    fn v0_without_flag_is_rejected() {
        let err = StateLink::load(json!({ "name": "Broken", "state_id": 2 })).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::MissingField {
                version: 0,
                field: "immediate_transition"
            }
        ));
    }

    #[test]
    fn saved_link_is_stamped_and_reloads() {
        let link = StateLink::new("Chase", TransitionTiming::NextUpdateOverwrite)
            .with_target(NodeId::from_raw(9).unwrap());
        let value = link.save().unwrap();

        assert_eq!(value["version"], json!(1));
        assert_eq!(value["target"], json!(9));
        assert_eq!(value["timing"], json!("next_update_overwrite"));
        assert_eq!(StateLink::load(value).unwrap(), link);
    }

    #[test]
    fn newer_record_is_rejected() {
        let err = StateLink::load(json!({ "version": 2, "name": "x", "target": 1 })).unwrap_err();
        assert!(matches!(err, MigrationError::UnsupportedVersion { found: 2, .. }));
    }
}
