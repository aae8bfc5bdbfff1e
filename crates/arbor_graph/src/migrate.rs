//! Versioned records and load-time migration.
//!
//! A persisted record carries a `"version"` field. Loading runs the record's
//! upgrade chain one version at a time until it reaches
//! [`Migrate::CURRENT_VERSION`], then deserializes it. Records written before
//! versioning existed have no `"version"` field and are treated as version 0.
//!
//! ```
//! use arbor_graph::migrate::{load_versioned, Migrate, MigrationError};
//! use serde::Deserialize;
//! use serde_json::{json, Value};
//!
//! #[derive(Deserialize)]
//! struct Speed { value: f64 }
//!
//! impl Migrate for Speed {
//!     const CURRENT_VERSION: u32 = 1;
//!
//!     fn upgrade_from_version(mut value: Value, from: u32) -> Result<Value, MigrationError> {
//!         // v0 stored the speed as `kph`
//!         if from == 0 {
//!             let kph = value.get("kph").cloned().unwrap_or(Value::Null);
//!             value["value"] = kph;
//!         }
//!         Ok(value)
//!     }
//! }
//!
//! let speed: Speed = load_versioned(json!({ "kph": 12.0 })).unwrap();
//! assert_eq!(speed.value, 12.0);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Name of the version field in persisted records.
pub const VERSION_KEY: &str = "version";

/// Errors produced while migrating or loading a record.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The record is not a JSON object.
    #[error("versioned record must be a JSON object")]
    NotAnObject,
    /// The record was written by a newer version.
    #[error("record version {found} is newer than supported version {current}")]
    UnsupportedVersion {
        /// Version found in the record.
        found: u64,
        /// Highest version this build understands.
        current: u32,
    },
    /// An upgrade step needed a field that is absent.
    #[error("record version {version} is missing field `{field}`")]
    MissingField {
        /// Version being upgraded from.
        version: u32,
        /// The absent field.
        field: &'static str,
    },
    /// The upgraded record does not match the current schema.
    #[error("failed to deserialize record: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// A record with an explicit upgrade chain.
pub trait Migrate: DeserializeOwned {
    /// The version this build writes.
    const CURRENT_VERSION: u32;

    /// Upgrades a record from version `from` to `from + 1`.
    ///
    /// # Errors
    ///
    /// Returns a [`MigrationError`] if the record cannot be upgraded.
    fn upgrade_from_version(value: Value, from: u32) -> Result<Value, MigrationError>;
}

/// Reads the version of a persisted record; a missing field means 0.
#[must_use]
pub fn record_version(value: &Value) -> u64 {
    value.get(VERSION_KEY).and_then(Value::as_u64).unwrap_or(0)
}

/// Upgrades a record to the current version and deserializes it.
///
/// # Errors
///
/// - [`MigrationError::NotAnObject`] if `value` is not an object
/// - [`MigrationError::UnsupportedVersion`] for records from a newer build
/// - any error from the upgrade chain or from deserialization
pub fn load_versioned<T: Migrate>(value: Value) -> Result<T, MigrationError> {
    if !value.is_object() {
        return Err(MigrationError::NotAnObject);
    }
    let found = record_version(&value);
    if found > u64::from(T::CURRENT_VERSION) {
        return Err(MigrationError::UnsupportedVersion {
            found,
            current: T::CURRENT_VERSION,
        });
    }

    let mut value = value;
    // `found` fits in u32 after the check above
    let start = u32::try_from(found).unwrap_or(T::CURRENT_VERSION);
    for from in start..T::CURRENT_VERSION {
        value = T::upgrade_from_version(value, from)?;
        stamp(&mut value, from + 1)?;
        tracing::debug!(
            record = core::any::type_name::<T>(),
            from,
            to = from + 1,
            "upgraded record"
        );
    }
    Ok(serde_json::from_value(value)?)
}

/// Serializes a record and stamps it with the current version.
///
/// # Errors
///
/// Returns an error if the record does not serialize to a JSON object.
pub fn save_versioned<T: Migrate + Serialize>(record: &T) -> Result<Value, MigrationError> {
    let mut value = serde_json::to_value(record)?;
    stamp(&mut value, T::CURRENT_VERSION)?;
    Ok(value)
}

fn stamp(value: &mut Value, version: u32) -> Result<(), MigrationError> {
    let object = value.as_object_mut().ok_or(MigrationError::NotAnObject)?;
    object.insert(VERSION_KEY.to_string(), Value::from(version));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Label {
        text: String,
        size: u32,
    }

    impl Migrate for Label {
        const CURRENT_VERSION: u32 = 2;

        fn upgrade_from_version(mut value: Value, from: u32) -> Result<Value, MigrationError> {
            match from {
                // v0 -> v1: `caption` renamed to `text`
                0 => {
                    let caption = value
                        .get("caption")
                        .cloned()
                        .ok_or(MigrationError::MissingField {
                            version: 0,
                            field: "caption",
                        })?;
                    value["text"] = caption;
                }
                // v1 -> v2: `size` added
                1 => value["size"] = json!(12),
                _ => {}
            }
            Ok(value)
        }
    }

    #[test]
    fn unversioned_record_runs_full_chain() {
        let label: Label = load_versioned(json!({ "caption": "hi" })).unwrap();
        assert_eq!(
            label,
            Label {
                text: "hi".to_string(),
                size: 12
            }
        );
    }

    #[test]
    fn partial_chain_from_intermediate_version() {
        let label: Label = load_versioned(json!({ "version": 1, "text": "hi" })).unwrap();
        assert_eq!(label.size, 12);
    }

    #[test]
    fn current_record_loads_unchanged() {
        let label: Label = load_versioned(json!({ "version": 2, "text": "a", "size": 3 })).unwrap();
        assert_eq!(label.size, 3);
    }

    #[test]
    fn newer_version_is_rejected() {
        let err = load_versioned::<Label>(json!({ "version": 9 })).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::UnsupportedVersion { found: 9, current: 2 }
        ));
    }

    #[test]
    fn missing_field_in_upgrade_step() {
        let err = load_versioned::<Label>(json!({})).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::MissingField {
                version: 0,
                field: "caption"
            }
        ));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(matches!(
            load_versioned::<Label>(json!(3)),
            Err(MigrationError::NotAnObject)
        ));
    }

    #[test]
    fn save_stamps_current_version() {
        let value = save_versioned(&Label {
            text: "x".to_string(),
            size: 1,
        })
        .unwrap();
        assert_eq!(record_version(&value), 2);
    }
}
