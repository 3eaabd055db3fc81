use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Serializer bookkeeping fields that never carry user-visible state.
pub const DEFAULT_IGNORED_FIELDS: &[&str] = &[
    "m_ObjectHideFlags",
    "m_CorrespondingSourceObject",
    "m_PrefabInstance",
    "m_PrefabAsset",
    "m_PrefabParentObject",
    "m_PrefabInternal",
    "m_GameObject",
    "serializedVersion",
    "m_Modification.m_Modifications",
];

/// Configuration for the diff engine.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Re-pair records whose identity changed using their stable key.
    pub reidentify: bool,
    /// Collapse child removed/added pairs into a single move.
    pub detect_moves: bool,
    /// Run the noise filter over the difference list.
    pub filter_noise: bool,
    /// Field paths dropped by the noise filter. A path matches an entry
    /// when it equals it or continues it with `.` or `[`.
    pub ignored_fields: Vec<String>,
    /// Numeric values closer than this are equal. `0.0` only equates
    /// different spellings of the same number.
    pub float_tolerance: f64,
    /// Drop modified `fileID` fields whose values are both plain integers.
    pub ignore_reference_churn: bool,
    /// Drop field-level changes to an object's component list.
    pub collapse_component_lists: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            reidentify: true,
            detect_moves: true,
            filter_noise: true,
            ignored_fields: DEFAULT_IGNORED_FIELDS.iter().map(|f| f.to_string()).collect(),
            float_tolerance: 0.0,
            ignore_reference_churn: true,
            collapse_component_lists: true,
        }
    }
}

impl DiffConfig {
    /// Report every structural change: no noise filtering and no move
    /// detection. Records are still re-identified.
    pub fn raw() -> Self {
        Self {
            detect_moves: false,
            filter_noise: false,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| DiffError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> DiffResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml_string(&self) -> DiffResult<String> {
        toml::to_string(self).map_err(|e| DiffError::Config(e.to_string()))
    }

    fn validate(&self) -> DiffResult<()> {
        if !self.float_tolerance.is_finite() || self.float_tolerance < 0.0 {
            return Err(DiffError::Config(format!(
                "float_tolerance must be a finite non-negative number, got {}",
                self.float_tolerance
            )));
        }
        Ok(())
    }

    /// Returns `true` if `path` falls under an ignored field.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored_fields.iter().any(|field| path_within(path, field))
    }
}

/// Returns `true` if `path` is `field` or a path below it.
pub fn path_within(path: &str, field: &str) -> bool {
    path.strip_prefix(field)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['.', '[']))
}
