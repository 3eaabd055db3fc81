use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::FileId;

/// Field path used by whole-record differences.
pub const WHOLE_RECORD: &str = "(whole record)";

/// The kind of a reported change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    /// An object re-parented from one transform to another.
    Moved,
}

impl ChangeKind {
    /// The kind reported when old and new are swapped.
    pub fn inverse(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            other => other,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Removed => write!(f, "Removed"),
            Self::Modified => write!(f, "Modified"),
            Self::Moved => write!(f, "Moved"),
        }
    }
}

/// One change between the old and new record sets.
///
/// Produced only by the diff engine; consumers treat it as read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    pub change_kind: ChangeKind,
    /// Type name of the record the change belongs to (resolved script name
    /// for script-backed components when a resolver is available).
    pub component_type: String,
    /// Dotted field path inside the record body, or [`WHOLE_RECORD`].
    pub field_path: String,
    /// `/root/.../name`, with ` (Type)` appended for component-level changes.
    pub hierarchy_path: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub owner_object_name: Option<String>,
    pub is_whole_record_change: bool,
    /// Identity of the record the change is anchored to (new side when the
    /// record exists there, old side otherwise).
    pub record_identity: FileId,
}

impl Difference {
    /// One-line human readable description.
    pub fn summary(&self) -> String {
        let location = if self.is_whole_record_change {
            self.hierarchy_path.clone()
        } else {
            format!("{} {}", self.hierarchy_path, self.field_path)
        };
        match (self.change_kind, &self.old_value, &self.new_value) {
            (ChangeKind::Modified | ChangeKind::Moved, Some(old), Some(new)) => {
                format!("{} {}: {} -> {}", self.change_kind, location, old, new)
            }
            (_, _, Some(value)) | (_, Some(value), None) if !self.is_whole_record_change => {
                format!("{} {}: {}", self.change_kind, location, value)
            }
            _ => format!("{} {}", self.change_kind, location),
        }
    }

    /// The same change seen from the other direction.
    pub fn inverted(&self) -> Self {
        Self {
            change_kind: self.change_kind.inverse(),
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
