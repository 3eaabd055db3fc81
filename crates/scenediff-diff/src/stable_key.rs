//! Identity-independent keys for re-pairing records across versions.

use scenediff_types::{FileId, Record, TypeCode};

/// A secondary record key that survives identity renumbering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StableKey {
    /// A transform-like record: one per owning object and kind.
    Transform { type_code: TypeCode, owner: FileId },
    /// A script-backed component: one per owner and script.
    Script { owner: FileId, script: String },
    /// Any other owned component.
    Component {
        owner: FileId,
        type_code: TypeCode,
        type_name: String,
    },
}

/// Stable key of a record.
///
/// Objects, placeholders and records without an owner have none; they are
/// matched by identity only.
pub fn stable_key(record: &Record) -> Option<StableKey> {
    if record.is_object() || record.is_placeholder() {
        return None;
    }
    let owner = record.owner_object?.non_null()?;
    if record.is_transform_like() {
        return Some(StableKey::Transform {
            type_code: record.type_code(),
            owner,
        });
    }
    if let Some(script) = &record.script_identity {
        return Some(StableKey::Script {
            owner,
            script: script.clone(),
        });
    }
    Some(StableKey::Component {
        owner,
        type_code: record.type_code(),
        type_name: record.type_name.clone(),
    })
}
