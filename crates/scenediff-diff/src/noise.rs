//! Post-pass that drops serializer bookkeeping from the difference list.
//!
//! Dropped:
//! - field changes under an ignored path,
//! - modifications between numerically equal values,
//! - modifications of a trailing `fileID` between two plain integers,
//! - field changes to an object's component list,
//! - whole-record additions/removals of objects whose body is nothing but
//!   their component list.

use tracing::debug;

use scenediff_types::{ChangeKind, Record, TreeNode};

use crate::config::{path_within, DiffConfig};
use crate::engine::Candidate;

/// Owned-components list of an object record.
pub const COMPONENTS_FIELD: &str = "m_Component";
const FILE_ID_FIELD: &str = "fileID";

pub(crate) fn filter_noise(candidates: Vec<Candidate>, config: &DiffConfig) -> Vec<Candidate> {
    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|candidate| !is_noise(candidate, config))
        .collect();
    debug!(dropped = before - kept.len(), kept = kept.len(), "filtered noise");
    kept
}

fn is_noise(candidate: &Candidate, config: &DiffConfig) -> bool {
    let difference = &candidate.difference;
    if difference.is_whole_record_change {
        return candidate.component_list_only && difference.change_kind != ChangeKind::Modified;
    }
    let path = difference.field_path.as_str();
    if config.is_ignored(path) {
        return true;
    }
    if config.collapse_component_lists
        && candidate.type_code.is_object()
        && path_within(path, COMPONENTS_FIELD)
    {
        return true;
    }
    if difference.change_kind != ChangeKind::Modified {
        return false;
    }
    match (&difference.old_value, &difference.new_value) {
        (Some(old), Some(new)) => {
            numerically_equal(old, new, config.float_tolerance)
                || (config.ignore_reference_churn && is_reference_churn(path, old, new))
        }
        _ => false,
    }
}

/// Returns `true` if both values parse as numbers within `tolerance`.
///
/// Two integers are compared exactly, so 64-bit identifiers beyond `f64`
/// precision never collapse.
pub fn numerically_equal(old: &str, new: &str, tolerance: f64) -> bool {
    let (old, new) = (old.trim(), new.trim());
    if let Some(equal) = integers_equal(old, new, tolerance) {
        return equal;
    }
    match (old.parse::<f64>(), new.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b || (a - b).abs() <= tolerance,
        _ => false,
    }
}

/// Exact comparison when both values are integer literals.
fn integers_equal(old: &str, new: &str, tolerance: f64) -> Option<bool> {
    let (a, b) = (old.parse::<i128>().ok()?, new.parse::<i128>().ok()?);
    Some(a == b || (a - b).unsigned_abs() as f64 <= tolerance)
}

/// Returns `true` for a `fileID` field changing between two integers.
pub fn is_reference_churn(path: &str, old: &str, new: &str) -> bool {
    let trailing = path.rsplit('.').next().unwrap_or(path);
    trailing == FILE_ID_FIELD && old.trim().parse::<i64>().is_ok() && new.trim().parse::<i64>().is_ok()
}

/// Returns `true` for an object record whose body, ignored fields aside,
/// holds only its component list.
pub fn is_component_list_only(record: &Record, config: &DiffConfig) -> bool {
    if !record.is_object() {
        return false;
    }
    let Some(entries) = record.body().and_then(TreeNode::as_mapping) else {
        return false;
    };
    entries.iter().any(|(key, _)| key == COMPONENTS_FIELD)
        && entries
            .iter()
            .all(|(key, _)| key == COMPONENTS_FIELD || config.is_ignored(key))
}
