use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use scenediff_types::{ChangeKind, Difference};

use crate::error::SdkResult;
use crate::snapshot::Snapshot;

/// Change counts of a comparison, by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub moved: usize,
}

impl DiffSummary {
    pub fn from_differences(differences: &[Difference]) -> Self {
        let mut summary = Self::default();
        for difference in differences {
            match difference.change_kind {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Modified => summary.modified += 1,
                ChangeKind::Moved => summary.moved += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified + self.moved
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} modified, {} moved",
            self.added, self.removed, self.modified, self.moved
        )
    }
}

/// Serialized form of a comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub summary: DiffSummary,
    pub differences: Vec<Difference>,
}

/// Result of comparing two document versions.
///
/// Both snapshots are kept so callers can resolve paths or inspect records
/// on either side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comparison {
    pub old: Snapshot,
    pub new: Snapshot,
    pub differences: Vec<Difference>,
}

impl Comparison {
    /// Returns `true` if the versions are semantically identical.
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_differences(&self.differences)
    }

    /// Differences of one kind.
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &Difference> {
        self.differences
            .iter()
            .filter(move |difference| difference.change_kind == kind)
    }

    /// Differences grouped by hierarchy path, paths in sorted order and
    /// differences in reported order.
    pub fn by_hierarchy_path(&self) -> BTreeMap<&str, Vec<&Difference>> {
        let mut groups: BTreeMap<&str, Vec<&Difference>> = BTreeMap::new();
        for difference in &self.differences {
            groups
                .entry(difference.hierarchy_path.as_str())
                .or_default()
                .push(difference);
        }
        groups
    }

    pub fn report(&self) -> DiffReport {
        DiffReport {
            summary: self.summary(),
            differences: self.differences.clone(),
        }
    }

    /// Pretty-printed JSON of [`report`](Self::report).
    pub fn to_json(&self) -> SdkResult<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}
