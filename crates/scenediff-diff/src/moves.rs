//! Re-parent detection.
//!
//! A child transform removed from one parent's `m_Children` and added to
//! another's is a move, not an unrelated removal and addition. Each such
//! pair collapses into one [`ChangeKind::Moved`] difference on the child.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use scenediff_types::{ChangeKind, Difference, FileId, ObjectGraph, TypeCode};

use crate::engine::Candidate;
use crate::hierarchy::format_path;

/// Field path reported on moves.
pub const MOVED_FIELD: &str = "m_Father";

static CHILD_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^m_Children\[fileID=(-?\d+)\]$").expect("child entry pattern is valid")
});

/// Child identity named by a `m_Children[fileID=N]` path.
pub fn moved_child(path: &str) -> Option<FileId> {
    CHILD_ENTRY.captures(path)?[1].parse().ok()
}

pub(crate) fn detect_moves(
    candidates: Vec<Candidate>,
    old_graph: &ObjectGraph,
    new_graph: &ObjectGraph,
) -> Vec<Candidate> {
    let mut removed: HashMap<FileId, usize> = HashMap::new();
    let mut added: HashMap<FileId, usize> = HashMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let difference = &candidate.difference;
        if difference.is_whole_record_change || !candidate.type_code.is_transform_like() {
            continue;
        }
        let Some(child) = moved_child(&difference.field_path) else {
            continue;
        };
        match difference.change_kind {
            ChangeKind::Removed => {
                removed.entry(child).or_insert(i);
            }
            ChangeKind::Added => {
                added.entry(child).or_insert(i);
            }
            _ => {}
        }
    }

    let mut moves: HashMap<usize, Candidate> = HashMap::new();
    let mut absorbed: HashSet<usize> = HashSet::new();
    for (child, &r) in &removed {
        let Some(&a) = added.get(child) else {
            continue;
        };
        let moved = moved_candidate(*child, &candidates[r], &candidates[a], old_graph, new_graph);
        debug!(
            child = %child,
            from = moved.difference.old_value.as_deref().unwrap_or_default(),
            to = moved.difference.new_value.as_deref().unwrap_or_default(),
            "detected move"
        );
        moves.insert(r, moved);
        absorbed.insert(a);
    }

    candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !absorbed.contains(i))
        .map(|(i, candidate)| moves.remove(&i).unwrap_or(candidate))
        .collect()
}

fn moved_candidate(
    child: FileId,
    removal: &Candidate,
    addition: &Candidate,
    old_graph: &ObjectGraph,
    new_graph: &ObjectGraph,
) -> Candidate {
    let old_parent = parent_name(removal, old_graph, new_graph, removal.old_id, removal.new_id);
    let new_parent = parent_name(addition, new_graph, old_graph, addition.new_id, addition.old_id);

    let (type_code, type_name) = match new_graph.components.get(&child) {
        Some(info) => (info.type_code, info.type_name.clone()),
        None => (TypeCode::TRANSFORM, "Transform".to_string()),
    };
    let base = new_graph
        .hierarchy_path(child)
        .or_else(|| old_graph.hierarchy_path(child));
    let owner_object_name = new_graph
        .object_name(child)
        .or_else(|| old_graph.object_name(child))
        .map(str::to_string);

    Candidate {
        difference: Difference {
            change_kind: ChangeKind::Moved,
            hierarchy_path: format_path(base.as_deref(), &type_name, true),
            component_type: type_name,
            field_path: MOVED_FIELD.to_string(),
            old_value: Some(old_parent),
            new_value: Some(new_parent),
            owner_object_name,
            is_whole_record_change: false,
            record_identity: child,
        },
        old_id: Some(child),
        new_id: Some(child),
        type_code,
        component_list_only: false,
    }
}

/// Name of the object owning a parent transform, looked up on the side the
/// change was observed on first.
fn parent_name(
    candidate: &Candidate,
    graph: &ObjectGraph,
    other: &ObjectGraph,
    id: Option<FileId>,
    other_id: Option<FileId>,
) -> String {
    id.and_then(|id| graph.object_name(id))
        .or_else(|| other_id.and_then(|id| other.object_name(id)))
        .map(str::to_string)
        .or_else(|| candidate.difference.owner_object_name.clone())
        .unwrap_or_else(|| candidate.difference.record_identity.to_string())
}
