//! Recursive field-level diff of two record bodies.
//!
//! Mappings are compared key by key, scalars verbatim, and sequences through
//! the strategy chosen in [`crate::sequence`]. Nodes of different kinds are
//! reported as one whole-subtree modification.

use std::collections::HashSet;

use scenediff_types::{ChangeKind, TreeNode};

use crate::sequence::diff_sequences;

/// One changed field inside a record body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldChange {
    pub kind: ChangeKind,
    /// Dotted path below the type key, with `[...]` sequence segments.
    pub path: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldChange {
    fn added(path: &str, node: &TreeNode) -> Self {
        Self {
            kind: ChangeKind::Added,
            path: path.to_string(),
            old_value: None,
            new_value: Some(render(node)),
        }
    }

    fn removed(path: &str, node: &TreeNode) -> Self {
        Self {
            kind: ChangeKind::Removed,
            path: path.to_string(),
            old_value: Some(render(node)),
            new_value: None,
        }
    }

    fn modified(path: &str, old: &TreeNode, new: &TreeNode) -> Self {
        Self {
            kind: ChangeKind::Modified,
            path: path.to_string(),
            old_value: Some(render(old)),
            new_value: Some(render(new)),
        }
    }
}

/// Diff two record bodies.
pub fn diff_bodies(old: &TreeNode, new: &TreeNode) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    diff_nodes(Some(old), Some(new), "", &mut changes);
    changes
}

/// Diff two optional nodes at `path`, appending to `out`.
pub fn diff_nodes(
    old: Option<&TreeNode>,
    new: Option<&TreeNode>,
    path: &str,
    out: &mut Vec<FieldChange>,
) {
    let (old, new) = match (old, new) {
        (None, None) => return,
        (None, Some(new)) => return out.push(FieldChange::added(path, new)),
        (Some(old), None) => return out.push(FieldChange::removed(path, old)),
        (Some(old), Some(new)) => (old, new),
    };

    match (old, new) {
        (TreeNode::Scalar(a), TreeNode::Scalar(b)) => {
            if a != b {
                out.push(FieldChange::modified(path, old, new));
            }
        }
        (TreeNode::Mapping(a), TreeNode::Mapping(b)) => {
            for (key, old_value) in a {
                diff_nodes(Some(old_value), new.get(key), &join_key(path, key), out);
            }
            let old_keys: HashSet<&str> = a.iter().map(|(key, _)| key.as_str()).collect();
            for (key, new_value) in b {
                if !old_keys.contains(key.as_str()) {
                    out.push(FieldChange::added(&join_key(path, key), new_value));
                }
            }
        }
        (TreeNode::Sequence(a), TreeNode::Sequence(b)) => diff_sequences(a, b, path, out),
        _ => out.push(FieldChange::modified(path, old, new)),
    }
}

/// Text of a value as reported in a difference: scalars verbatim,
/// collections in flow style.
pub fn render(node: &TreeNode) -> String {
    match node {
        TreeNode::Scalar(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
