//! Matching strategies for sequences.
//!
//! A sequence is classified once, then diffed by the first strategy that
//! applies:
//!
//! 1. [`SequenceShape::ReferenceArray`]: elements are references (or
//!    mappings holding exactly one reference) and are matched by referenced
//!    identity. Inserting at the front reports one addition, not a shift.
//! 2. [`SequenceShape::NamedArray`]: elements are mappings with a `name`
//!    scalar and are matched by `(name, occurrence)`.
//! 3. [`SequenceShape::Opaque`]: matched by position.
//!
//! Reordering a keyed sequence is not reported.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use scenediff_types::TreeNode;

use crate::tree_diff::{diff_nodes, FieldChange};

const NAME_FIELD: &str = "name";

/// How the elements of a sequence pair are matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceShape {
    ReferenceArray,
    NamedArray,
    Opaque,
}

/// Classify a pair of sequences.
///
/// A keyed shape applies only when every element on both sides has a key
/// and no key repeats within a side; anything else is matched by position.
pub fn classify(old: &[TreeNode], new: &[TreeNode]) -> SequenceShape {
    if old.is_empty() && new.is_empty() {
        return SequenceShape::Opaque;
    }
    if has_unique_keys(old, reference_key) && has_unique_keys(new, reference_key) {
        return SequenceShape::ReferenceArray;
    }
    if old.iter().chain(new).all(|item| name_of(item).is_some()) {
        return SequenceShape::NamedArray;
    }
    SequenceShape::Opaque
}

/// Diff two sequences at `path`, appending to `out`.
pub fn diff_sequences(old: &[TreeNode], new: &[TreeNode], path: &str, out: &mut Vec<FieldChange>) {
    match classify(old, new) {
        SequenceShape::ReferenceArray => {
            diff_keyed(&reference_keys(old), &reference_keys(new), old, new, path, out)
        }
        SequenceShape::NamedArray => {
            diff_keyed(&named_keys(old), &named_keys(new), old, new, path, out)
        }
        SequenceShape::Opaque => {
            if is_ambiguous(old) || is_ambiguous(new) {
                debug!(path, "sequence elements cannot be keyed; matching by position");
            }
            for i in 0..old.len().max(new.len()) {
                diff_nodes(old.get(i), new.get(i), &format!("{path}[{i}]"), out);
            }
        }
    }
}

/// Match elements by key. Matched pairs recurse; unmatched old elements are
/// removed and unmatched new elements are added, each in their own order.
fn diff_keyed(
    old_keys: &[String],
    new_keys: &[String],
    old: &[TreeNode],
    new: &[TreeNode],
    path: &str,
    out: &mut Vec<FieldChange>,
) {
    let new_index: HashMap<&str, usize> = new_keys
        .iter()
        .enumerate()
        .map(|(i, key)| (key.as_str(), i))
        .collect();
    let old_set: HashSet<&str> = old_keys.iter().map(String::as_str).collect();

    for (key, old_item) in old_keys.iter().zip(old) {
        let new_item = new_index.get(key.as_str()).map(|&i| &new[i]);
        diff_nodes(Some(old_item), new_item, &format!("{path}[{key}]"), out);
    }
    for (key, new_item) in new_keys.iter().zip(new) {
        if !old_set.contains(key.as_str()) {
            diff_nodes(None, Some(new_item), &format!("{path}[{key}]"), out);
        }
    }
}

/// Key of a reference element: `fileID=N`, plus `,guid=G` for cross-file
/// references.
///
/// An element keys by reference when it is one, or when it is a mapping
/// with exactly one reference among its direct values (`- component: {..}`,
/// or an event call carrying `m_Target: {..}` next to plain fields).
pub fn reference_key(node: &TreeNode) -> Option<String> {
    let reference = if node.is_reference() {
        node
    } else {
        let mut references = node
            .as_mapping()?
            .iter()
            .map(|(_, value)| value)
            .filter(|value| value.is_reference());
        match (references.next(), references.next()) {
            (Some(inner), None) => inner,
            _ => return None,
        }
    };
    let file_id = reference.file_id()?;
    Some(match reference.guid() {
        Some(guid) => format!("fileID={file_id},guid={guid}"),
        None => format!("fileID={file_id}"),
    })
}

fn name_of(node: &TreeNode) -> Option<&str> {
    node.get(NAME_FIELD)?.as_scalar()
}

fn has_unique_keys(items: &[TreeNode], key: impl Fn(&TreeNode) -> Option<String>) -> bool {
    let mut seen = HashSet::new();
    items
        .iter()
        .all(|item| key(item).is_some_and(|k| seen.insert(k)))
}

fn is_ambiguous(items: &[TreeNode]) -> bool {
    items.iter().any(|item| reference_key(item).is_some() || name_of(item).is_some())
}

fn reference_keys(items: &[TreeNode]) -> Vec<String> {
    items.iter().filter_map(reference_key).collect()
}

/// `name=X` for the first occurrence of a name, `name=X#k` for the k-th
/// repeat.
fn named_keys(items: &[TreeNode]) -> Vec<String> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    items
        .iter()
        .filter_map(name_of)
        .map(|name| {
            let seen = occurrences.entry(name).or_insert(0);
            let key = match *seen {
                0 => format!("name={name}"),
                k => format!("name={name}#{k}"),
            };
            *seen += 1;
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenediff_types::ChangeKind;

    fn component(id: i64) -> TreeNode {
        TreeNode::mapping([("component", TreeNode::reference(id))])
    }

    fn named(name: &str, value: &str) -> TreeNode {
        TreeNode::mapping([
            ("name", TreeNode::scalar(name)),
            ("value", TreeNode::scalar(value)),
        ])
    }

    fn diff(old: &[TreeNode], new: &[TreeNode]) -> Vec<FieldChange> {
        let mut out = Vec::new();
        diff_sequences(old, new, "list", &mut out);
        out
    }

    #[test]
    fn classifies_shapes() {
        let refs = [TreeNode::reference(1), TreeNode::reference(2)];
        assert_eq!(classify(&refs, &[]), SequenceShape::ReferenceArray);
        assert_eq!(classify(&[component(1)], &[component(2)]), SequenceShape::ReferenceArray);
        assert_eq!(classify(&[named("a", "1")], &[]), SequenceShape::NamedArray);
        assert_eq!(
            classify(&[TreeNode::scalar("1")], &[TreeNode::scalar("2")]),
            SequenceShape::Opaque
        );
        assert_eq!(classify(&[], &[]), SequenceShape::Opaque);
    }

    #[test]
    fn mixed_or_duplicate_references_fall_back_to_position() {
        let mixed = [TreeNode::reference(1), TreeNode::scalar("x")];
        assert_eq!(classify(&mixed, &[]), SequenceShape::Opaque);
        let duplicated = [TreeNode::reference(0), TreeNode::reference(0)];
        assert_eq!(classify(&duplicated, &duplicated), SequenceShape::Opaque);
    }

    #[test]
    fn insertion_at_front_reports_one_addition() {
        let old = [TreeNode::reference(1), TreeNode::reference(2), TreeNode::reference(3)];
        let new = [
            TreeNode::reference(9),
            TreeNode::reference(1),
            TreeNode::reference(2),
            TreeNode::reference(3),
        ];
        let changes = diff(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Added);
        assert_eq!(changes[0].path, "list[fileID=9]");
        assert_eq!(changes[0].new_value.as_deref(), Some("{fileID: 9}"));
    }

    #[test]
    fn removal_from_wrapped_references() {
        let changes = diff(&[component(1), component(2)], &[component(2)]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Removed);
        assert_eq!(changes[0].path, "list[fileID=1]");
    }

    #[test]
    fn guid_is_part_of_the_key() {
        let a = TreeNode::mapping([
            ("fileID", TreeNode::scalar("2100000")),
            ("guid", TreeNode::scalar("aaa")),
        ]);
        let b = TreeNode::mapping([
            ("fileID", TreeNode::scalar("2100000")),
            ("guid", TreeNode::scalar("bbb")),
        ]);
        let changes = diff(&[a], &[b]);
        let paths: Vec<_> = changes.iter().map(|c| (c.kind, c.path.as_str())).collect();
        assert_eq!(
            paths,
            vec![
                (ChangeKind::Removed, "list[fileID=2100000,guid=aaa]"),
                (ChangeKind::Added, "list[fileID=2100000,guid=bbb]"),
            ]
        );
    }

    #[test]
    fn named_elements_match_by_name() {
        let old = [named("Jump", "1"), named("Fire", "2")];
        let new = [named("Fire", "3"), named("Jump", "1")];
        let changes = diff(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "list[name=Fire].value");
        assert_eq!(changes[0].old_value.as_deref(), Some("2"));
        assert_eq!(changes[0].new_value.as_deref(), Some("3"));
    }

    #[test]
    fn duplicate_names_use_occurrence() {
        let old = [named("Axis", "1"), named("Axis", "2")];
        let new = [named("Axis", "1"), named("Axis", "5")];
        let changes = diff(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "list[name=Axis#1].value");
    }

    #[test]
    fn opaque_sequences_match_by_position() {
        let old = [TreeNode::scalar("a"), TreeNode::scalar("b")];
        let new = [TreeNode::scalar("a"), TreeNode::scalar("c"), TreeNode::scalar("d")];
        let changes = diff(&old, &new);
        let paths: Vec<_> = changes.iter().map(|c| (c.kind, c.path.as_str())).collect();
        assert_eq!(
            paths,
            vec![(ChangeKind::Modified, "list[1]"), (ChangeKind::Added, "list[2]")]
        );
    }

    fn call(target: i64, method: &str) -> TreeNode {
        TreeNode::mapping([
            ("m_Target", TreeNode::reference(target)),
            ("m_MethodName", TreeNode::scalar(method)),
            ("m_Mode", TreeNode::scalar("1")),
        ])
    }

    #[test]
    fn elements_containing_one_reference_are_keyed() {
        assert_eq!(reference_key(&call(40, "Open")).as_deref(), Some("fileID=40"));
        let two_refs = TreeNode::mapping([
            ("m_Target", TreeNode::reference(1)),
            ("m_Source", TreeNode::reference(2)),
        ]);
        assert_eq!(reference_key(&two_refs), None);
        assert_eq!(reference_key(&named("a", "1")), None);

        let old = [call(40, "Open"), call(41, "Close")];
        let new = [call(39, "Play"), call(40, "Open"), call(41, "Lock")];
        let changes = diff(&old, &new);
        let paths: Vec<_> = changes.iter().map(|c| (c.kind, c.path.as_str())).collect();
        assert_eq!(
            paths,
            vec![
                (ChangeKind::Modified, "list[fileID=41].m_MethodName"),
                (ChangeKind::Added, "list[fileID=39]"),
            ]
        );
    }

    #[test]
    fn reorder_is_not_reported() {
        let old = [TreeNode::reference(1), TreeNode::reference(2)];
        let new = [TreeNode::reference(2), TreeNode::reference(1)];
        assert!(diff(&old, &new).is_empty());
    }
}
