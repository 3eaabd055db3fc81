//! Conventional fields read from parsed (or unparsable) record bodies.

use once_cell::sync::Lazy;
use regex::Regex;

use scenediff_types::{FileId, TreeNode, TypeCode};

/// Owning-object back-reference of a component.
pub const OWNER_FIELD: &str = "m_GameObject";
/// Script reference of a script-backed component.
pub const SCRIPT_FIELD: &str = "m_Script";

static OWNER_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*m_GameObject:\s*\{\s*fileID:\s*(-?\d+)").expect("owner pattern is valid")
});

static TOP_LEVEL_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w]*):").expect("type key pattern is valid"));

/// Type name from the first top-level key of a tree, if it has one.
pub fn type_name_from_tree(tree: &TreeNode) -> Option<String> {
    tree.as_mapping()?.first().map(|(key, _)| key.clone())
}

/// Type name from the first unindented `Key:` line of raw text.
pub fn type_name_from_text(raw: &str) -> Option<String> {
    raw.lines()
        .find_map(|line| TOP_LEVEL_KEY.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Resolve the record type name: tree key, raw text key, static table.
pub fn resolve_type_name(tree: Option<&TreeNode>, raw: &str, code: TypeCode) -> String {
    tree.and_then(type_name_from_tree)
        .or_else(|| type_name_from_text(raw))
        .unwrap_or_else(|| code.display_name())
}

/// Body below the single type key, or the tree itself.
pub fn body_of(tree: &TreeNode) -> &TreeNode {
    match tree.as_mapping() {
        Some([(_, inner)]) => inner,
        _ => tree,
    }
}

/// Non-null owning object read from a parsed body.
pub fn owner_from_tree(tree: &TreeNode) -> Option<FileId> {
    body_of(tree).get(OWNER_FIELD)?.file_id()?.non_null()
}

/// Best-effort owner extraction for bodies that were not parsed.
pub fn owner_from_text(raw: &str) -> Option<FileId> {
    let caps = OWNER_REFERENCE.captures(raw)?;
    caps[1].parse::<FileId>().ok()?.non_null()
}

/// Script identity: the script reference's guid, or its non-null `fileID`
/// for references that carry no guid.
pub fn script_identity(tree: &TreeNode) -> Option<String> {
    let script = body_of(tree).get(SCRIPT_FIELD)?;
    if let Some(guid) = script.guid() {
        return Some(guid.to_string());
    }
    script.file_id()?.non_null().map(|id| id.to_string())
}
