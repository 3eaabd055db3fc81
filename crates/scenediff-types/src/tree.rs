//! Generic record body tree.
//!
//! A [`TreeNode`] is the parsed form of a record body: a strictly acyclic
//! tree of scalars, ordered mappings and sequences. Reference-shaped values
//! such as `{fileID: 12, guid: abc, type: 3}` are plain mappings; helpers
//! like [`TreeNode::file_id`] read them without introducing a special variant.

use std::fmt;

use crate::id::FileId;

/// Field name carrying the identity inside an inline reference.
pub const FILE_ID_KEY: &str = "fileID";
/// Field name carrying the asset guid inside an inline reference.
pub const GUID_KEY: &str = "guid";

/// One node of a record body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeNode {
    /// Verbatim scalar text (quotes removed, escapes resolved).
    Scalar(String),
    /// Ordered key/value entries; keys are unique.
    Mapping(Vec<(String, TreeNode)>),
    /// Ordered items.
    Sequence(Vec<TreeNode>),
}

impl TreeNode {
    /// Convenience constructor for a scalar.
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// Build a mapping from entries, applying last-wins on duplicate keys.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, TreeNode)>) -> Self {
        let mut out = Vec::new();
        for (key, value) in entries {
            insert_entry(&mut out, key.into(), value);
        }
        Self::Mapping(out)
    }

    /// Build an inline reference mapping `{fileID: N}`.
    pub fn reference(id: i64) -> Self {
        Self::Mapping(vec![(FILE_ID_KEY.to_string(), Self::Scalar(id.to_string()))])
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Mapping(_) => "mapping",
            Self::Sequence(_) => "sequence",
        }
    }

    /// Returns `true` if both nodes are of the same variant.
    pub fn same_kind(&self, other: &TreeNode) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, TreeNode)]> {
        match self {
            Self::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TreeNode]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a mapping node.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a dotted path of mapping keys, e.g. `m_Script.guid`.
    pub fn get_path(&self, path: &str) -> Option<&TreeNode> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// The identity of an inline reference (`{fileID: N, ...}`).
    pub fn file_id(&self) -> Option<FileId> {
        self.get(FILE_ID_KEY)?.as_scalar()?.parse().ok()
    }

    /// The guid of an inline reference, when present and non-empty.
    pub fn guid(&self) -> Option<&str> {
        self.get(GUID_KEY)?
            .as_scalar()
            .filter(|guid| !guid.is_empty())
    }

    /// Returns `true` if this node has the inline reference shape.
    pub fn is_reference(&self) -> bool {
        self.file_id().is_some()
    }
}

/// Insert into an ordered entry list. A duplicate key keeps its first
/// position and takes the last value.
pub fn insert_entry(entries: &mut Vec<(String, TreeNode)>, key: String, value: TreeNode) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, existing)) => *existing = value,
        None => entries.push((key, value)),
    }
}

/// Flow-style rendering: `{a: 1, b: [x, y]}`.
impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Mapping(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
