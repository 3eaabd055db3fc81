use serde::{Deserialize, Serialize};

use crate::id::{FileId, TypeCode};
use crate::tree::TreeNode;

/// Parsed header line of a record (`--- !u!<code> &<id> [stripped]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHeader {
    pub type_code: TypeCode,
    pub file_id: FileId,
    /// The record stands in for an object defined in another file; its body
    /// is incomplete and is never tree-diffed.
    pub is_placeholder: bool,
}

impl RecordHeader {
    pub fn new(type_code: TypeCode, file_id: FileId, is_placeholder: bool) -> Self {
        Self {
            type_code,
            file_id,
            is_placeholder,
        }
    }
}

/// One parsed record of a document version.
///
/// Records are produced once by the parser and never mutated afterwards.
/// A record whose body failed to parse keeps its header and raw text with
/// `tree = None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub header: RecordHeader,
    /// First top-level key of the body, or the static name of the type code.
    pub type_name: String,
    /// Body text as it appeared in the document (header line excluded).
    pub raw_text: String,
    pub tree: Option<TreeNode>,
    /// Owning object, set for component records.
    pub owner_object: Option<FileId>,
    /// Script reference (guid) of script-backed components.
    pub script_identity: Option<String>,
}

impl Record {
    pub fn file_id(&self) -> FileId {
        self.header.file_id
    }

    pub fn type_code(&self) -> TypeCode {
        self.header.type_code
    }

    pub fn is_placeholder(&self) -> bool {
        self.header.is_placeholder
    }

    pub fn is_object(&self) -> bool {
        self.header.type_code.is_object()
    }

    pub fn is_transform_like(&self) -> bool {
        self.header.type_code.is_transform_like()
    }

    /// The record body below its type key.
    ///
    /// Bodies are serialized as a single-entry mapping `TypeName: {...}`;
    /// this returns the inner value. Any other shape is returned as is.
    pub fn body(&self) -> Option<&TreeNode> {
        let tree = self.tree.as_ref()?;
        match tree.as_mapping() {
            Some([(_, inner)]) => Some(inner),
            _ => Some(tree),
        }
    }

    /// Look up a dotted field path inside the body.
    pub fn field(&self, path: &str) -> Option<&TreeNode> {
        self.body()?.get_path(path)
    }

    /// Read a reference field (`{fileID: N}`) inside the body.
    pub fn reference_field(&self, path: &str) -> Option<FileId> {
        self.field(path)?.file_id()
    }

    /// Read a scalar field inside the body.
    pub fn scalar_field(&self, path: &str) -> Option<&str> {
        self.field(path)?.as_scalar()
    }

    /// Owning object identity, `NULL` when absent.
    pub fn owner(&self) -> FileId {
        self.owner_object.unwrap_or(FileId::NULL)
    }
}
