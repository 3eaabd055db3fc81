//! Inconsistencies found while building an object graph.

use scenediff_types::FileId;

/// A reference in the input that does not resolve. The affected edge is
/// omitted; the build itself never fails.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphIssue {
    /// An object lists a component that no record defines.
    #[error("object {object} lists missing component {component}")]
    MissingComponent { object: FileId, component: FileId },

    /// A component's owner reference names no object.
    #[error("component {component} belongs to missing object {owner}")]
    MissingOwner { component: FileId, owner: FileId },

    /// A transform's owning object is not defined.
    #[error("transform {transform} belongs to missing object {object}")]
    MissingObject { transform: FileId, object: FileId },

    /// A children array names a transform that does not exist.
    #[error("transform {parent} lists missing child {child}")]
    DanglingChild { parent: FileId, child: FileId },

    /// A parent reference names a transform that does not exist.
    #[error("transform {child} references missing parent {parent}")]
    DanglingParent { child: FileId, parent: FileId },

    /// A transform is listed as a child by more than one parent.
    #[error("transform {child} is also listed as a child of {parent}; keeping the first parent")]
    DuplicateParent { child: FileId, parent: FileId },

    /// A transform was only reachable after being promoted to a root.
    #[error("transform {transform} was unreachable and has been promoted to a root")]
    Unreachable { transform: FileId },
}
