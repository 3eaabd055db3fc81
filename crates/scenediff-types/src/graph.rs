//! Reconstructed object hierarchy of one document version.
//!
//! [`ObjectGraph`] is an arena keyed by identity: nodes live in a map indexed
//! by transform identity, children are stored as identities, and the parent
//! relation is an explicit back-reference index (`child_to_parent`). There
//! are no pointer cycles; ancestor walks cost O(depth).
//!
//! # Invariants
//!
//! - Every node reachable from `roots` appears exactly once in `nodes`.
//! - `child_to_parent` is the inverse of the `children` edges.
//! - The graph is immutable once built.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::id::{FileId, TypeCode};

/// An object record and the components it lists as owned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub file_id: FileId,
    pub name: String,
    pub components: Vec<FileId>,
}

/// A non-object, non-instance record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub file_id: FileId,
    pub type_code: TypeCode,
    pub type_name: String,
    /// `NULL` for records owned by no object (scene settings, etc.).
    pub owner: FileId,
}

/// One position in the transform hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub display_name: String,
    pub object: FileId,
    pub transform: FileId,
    /// Owned components other than the transform itself.
    pub components: Vec<FileId>,
    /// Child transform identities, in serialized order.
    pub children: Vec<FileId>,
    /// Built from a placeholder transform.
    pub is_placeholder: bool,
}

/// Hierarchy graph of one document version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectGraph {
    /// Root transform identities, in discovery order.
    pub roots: Vec<FileId>,
    pub objects: HashMap<FileId, ObjectInfo>,
    pub components: HashMap<FileId, ComponentInfo>,
    /// Transform identity -> node.
    pub nodes: HashMap<FileId, GraphNode>,
    /// Object identity -> transform identity.
    pub object_to_node: HashMap<FileId, FileId>,
    /// Child transform -> parent transform.
    pub child_to_parent: HashMap<FileId, FileId>,
    /// Component identity -> owning object identity.
    pub component_to_object: HashMap<FileId, FileId>,
    /// Instance record -> transform it is parented under.
    pub instance_parents: HashMap<FileId, FileId>,
}

impl ObjectGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hierarchy nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no hierarchy nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node for a transform identity.
    pub fn node(&self, transform: FileId) -> Option<&GraphNode> {
        self.nodes.get(&transform)
    }

    /// Node for an object identity.
    pub fn node_for_object(&self, object: FileId) -> Option<&GraphNode> {
        self.object_to_node
            .get(&object)
            .and_then(|transform| self.nodes.get(transform))
    }

    /// The object a record belongs to: itself for objects, the owner for
    /// components (including transforms).
    pub fn object_for_record(&self, id: FileId) -> Option<FileId> {
        if self.objects.contains_key(&id) {
            return Some(id);
        }
        self.component_to_object.get(&id).copied()
    }

    /// Display name of the object a record belongs to.
    pub fn object_name(&self, id: FileId) -> Option<&str> {
        let object = self.object_for_record(id)?;
        if let Some(node) = self.node_for_object(object) {
            return Some(node.display_name.as_str());
        }
        self.objects.get(&object).map(|o| o.name.as_str())
    }

    /// Parent node of a transform.
    pub fn parent(&self, transform: FileId) -> Option<&GraphNode> {
        self.child_to_parent
            .get(&transform)
            .and_then(|parent| self.nodes.get(parent))
    }

    /// Ancestors of a transform, nearest first, via the back-reference index.
    ///
    /// Stops early if corrupt input produced a parent cycle.
    pub fn ancestors(&self, transform: FileId) -> Vec<&GraphNode> {
        let mut seen = HashSet::from([transform]);
        let mut result = Vec::new();
        let mut current = transform;
        while let Some(parent) = self.child_to_parent.get(&current) {
            if !seen.insert(*parent) {
                break;
            }
            match self.nodes.get(parent) {
                Some(node) => result.push(node),
                None => break,
            }
            current = *parent;
        }
        result
    }

    /// `/root/.../name` path of a transform node.
    pub fn node_path(&self, transform: FileId) -> Option<String> {
        let node = self.nodes.get(&transform)?;
        let mut names: Vec<&str> = self
            .ancestors(transform)
            .into_iter()
            .map(|n| n.display_name.as_str())
            .collect();
        names.reverse();
        names.push(node.display_name.as_str());
        Some(format!("/{}", names.join("/")))
    }

    /// Hierarchy path of the object a record is anchored to.
    ///
    /// Resolves transforms directly, objects and components through their
    /// owning object, and instance records through their parent transform.
    pub fn hierarchy_path(&self, id: FileId) -> Option<String> {
        if self.nodes.contains_key(&id) {
            return self.node_path(id);
        }
        if let Some(parent) = self.instance_parents.get(&id) {
            return self.node_path(*parent);
        }
        let object = self.object_for_record(id)?;
        match self.object_to_node.get(&object) {
            Some(transform) => self.node_path(*transform),
            None => self
                .objects
                .get(&object)
                .map(|info| format!("/{}", info.name)),
        }
    }

    /// Pre-order walk of every node reachable from the roots.
    pub fn depth_first(&self) -> Vec<&GraphNode> {
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<FileId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                result.push(node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        result
    }
}
