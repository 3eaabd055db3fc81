//! Four-pass construction of an [`ObjectGraph`] from a record list.
//!
//! 1. Collect objects and components.
//! 2. Create one node per transform-like record.
//! 3. Wire parent/child edges from children arrays, then parent references.
//! 4. Reconcile roots so every node is reachable.
//!
//! Missing data never aborts a pass: the affected edge is omitted and a
//! [`GraphIssue`] is recorded.

use std::collections::HashSet;

use tracing::debug;

use scenediff_types::{
    ComponentInfo, FileId, GraphNode, ObjectGraph, ObjectInfo, Record, TreeNode,
};

use crate::error::GraphIssue;

/// Display name of a placeholder transform whose owner is unknown.
pub const NESTED_REFERENCE_LABEL: &str = "(nested prefab)";
/// Display name of a transform whose owning object is not defined.
pub const MISSING_OBJECT_LABEL: &str = "(missing object)";

const NAME_FIELD: &str = "m_Name";
const COMPONENTS_FIELD: &str = "m_Component";
const OWNER_FIELD: &str = "m_GameObject";
const CHILDREN_FIELD: &str = "m_Children";
const FATHER_FIELD: &str = "m_Father";
const INSTANCE_PARENT_FIELD: &str = "m_Modification.m_TransformParent";

/// A built graph and the inconsistencies found while building it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphReport {
    pub graph: ObjectGraph,
    pub issues: Vec<GraphIssue>,
}

impl GraphReport {
    /// Returns `true` if every reference resolved.
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Build the hierarchy graph of one document version.
pub fn build_graph(records: &[Record]) -> ObjectGraph {
    GraphBuilder::new(records).build()
}

/// Build the hierarchy graph and keep the inconsistencies found.
pub fn build_graph_with_report(records: &[Record]) -> GraphReport {
    GraphBuilder::new(records).build_with_report()
}

/// Single-use builder over a borrowed record list.
pub struct GraphBuilder<'a> {
    records: &'a [Record],
    graph: ObjectGraph,
    issues: Vec<GraphIssue>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self {
            records,
            graph: ObjectGraph::new(),
            issues: Vec::new(),
        }
    }

    /// Run all passes and return the graph.
    pub fn build(self) -> ObjectGraph {
        self.build_with_report().graph
    }

    /// Run all passes and return the graph with its issues.
    pub fn build_with_report(mut self) -> GraphReport {
        self.collect_objects();
        self.build_nodes();
        self.wire_edges();
        self.reconcile_roots();

        debug!(
            objects = self.graph.objects.len(),
            components = self.graph.components.len(),
            nodes = self.graph.nodes.len(),
            roots = self.graph.roots.len(),
            issues = self.issues.len(),
            "built object graph"
        );
        GraphReport {
            graph: self.graph,
            issues: self.issues,
        }
    }

    fn report(&mut self, issue: GraphIssue) {
        debug!(%issue, "graph inconsistency");
        self.issues.push(issue);
    }

    /// Pass 1: objects with their listed components, and every other
    /// non-placeholder, non-instance record as a component.
    fn collect_objects(&mut self) {
        let records = self.records;
        let defined: HashSet<FileId> = records.iter().map(Record::file_id).collect();

        for record in records {
            let id = record.file_id();
            if record.is_object() {
                let components = owned_components(record);
                for component in &components {
                    if !defined.contains(component) {
                        self.report(GraphIssue::MissingComponent {
                            object: id,
                            component: *component,
                        });
                    }
                }
                let name = record.scalar_field(NAME_FIELD).unwrap_or_default().to_string();
                self.graph.objects.entry(id).or_insert(ObjectInfo {
                    file_id: id,
                    name,
                    components,
                });
                continue;
            }
            if record.is_placeholder() || record.type_code().is_instance_reference() {
                continue;
            }

            let owner = record.owner();
            self.graph.components.entry(id).or_insert(ComponentInfo {
                file_id: id,
                type_code: record.type_code(),
                type_name: record.type_name.clone(),
                owner,
            });
            if !owner.is_null() {
                self.graph.component_to_object.entry(id).or_insert(owner);
            }
        }

        for record in records {
            let owner = record.owner();
            if record.is_object() || owner.is_null() || record.is_transform_like() {
                continue;
            }
            if !self.graph.objects.contains_key(&owner) {
                self.report(GraphIssue::MissingOwner {
                    component: record.file_id(),
                    owner,
                });
            }
        }
    }

    /// Pass 2: one node per transform-like record, indexed by transform and
    /// by owning object.
    fn build_nodes(&mut self) {
        let records = self.records;
        for record in records.iter().filter(|r| r.is_transform_like()) {
            let transform = record.file_id();
            if self.graph.nodes.contains_key(&transform) {
                debug!(%transform, "duplicate transform identity; keeping the first");
                continue;
            }

            let owner = transform_owner(record);
            let node = if record.is_placeholder() {
                let display_name = self
                    .graph
                    .objects
                    .get(&owner)
                    .map(|info| info.name.as_str())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(NESTED_REFERENCE_LABEL)
                    .to_string();
                GraphNode {
                    display_name,
                    object: owner,
                    transform,
                    components: Vec::new(),
                    children: Vec::new(),
                    is_placeholder: true,
                }
            } else {
                let (display_name, components) = match self.graph.objects.get(&owner) {
                    Some(info) => (
                        info.name.clone(),
                        info.components
                            .iter()
                            .copied()
                            .filter(|c| *c != transform)
                            .collect(),
                    ),
                    None => {
                        self.report(GraphIssue::MissingObject {
                            transform,
                            object: owner,
                        });
                        (MISSING_OBJECT_LABEL.to_string(), Vec::new())
                    }
                };
                GraphNode {
                    display_name,
                    object: owner,
                    transform,
                    components,
                    children: Vec::new(),
                    is_placeholder: false,
                }
            };

            if !owner.is_null() {
                self.graph.object_to_node.entry(owner).or_insert(transform);
                self.graph.component_to_object.entry(transform).or_insert(owner);
            }
            self.graph.nodes.insert(transform, node);
        }
    }

    /// Pass 3: parent/child edges. Children arrays are authoritative; a
    /// parent reference only adds an edge its parent did not list. The first
    /// parent to claim a child keeps it.
    fn wire_edges(&mut self) {
        let records = self.records;
        let transforms = || {
            records
                .iter()
                .filter(|r| r.is_transform_like() && !r.is_placeholder())
        };

        for record in transforms() {
            let parent = record.file_id();
            for child in child_references(record) {
                if child == parent {
                    continue;
                }
                if !self.graph.nodes.contains_key(&child) {
                    self.report(GraphIssue::DanglingChild { parent, child });
                    continue;
                }
                if self.graph.child_to_parent.contains_key(&child) {
                    self.report(GraphIssue::DuplicateParent { child, parent });
                    continue;
                }
                self.link(parent, child);
            }
        }

        for record in transforms() {
            let child = record.file_id();
            let Some(parent) = record.reference_field(FATHER_FIELD).and_then(FileId::non_null) else {
                continue;
            };
            if self.graph.child_to_parent.contains_key(&child) || parent == child {
                continue;
            }
            if !self.graph.nodes.contains_key(&parent) {
                self.report(GraphIssue::DanglingParent { child, parent });
                continue;
            }
            debug!(%child, %parent, "parent reference missing from children array; linking");
            self.link(parent, child);
        }

        for record in records.iter().filter(|r| r.type_code().is_instance_reference()) {
            let Some(parent) = record
                .reference_field(INSTANCE_PARENT_FIELD)
                .and_then(FileId::non_null)
            else {
                continue;
            };
            if self.graph.nodes.contains_key(&parent) {
                self.graph.instance_parents.insert(record.file_id(), parent);
            } else {
                self.report(GraphIssue::DanglingParent {
                    child: record.file_id(),
                    parent,
                });
            }
        }
    }

    fn link(&mut self, parent: FileId, child: FileId) {
        if let Some(node) = self.graph.nodes.get_mut(&parent) {
            node.children.push(child);
            self.graph.child_to_parent.insert(child, parent);
        }
    }

    /// Pass 4: unparented nodes become roots in record order; any node still
    /// unreachable (parent cycles) is promoted as well.
    fn reconcile_roots(&mut self) {
        let order: Vec<FileId> = self
            .records
            .iter()
            .filter(|r| r.is_transform_like())
            .map(Record::file_id)
            .collect();

        let mut seen = HashSet::new();
        for id in &order {
            if self.graph.nodes.contains_key(id)
                && !self.graph.child_to_parent.contains_key(id)
                && seen.insert(*id)
            {
                self.graph.roots.push(*id);
            }
        }

        let mut reached: HashSet<FileId> = self
            .graph
            .depth_first()
            .into_iter()
            .map(|node| node.transform)
            .collect();
        for id in order {
            if !self.graph.nodes.contains_key(&id) || reached.contains(&id) {
                continue;
            }
            self.graph.roots.push(id);
            mark_reachable(&self.graph, id, &mut reached);
            self.report(GraphIssue::Unreachable { transform: id });
        }
    }
}

/// Owning object of a transform: the parsed owner, else the body's owner
/// reference, else `NULL`.
fn transform_owner(record: &Record) -> FileId {
    record
        .owner_object
        .or_else(|| record.reference_field(OWNER_FIELD).and_then(FileId::non_null))
        .unwrap_or(FileId::NULL)
}

/// Component identities listed by an object record.
///
/// Entries come in two encodings: `- component: {fileID: N}` and the
/// historical `- <typeCode>: {fileID: N}`.
fn owned_components(record: &Record) -> Vec<FileId> {
    record
        .field(COMPONENTS_FIELD)
        .and_then(TreeNode::as_sequence)
        .map(|entries| entries.iter().filter_map(component_entry).collect())
        .unwrap_or_default()
}

fn component_entry(entry: &TreeNode) -> Option<FileId> {
    if let Some(id) = entry.file_id() {
        return id.non_null();
    }
    let reference = match entry.as_mapping()? {
        [(_, inner)] => inner,
        entries => entries
            .iter()
            .find(|(key, _)| key == "component")
            .map(|(_, inner)| inner)?,
    };
    reference.file_id()?.non_null()
}

fn child_references(record: &Record) -> Vec<FileId> {
    record
        .field(CHILDREN_FIELD)
        .and_then(TreeNode::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.file_id()?.non_null())
                .collect()
        })
        .unwrap_or_default()
}

fn mark_reachable(graph: &ObjectGraph, start: FileId, reached: &mut HashSet<FileId>) {
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !reached.insert(id) {
            continue;
        }
        if let Some(node) = graph.nodes.get(&id) {
            stack.extend(node.children.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenediff_parse::parse_document;

    fn id(value: i64) -> FileId {
        FileId::new(value)
    }

    const HIERARCHY: &str = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 2}
  m_Name: Root
--- !u!4 &2
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 4}
  m_Father: {fileID: 0}
--- !u!1 &3
GameObject:
  m_Component:
  - component: {fileID: 4}
  - component: {fileID: 5}
  m_Name: Child
--- !u!4 &4
Transform:
  m_GameObject: {fileID: 3}
  m_Children: []
  m_Father: {fileID: 2}
--- !u!114 &5
MonoBehaviour:
  m_GameObject: {fileID: 3}
  m_Script: {fileID: 11500000, guid: abc, type: 3}
  speed: 5
";

    #[test]
    fn builds_hierarchy() {
        let records = parse_document(HIERARCHY);
        let report = build_graph_with_report(&records);
        assert!(report.is_consistent(), "{:?}", report.issues);

        let graph = report.graph;
        assert_eq!(graph.roots, vec![id(2)]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(id(2)).unwrap().children, vec![id(4)]);
        assert_eq!(graph.node(id(4)).unwrap().components, vec![id(5)]);
        assert_eq!(graph.parent(id(4)).unwrap().display_name, "Root");
        assert_eq!(graph.component_to_object.get(&id(5)), Some(&id(3)));
        assert_eq!(graph.hierarchy_path(id(5)).as_deref(), Some("/Root/Child"));
        assert_eq!(graph.objects[&id(3)].components, vec![id(4), id(5)]);
    }

    #[test]
    fn historical_component_encoding() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - 4: {fileID: 2}
  - 114: {fileID: 3}
  m_Name: Legacy
--- !u!4 &2
Transform:
  m_GameObject: {fileID: 1}
--- !u!114 &3
MonoBehaviour:
  m_GameObject: {fileID: 1}
";
        let graph = build_graph(&parse_document(text));
        assert_eq!(graph.objects[&id(1)].components, vec![id(2), id(3)]);
        assert_eq!(graph.node(id(2)).unwrap().components, vec![id(3)]);
    }

    #[test]
    fn child_with_missing_parent_stays_reachable() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Name: Orphan
--- !u!4 &2
Transform:
  m_GameObject: {fileID: 1}
  m_Father: {fileID: 99}
";
        let report = build_graph_with_report(&parse_document(text));
        assert_eq!(report.graph.roots, vec![id(2)]);
        assert_eq!(report.graph.depth_first().len(), 1);
        assert!(report.issues.contains(&GraphIssue::DanglingParent {
            child: id(2),
            parent: id(99),
        }));
    }

    #[test]
    fn parent_reference_links_unlisted_child() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Name: A
--- !u!4 &2
Transform:
  m_GameObject: {fileID: 1}
  m_Children: []
--- !u!1 &3
GameObject:
  m_Name: B
--- !u!4 &4
Transform:
  m_GameObject: {fileID: 3}
  m_Father: {fileID: 2}
";
        let graph = build_graph(&parse_document(text));
        assert_eq!(graph.roots, vec![id(2)]);
        assert_eq!(graph.node_path(id(4)).as_deref(), Some("/A/B"));
    }

    #[test]
    fn first_parent_keeps_a_shared_child() {
        let text = "\
--- !u!4 &1
Transform:
  m_Children:
  - {fileID: 3}
--- !u!4 &2
Transform:
  m_Children:
  - {fileID: 3}
--- !u!4 &3
Transform:
  m_Father: {fileID: 1}
";
        let report = build_graph_with_report(&parse_document(text));
        let graph = &report.graph;
        assert_eq!(graph.child_to_parent.get(&id(3)), Some(&id(1)));
        assert!(graph.node(id(2)).unwrap().children.is_empty());
        assert!(report.issues.contains(&GraphIssue::DuplicateParent {
            child: id(3),
            parent: id(2),
        }));
    }

    #[test]
    fn parent_cycle_is_broken_by_promotion() {
        let text = "\
--- !u!4 &1
Transform:
  m_Children:
  - {fileID: 2}
  m_Father: {fileID: 2}
--- !u!4 &2
Transform:
  m_Children:
  - {fileID: 1}
  m_Father: {fileID: 1}
";
        let report = build_graph_with_report(&parse_document(text));
        assert_eq!(report.graph.roots, vec![id(1)]);
        assert_eq!(report.graph.depth_first().len(), 2);
        assert!(report
            .issues
            .contains(&GraphIssue::Unreachable { transform: id(1) }));
    }

    #[test]
    fn dangling_child_is_omitted() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 2}
  m_Name: Parent
--- !u!4 &2
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 50}
";
        let report = build_graph_with_report(&parse_document(text));
        assert!(report.graph.node(id(2)).unwrap().children.is_empty());
        assert_eq!(
            report.issues,
            vec![GraphIssue::DanglingChild {
                parent: id(2),
                child: id(50),
            }]
        );
    }

    #[test]
    fn placeholder_transform_and_instance_parent() {
        let text = "\
--- !u!1 &1
GameObject:
  m_Component:
  - component: {fileID: 2}
  m_Name: Level
--- !u!4 &2
Transform:
  m_GameObject: {fileID: 1}
  m_Children:
  - {fileID: 7}
--- !u!1001 &6
PrefabInstance:
  m_Modification:
    m_TransformParent: {fileID: 2}
    m_Modifications: []
--- !u!4 &7 stripped
Transform:
  m_CorrespondingSourceObject: {fileID: 400, guid: abc, type: 3}
  m_PrefabInstance: {fileID: 6}
";
        let report = build_graph_with_report(&parse_document(text));
        assert!(report.is_consistent(), "{:?}", report.issues);

        let graph = report.graph;
        let nested = graph.node(id(7)).unwrap();
        assert!(nested.is_placeholder);
        assert_eq!(nested.display_name, NESTED_REFERENCE_LABEL);
        assert_eq!(graph.node_path(id(7)).as_deref(), Some("/Level/(nested prefab)"));
        assert_eq!(graph.hierarchy_path(id(6)).as_deref(), Some("/Level"));
        assert!(!graph.components.contains_key(&id(7)));
        assert!(!graph.components.contains_key(&id(6)));
    }

    #[test]
    fn transform_without_object_gets_label() {
        let text = "--- !u!4 &2\nTransform:\n  m_GameObject: {fileID: 40}\n";
        let report = build_graph_with_report(&parse_document(text));
        assert_eq!(report.graph.node(id(2)).unwrap().display_name, MISSING_OBJECT_LABEL);
        assert_eq!(
            report.issues,
            vec![GraphIssue::MissingObject {
                transform: id(2),
                object: id(40),
            }]
        );
    }

    #[test]
    fn component_with_unknown_owner_is_reported() {
        let text = "--- !u!114 &5\nMonoBehaviour:\n  m_GameObject: {fileID: 8}\n";
        let report = build_graph_with_report(&parse_document(text));
        assert_eq!(
            report.issues,
            vec![GraphIssue::MissingOwner {
                component: id(5),
                owner: id(8),
            }]
        );
        assert_eq!(report.graph.components[&id(5)].owner, id(8));
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let report = build_graph_with_report(&[]);
        assert!(report.graph.is_empty());
        assert!(report.graph.roots.is_empty());
        assert!(report.is_consistent());
    }
}
