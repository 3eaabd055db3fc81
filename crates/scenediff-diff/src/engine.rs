//! The diff engine: record matching, field diffs, residual records, noise
//! filtering, move detection and name decoration, in that order.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use scenediff_types::{
    ChangeKind, Difference, FileId, ObjectGraph, Record, TypeCode, WHOLE_RECORD,
};

use crate::config::DiffConfig;
use crate::hierarchy::{display_path, format_path};
use crate::matching::match_records;
use crate::moves::detect_moves;
use crate::noise::{filter_noise, is_component_list_only};
use crate::resolver::NameResolver;
use crate::tree_diff::{diff_bodies, FieldChange};

static GUID_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"guid: ?([0-9A-Za-z]+)").expect("guid pattern is valid"));

const GUID_FIELD: &str = "guid";

/// Value shown for the placeholder side of a placeholder transition.
pub const PLACEHOLDER_MARKER: &str = "stripped";

/// A difference plus the record context the post-passes need.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub difference: Difference,
    pub old_id: Option<FileId>,
    pub new_id: Option<FileId>,
    pub type_code: TypeCode,
    /// Object record whose body holds nothing but its component list.
    pub component_list_only: bool,
}

/// Where the differences of one record (or record pair) are reported.
struct Anchor {
    component_type: String,
    hierarchy_path: String,
    owner_object_name: Option<String>,
    record_identity: FileId,
    old_id: Option<FileId>,
    new_id: Option<FileId>,
    type_code: TypeCode,
    component_list_only: bool,
}

impl Anchor {
    fn candidate(&self, difference: Difference) -> Candidate {
        Candidate {
            difference,
            old_id: self.old_id,
            new_id: self.new_id,
            type_code: self.type_code,
            component_list_only: self.component_list_only,
        }
    }

    fn field(&self, change: FieldChange) -> Candidate {
        self.candidate(Difference {
            change_kind: change.kind,
            component_type: self.component_type.clone(),
            field_path: change.path,
            hierarchy_path: self.hierarchy_path.clone(),
            old_value: change.old_value,
            new_value: change.new_value,
            owner_object_name: self.owner_object_name.clone(),
            is_whole_record_change: false,
            record_identity: self.record_identity,
        })
    }

    fn whole(&self, kind: ChangeKind, old_value: Option<String>, new_value: Option<String>) -> Candidate {
        self.candidate(Difference {
            change_kind: kind,
            component_type: self.component_type.clone(),
            field_path: WHOLE_RECORD.to_string(),
            hierarchy_path: self.hierarchy_path.clone(),
            old_value,
            new_value,
            owner_object_name: self.owner_object_name.clone(),
            is_whole_record_change: true,
            record_identity: self.record_identity,
        })
    }
}

/// Computes the differences between two parsed document versions.
///
/// The engine holds no state between calls; one instance can diff any
/// number of version pairs.
pub struct DiffEngine {
    config: DiffConfig,
    resolver: Option<Arc<dyn NameResolver>>,
}

impl DiffEngine {
    /// Create an engine with the given configuration and no name resolver.
    pub fn new(config: DiffConfig) -> Self {
        Self {
            config,
            resolver: None,
        }
    }

    /// Decorate output with names from `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Diff two record sets, using each version's graph for hierarchy paths.
    pub fn diff(
        &self,
        old_records: &[Record],
        new_records: &[Record],
        old_graph: &ObjectGraph,
        new_graph: &ObjectGraph,
    ) -> Vec<Difference> {
        let matching = match_records(old_records, new_records, self.config.reidentify);
        let mut candidates = Vec::new();

        for &(i, j) in &matching.pairs {
            self.diff_pair(&old_records[i], &new_records[j], old_graph, new_graph, &mut candidates);
        }
        for &i in &matching.removed {
            let record = &old_records[i];
            let anchor = self.single_anchor(record, old_graph, Side::Old);
            candidates.push(anchor.whole(ChangeKind::Removed, Some(whole_text(record)), None));
        }
        for &j in &matching.added {
            let record = &new_records[j];
            let anchor = self.single_anchor(record, new_graph, Side::New);
            candidates.push(anchor.whole(ChangeKind::Added, None, Some(whole_text(record))));
        }

        if self.config.filter_noise {
            candidates = filter_noise(candidates, &self.config);
        }
        if self.config.detect_moves {
            candidates = detect_moves(candidates, old_graph, new_graph);
        }

        let differences: Vec<Difference> = candidates
            .into_iter()
            .map(|candidate| self.decorate(candidate.difference))
            .collect();
        debug!(differences = differences.len(), "diff complete");
        differences
    }

    fn diff_pair(
        &self,
        old: &Record,
        new: &Record,
        old_graph: &ObjectGraph,
        new_graph: &ObjectGraph,
        out: &mut Vec<Candidate>,
    ) {
        if old.is_placeholder() && new.is_placeholder() {
            return;
        }
        let anchor = self.pair_anchor(old, new, old_graph, new_graph);
        if old.is_placeholder() != new.is_placeholder() {
            debug!(
                file_id = %new.file_id(),
                placeholder = new.is_placeholder(),
                "record changed placeholder state; reporting a whole-record change"
            );
            let (removed, added) = line_changes(&old.raw_text, &new.raw_text);
            out.push(anchor.whole(
                ChangeKind::Modified,
                Some(placeholder_side(removed, old)),
                Some(placeholder_side(added, new)),
            ));
            return;
        }
        match (old.body(), new.body()) {
            (Some(old_body), Some(new_body)) => {
                out.extend(diff_bodies(old_body, new_body).into_iter().map(|c| anchor.field(c)));
            }
            _ if old.raw_text != new.raw_text => {
                debug!(
                    file_id = %new.file_id(),
                    "record body unavailable; reporting a whole-record change"
                );
                let (removed, added) = line_changes(&old.raw_text, &new.raw_text);
                out.push(anchor.whole(ChangeKind::Modified, Some(removed), Some(added)));
            }
            _ => {}
        }
    }

    /// Anchor for a matched pair: resolved in the new version, falling back
    /// to the old one.
    fn pair_anchor(
        &self,
        old: &Record,
        new: &Record,
        old_graph: &ObjectGraph,
        new_graph: &ObjectGraph,
    ) -> Anchor {
        let component_type = self.component_type(new);
        let base = new_graph
            .hierarchy_path(new.file_id())
            .or_else(|| old_graph.hierarchy_path(old.file_id()));
        let owner_object_name = new_graph
            .object_name(new.file_id())
            .or_else(|| old_graph.object_name(old.file_id()))
            .map(str::to_string);
        Anchor {
            hierarchy_path: format_path(base.as_deref(), &component_type, new.is_object()),
            component_type,
            owner_object_name,
            record_identity: new.file_id(),
            old_id: Some(old.file_id()),
            new_id: Some(new.file_id()),
            type_code: new.type_code(),
            component_list_only: false,
        }
    }

    fn single_anchor(&self, record: &Record, graph: &ObjectGraph, side: Side) -> Anchor {
        let component_type = self.component_type(record);
        let id = Some(record.file_id());
        Anchor {
            hierarchy_path: display_path(graph, record.file_id(), &component_type, record.is_object()),
            component_type,
            owner_object_name: graph.object_name(record.file_id()).map(str::to_string),
            record_identity: record.file_id(),
            old_id: if side == Side::Old { id } else { None },
            new_id: if side == Side::New { id } else { None },
            type_code: record.type_code(),
            component_list_only: is_component_list_only(record, &self.config),
        }
    }

    /// Record type name, or the resolved script name of a script-backed
    /// record.
    fn component_type(&self, record: &Record) -> String {
        self.resolver
            .as_ref()
            .zip(record.script_identity.as_deref())
            .and_then(|(resolver, script)| resolver.script_name(script))
            .unwrap_or_else(|| record.type_name.clone())
    }

    fn decorate(&self, mut difference: Difference) -> Difference {
        if self.resolver.is_none() || difference.is_whole_record_change {
            return difference;
        }
        let bare_guid = is_guid_field(&difference.field_path);
        difference.old_value = difference.old_value.map(|v| self.label_value(v, bare_guid));
        difference.new_value = difference.new_value.map(|v| self.label_value(v, bare_guid));
        difference
    }

    fn label_value(&self, value: String, bare_guid: bool) -> String {
        if bare_guid {
            self.label_guid(value)
        } else {
            self.label_assets(value)
        }
    }

    /// Append ` (label)` when the whole value is a guid the resolver knows.
    fn label_guid(&self, value: String) -> String {
        match self.resolver.as_ref().and_then(|r| r.asset_label(value.trim())) {
            Some(label) => format!("{value} ({label})"),
            None => value,
        }
    }

    /// Append ` (label)` for every asset guid in `value` the resolver knows.
    fn label_assets(&self, value: String) -> String {
        let Some(resolver) = &self.resolver else {
            return value;
        };
        let labels: Vec<String> = GUID_REFERENCE
            .captures_iter(&value)
            .filter_map(|caps| resolver.asset_label(&caps[1]))
            .collect();
        if labels.is_empty() {
            value
        } else {
            format!("{value} ({})", labels.join(", "))
        }
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DiffConfig::default())
    }
}

impl fmt::Debug for DiffEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffEngine")
            .field("config", &self.config)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Old,
    New,
}

/// Diff two record sets with the default configuration.
pub fn diff_records(
    old_records: &[Record],
    new_records: &[Record],
    old_graph: &ObjectGraph,
    new_graph: &ObjectGraph,
) -> Vec<Difference> {
    DiffEngine::default().diff(old_records, new_records, old_graph, new_graph)
}

/// Returns `true` for the guid scalar of a reference (`skin.guid`).
fn is_guid_field(path: &str) -> bool {
    path.rsplit('.').next() == Some(GUID_FIELD)
}

/// Changed lines of one side of a placeholder transition; a side with no
/// changed lines of its own shows the placeholder marker instead.
fn placeholder_side(lines: String, record: &Record) -> String {
    if lines.is_empty() && record.is_placeholder() {
        PLACEHOLDER_MARKER.to_string()
    } else {
        lines
    }
}

fn whole_text(record: &Record) -> String {
    record.raw_text.trim_end().to_string()
}

/// Removed and inserted lines between two texts.
fn line_changes(old: &str, new: &str) -> (String, String) {
    let diff = TextDiff::from_lines(old, new);
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches(['\r', '\n']);
        match change.tag() {
            ChangeTag::Delete => removed.push(line),
            ChangeTag::Insert => added.push(line),
            ChangeTag::Equal => {}
        }
    }
    (removed.join("\n"), added.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::InMemoryNameResolver;
    use scenediff_graph::build_graph;
    use scenediff_parse::parse_document;

    fn run(engine: &DiffEngine, old: &str, new: &str) -> Vec<Difference> {
        let old_records = parse_document(old);
        let new_records = parse_document(new);
        let old_graph = build_graph(&old_records);
        let new_graph = build_graph(&new_records);
        engine.diff(&old_records, &new_records, &old_graph, &new_graph)
    }

    fn scene(speed: &str, behaviour_id: i64) -> String {
        format!(
            "\
%YAML 1.1
--- !u!1 &10
GameObject:
  m_ObjectHideFlags: 0
  m_Component:
  - component: {{fileID: 11}}
  - component: {{fileID: {behaviour_id}}}
  m_Name: O1
--- !u!4 &11
Transform:
  m_GameObject: {{fileID: 10}}
  m_LocalPosition: {{x: 0, y: 0, z: 0}}
  m_Children: []
  m_Father: {{fileID: 0}}
--- !u!114 &{behaviour_id}
MonoBehaviour:
  m_GameObject: {{fileID: 10}}
  m_Script: {{fileID: 11500000, guid: 9fc0d4010bbf28b4594072e72b8655ab, type: 3}}
  speed: {speed}
  skin: {{fileID: 2100000, guid: a1b2c3, type: 2}}
"
        )
    }

    #[test]
    fn identical_versions_have_no_differences() {
        let text = scene("5", 12);
        assert!(run(&DiffEngine::default(), &text, &text).is_empty());
        assert!(run(&DiffEngine::new(DiffConfig::raw()), &text, &text).is_empty());
    }

    #[test]
    fn single_field_change() {
        let diffs = run(&DiffEngine::default(), &scene("5", 12), &scene("7", 12));
        assert_eq!(diffs.len(), 1);
        let d = &diffs[0];
        assert_eq!(d.change_kind, ChangeKind::Modified);
        assert_eq!(d.field_path, "speed");
        assert_eq!(d.old_value.as_deref(), Some("5"));
        assert_eq!(d.new_value.as_deref(), Some("7"));
        assert_eq!(d.hierarchy_path, "/O1 (MonoBehaviour)");
        assert_eq!(d.owner_object_name.as_deref(), Some("O1"));
        assert_eq!(d.record_identity, FileId::new(12));
        assert!(!d.is_whole_record_change);
    }

    #[test]
    fn renumbered_component_reports_only_field_changes() {
        let diffs = run(&DiffEngine::default(), &scene("5", 12), &scene("6", 4400));
        assert_eq!(diffs.len(), 1, "{diffs:#?}");
        assert_eq!(diffs[0].field_path, "speed");
        assert_eq!(diffs[0].record_identity, FileId::new(4400));

        let raw = run(&DiffEngine::new(DiffConfig::raw()), &scene("5", 12), &scene("6", 4400));
        assert!(raw.iter().all(|d| !d.is_whole_record_change));
        assert!(raw.iter().any(|d| d.field_path == "m_Component[fileID=4400]"));
    }

    #[test]
    fn numerically_equal_values_are_noise() {
        let diffs = run(&DiffEngine::default(), &scene("0", 12), &scene("-0", 12));
        assert!(diffs.is_empty());
        let raw = run(&DiffEngine::new(DiffConfig::raw()), &scene("0", 12), &scene("-0", 12));
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn unpaired_records_are_whole_record_changes() {
        let old = scene("5", 12);
        let new = format!(
            "{old}--- !u!65 &13\nBoxCollider:\n  m_GameObject: {{fileID: 10}}\n  m_IsTrigger: 0\n"
        );
        let diffs = run(&DiffEngine::default(), &old, &new);
        assert_eq!(diffs.len(), 1, "{diffs:#?}");
        let d = &diffs[0];
        assert_eq!(d.change_kind, ChangeKind::Added);
        assert!(d.is_whole_record_change);
        assert_eq!(d.field_path, WHOLE_RECORD);
        assert_eq!(d.hierarchy_path, "/O1 (BoxCollider)");
        assert!(d.new_value.as_deref().unwrap().starts_with("BoxCollider:"));

        let back = run(&DiffEngine::default(), &new, &old);
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].change_kind, ChangeKind::Removed);
        assert_eq!(back[0].hierarchy_path, "/O1 (BoxCollider)");
    }

    #[test]
    fn unparsable_body_yields_coarse_change() {
        let old = "--- !u!114 &5\nMonoBehaviour:\n  m_GameObject: {fileID: 9}\n  broken: {fileID: 1\n";
        let new = "--- !u!114 &5\nMonoBehaviour:\n  m_GameObject: {fileID: 9}\n  broken: {fileID: 2\n";
        let diffs = run(&DiffEngine::default(), old, new);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].change_kind, ChangeKind::Modified);
        assert!(diffs[0].is_whole_record_change);
        assert_eq!(diffs[0].old_value.as_deref(), Some("  broken: {fileID: 1"));
        assert_eq!(diffs[0].new_value.as_deref(), Some("  broken: {fileID: 2"));

        assert!(run(&DiffEngine::default(), old, old).is_empty());
    }

    #[test]
    fn placeholders_are_not_diffed() {
        let old = "--- !u!4 &7 stripped\nTransform:\n  m_PrefabInstance: {fileID: 6}\n";
        let new = "--- !u!4 &7 stripped\nTransform:\n  m_PrefabInstance: {fileID: 8}\n";
        assert!(run(&DiffEngine::new(DiffConfig::raw()), old, new).is_empty());
    }

    #[test]
    fn placeholder_becoming_a_full_record_is_reported() {
        let old = "--- !u!4 &7 stripped\nTransform:\n  m_PrefabInstance: {fileID: 6}\n";
        let new = "--- !u!4 &7\nTransform:\n  m_PrefabInstance: {fileID: 6}\n  m_LocalPosition: {x: 3, y: 0, z: 0}\n";
        let diffs = run(&DiffEngine::default(), old, new);
        assert_eq!(diffs.len(), 1, "{diffs:#?}");
        let d = &diffs[0];
        assert_eq!(d.change_kind, ChangeKind::Modified);
        assert!(d.is_whole_record_change);
        assert_eq!(d.record_identity, FileId::new(7));
        assert_eq!(d.old_value.as_deref(), Some(PLACEHOLDER_MARKER));
        assert_eq!(d.new_value.as_deref(), Some("  m_LocalPosition: {x: 3, y: 0, z: 0}"));

        let back = run(&DiffEngine::default(), new, old);
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].old_value.as_deref(), Some("  m_LocalPosition: {x: 3, y: 0, z: 0}"));
        assert_eq!(back[0].new_value.as_deref(), Some(PLACEHOLDER_MARKER));
    }

    #[test]
    fn resolver_names_scripts_and_assets() {
        let resolver = InMemoryNameResolver::new()
            .with_script("9fc0d4010bbf28b4594072e72b8655ab", "PlayerController")
            .with_asset("d4e5f6", "Hero.mat");
        let engine = DiffEngine::default().with_resolver(Arc::new(resolver));

        let old = scene("5", 12);
        let new = old.replace("guid: a1b2c3, type: 2", "guid: d4e5f6, type: 2");
        let diffs = run(&engine, &old, &new);
        assert_eq!(diffs.len(), 1, "{diffs:#?}");
        let d = &diffs[0];
        assert_eq!(d.component_type, "PlayerController");
        assert_eq!(d.hierarchy_path, "/O1 (PlayerController)");
        assert_eq!(d.field_path, "skin.guid");
        assert_eq!(d.old_value.as_deref(), Some("a1b2c3"));
        assert_eq!(d.new_value.as_deref(), Some("d4e5f6 (Hero.mat)"));
    }

    #[test]
    fn guid_fields_are_labelled() {
        assert!(is_guid_field("skin.guid"));
        assert!(is_guid_field("m_Script.guid"));
        assert!(is_guid_field("guid"));
        assert!(!is_guid_field("skin.guidance"));
        assert!(!is_guid_field("skin.fileID"));

        let resolver = InMemoryNameResolver::new()
            .with_asset("a1b2c3", "Villain.mat")
            .with_asset("d4e5f6", "Hero.mat");
        let engine = DiffEngine::default().with_resolver(Arc::new(resolver));
        let old = scene("5", 12);
        let new = old.replace("guid: a1b2c3, type: 2", "guid: d4e5f6, type: 2");
        let diffs = run(&engine, &old, &new);
        assert_eq!(diffs[0].old_value.as_deref(), Some("a1b2c3 (Villain.mat)"));
        assert_eq!(diffs[0].new_value.as_deref(), Some("d4e5f6 (Hero.mat)"));

        let unlabelled = run(&DiffEngine::default(), &old, &new);
        assert_eq!(unlabelled[0].new_value.as_deref(), Some("d4e5f6"));
    }

    #[test]
    fn resolver_labels_whole_reference_values() {
        let resolver = InMemoryNameResolver::new().with_asset("d4e5f6", "Hero.mat");
        let engine = DiffEngine::default().with_resolver(Arc::new(resolver));

        let old = scene("5", 12).replace("  skin: {fileID: 2100000, guid: a1b2c3, type: 2}\n", "  skin: 0\n");
        let new = scene("5", 12).replace("guid: a1b2c3", "guid: d4e5f6");
        let diffs = run(&engine, &old, &new);
        assert_eq!(diffs.len(), 1, "{diffs:#?}");
        assert_eq!(
            diffs[0].new_value.as_deref(),
            Some("{fileID: 2100000, guid: d4e5f6, type: 2} (Hero.mat)")
        );
    }

    #[test]
    fn empty_inputs() {
        assert!(run(&DiffEngine::default(), "", "").is_empty());
        let diffs = run(&DiffEngine::default(), "", &scene("5", 12));
        assert_eq!(diffs.len(), 3);
        assert!(diffs.iter().all(|d| d.change_kind == ChangeKind::Added));
    }

    #[test]
    fn line_changes_keep_only_changed_lines() {
        let (removed, added) = line_changes("a\nb\nc\n", "a\nB\nc\nd\n");
        assert_eq!(removed, "b");
        assert_eq!(added, "B\nd");
    }
}
