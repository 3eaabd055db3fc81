use scenediff_graph::{build_graph_with_report, GraphIssue};
use scenediff_parse::{parse_document_with_diagnostics, ParseDiagnostic};
use scenediff_types::{FileId, ObjectGraph, Record};

/// One parsed document version: records, hierarchy and the degradations
/// seen while producing them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub graph: ObjectGraph,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub issues: Vec<GraphIssue>,
}

impl Snapshot {
    /// Parse `text` and build its hierarchy.
    pub fn parse(text: &str) -> Self {
        let document = parse_document_with_diagnostics(text);
        let report = build_graph_with_report(&document.records);
        Self {
            records: document.records,
            graph: report.graph,
            diagnostics: document.diagnostics,
            issues: report.issues,
        }
    }

    /// Returns `true` if every record parsed and every reference resolved.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.issues.is_empty()
    }

    /// Record with the given identity.
    pub fn record(&self, id: FileId) -> Option<&Record> {
        self.records.iter().find(|record| record.file_id() == id)
    }

    /// `/root/.../name` path of the object a record belongs to.
    pub fn hierarchy_path(&self, id: FileId) -> Option<String> {
        self.graph.hierarchy_path(id)
    }
}
