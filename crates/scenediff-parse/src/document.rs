//! Document splitting and per-record parsing.
//!
//! A document is a sequence of records, each opened by a header line. Lines
//! before the first header (directives, stray text) are dropped. Every
//! failure is local to its record: an invalid header skips the record, an
//! unparsable body keeps the record with `tree = None`.

use tracing::{debug, warn};

use scenediff_types::{FileId, Record, RecordHeader};

use crate::body::parse_body;
use crate::error::ParseError;
use crate::extract::{
    owner_from_text, owner_from_tree, resolve_type_name, script_identity,
};
use crate::header::{is_directive, is_record_delimiter, parse_header};

/// A degradation observed while parsing one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based document line of the record header.
    pub header_line: usize,
    /// Identity of the record, when its header parsed.
    pub file_id: Option<FileId>,
    pub error: ParseError,
}

/// Records of one document version plus the degradations seen on the way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub records: Vec<Record>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedDocument {
    /// Returns `true` if every record parsed cleanly.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parse a document into records, dropping diagnostics after logging them.
pub fn parse_document(text: &str) -> Vec<Record> {
    parse_document_with_diagnostics(text).records
}

/// Parse a document into records and diagnostics.
pub fn parse_document_with_diagnostics(text: &str) -> ParsedDocument {
    let mut document = ParsedDocument::default();

    for chunk in split_chunks(text) {
        let header = match parse_header(chunk.header) {
            Ok(header) => header,
            Err(error) => {
                warn!(line = chunk.line, %error, "skipping record with invalid header");
                document.diagnostics.push(ParseDiagnostic {
                    header_line: chunk.line,
                    file_id: None,
                    error,
                });
                continue;
            }
        };

        let (record, error) = build_record(header, chunk.body);
        if let Some(error) = error {
            warn!(
                line = chunk.line,
                file_id = %header.file_id,
                %error,
                "record body failed to parse; keeping header only"
            );
            document.diagnostics.push(ParseDiagnostic {
                header_line: chunk.line,
                file_id: Some(header.file_id),
                error,
            });
        }
        document.records.push(record);
    }

    debug!(
        records = document.records.len(),
        diagnostics = document.diagnostics.len(),
        "parsed document"
    );
    document
}

/// Build a record from its header and body text.
///
/// Placeholder bodies are never tree-parsed; only the owner reference is
/// extracted from their text. Returns the body parse error, if any, next
/// to the degraded record.
pub fn build_record(header: RecordHeader, body: String) -> (Record, Option<ParseError>) {
    let (tree, error) = if header.is_placeholder {
        (None, None)
    } else {
        match parse_body(&body) {
            Ok(tree) => (Some(tree), None),
            Err(error) => (None, Some(error)),
        }
    };

    let type_name = resolve_type_name(tree.as_ref(), &body, header.type_code);
    let (owner_object, script) = match &tree {
        Some(tree) => (owner_from_tree(tree), script_identity(tree)),
        None => (owner_from_text(&body), None),
    };

    let record = Record {
        header,
        type_name,
        raw_text: body,
        tree,
        owner_object,
        script_identity: script,
    };
    (record, error)
}

struct Chunk<'a> {
    header: &'a str,
    /// 1-based line of the header.
    line: usize,
    body: String,
}

fn split_chunks(text: &str) -> Vec<Chunk<'_>> {
    let mut chunks: Vec<Chunk<'_>> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if is_record_delimiter(line) {
            chunks.push(Chunk {
                header: line,
                line: i + 1,
                body: String::new(),
            });
            continue;
        }
        match chunks.last_mut() {
            Some(chunk) => {
                chunk.body.push_str(line);
                chunk.body.push('\n');
            }
            None if is_directive(line) || line.trim().is_empty() => {}
            None => debug!(line = i + 1, "dropping text outside any record"),
        }
    }
    chunks
}
