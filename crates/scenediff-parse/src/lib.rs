//! Record parser for scene documents.
//!
//! Splits a multi-record document into `(header, body)` chunks, parses each
//! header into a [`RecordHeader`](scenediff_types::RecordHeader) and each body
//! into a [`TreeNode`](scenediff_types::TreeNode) with a permissive grammar.
//! One malformed record never aborts the batch: it degrades to a header-only
//! record and a [`ParseDiagnostic`].
//!
//! # Key Types
//!
//! - [`parse_document`] -- Text to records
//! - [`ParsedDocument`] / [`ParseDiagnostic`] -- Records plus degradations
//! - [`parse_body`] -- Body text to tree
//! - [`parse_header`] -- Header line to header

pub mod body;
pub mod document;
pub mod error;
pub mod extract;
pub mod flow;
pub mod header;

pub use body::parse_body;
pub use document::{
    parse_document, parse_document_with_diagnostics, ParseDiagnostic, ParsedDocument,
};
pub use error::{ParseError, ParseResult};
pub use header::parse_header;
