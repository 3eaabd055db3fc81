//! Foundation types for scene diffing.
//!
//! This crate is pure data: the generic record tree produced by the parser,
//! the parsed [`Record`], the reconstructed [`ObjectGraph`] and the
//! [`Difference`] values produced by the diff engine. Every other scenediff
//! crate depends on `scenediff-types`.
//!
//! # Key Types
//!
//! - [`FileId`] -- Per-version record identity (signed 64-bit)
//! - [`TypeCode`] -- Numeric record type code with the well-known kinds
//! - [`TreeNode`] -- Scalar / mapping / sequence tree of a record body
//! - [`Record`] / [`RecordHeader`] -- One addressable unit of a document
//! - [`ObjectGraph`] / [`GraphNode`] -- Transform hierarchy of one version
//! - [`Difference`] / [`ChangeKind`] -- One reported change

pub mod difference;
pub mod error;
pub mod graph;
pub mod id;
pub mod record;
pub mod tree;

pub use difference::{ChangeKind, Difference, WHOLE_RECORD};
pub use error::TypeError;
pub use graph::{ComponentInfo, GraphNode, ObjectGraph, ObjectInfo};
pub use id::{FileId, TypeCode};
pub use record::{Record, RecordHeader};
pub use tree::{insert_entry, TreeNode, FILE_ID_KEY, GUID_KEY};
