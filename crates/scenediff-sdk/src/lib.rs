//! One-call semantic diffs of scene documents.
//!
//! Wraps parsing, hierarchy reconstruction and diffing behind a single
//! builder so callers can go from two document texts (or files) to a list
//! of object-level differences.
//!
//! # Key Types
//!
//! - [`SceneDiff`] -- Configurable pipeline: parse, build, diff
//! - [`Snapshot`] -- One parsed version with its hierarchy and degradations
//! - [`Comparison`] -- Differences between two snapshots, with grouping helpers
//! - [`DiffSummary`] / [`DiffReport`] -- Counts by kind and the JSON report form
//!
//! # Example
//!
//! ```
//! use scenediff_sdk::{ChangeKind, SceneDiff};
//!
//! let old = "--- !u!1 &1\nGameObject:\n  m_Name: Door\n  m_IsActive: 1\n";
//! let new = "--- !u!1 &1\nGameObject:\n  m_Name: Door\n  m_IsActive: 0\n";
//!
//! let comparison = SceneDiff::new().compare(old, new);
//! let change = &comparison.differences[0];
//! assert_eq!(change.change_kind, ChangeKind::Modified);
//! assert_eq!(change.hierarchy_path, "/Door");
//! assert_eq!(change.field_path, "m_IsActive");
//! ```

pub mod comparison;
pub mod error;
pub mod scene_diff;
pub mod snapshot;

pub use comparison::{Comparison, DiffReport, DiffSummary};
pub use error::{SdkError, SdkResult};
pub use scene_diff::SceneDiff;
pub use snapshot::Snapshot;

pub use scenediff_diff::{DiffConfig, InMemoryNameResolver, NameResolver};
pub use scenediff_graph::GraphIssue;
pub use scenediff_parse::ParseDiagnostic;
pub use scenediff_types::{ChangeKind, Difference, FileId};
