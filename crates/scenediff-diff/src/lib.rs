//! Semantic diff engine for scene documents.
//!
//! Compares the records of two document versions and reports changes in
//! terms of objects, components and fields rather than text lines.
//!
//! # Key Types
//!
//! - [`DiffEngine`] -- Record matching, field diffs, noise filtering and move detection
//! - [`DiffConfig`] -- Engine switches and the ignored-field list (TOML loadable)
//! - [`NameResolver`] / [`InMemoryNameResolver`] -- Script and asset display names
//! - [`FieldChange`] -- One changed field inside a record body
//! - [`SequenceShape`] -- How a pair of sequences is matched
//! - [`StableKey`] -- Identity-independent record key used for re-identification

pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod matching;
pub mod moves;
pub mod noise;
pub mod resolver;
pub mod sequence;
pub mod stable_key;
pub mod tree_diff;

pub use config::{DiffConfig, DEFAULT_IGNORED_FIELDS};
pub use engine::{diff_records, DiffEngine, PLACEHOLDER_MARKER};
pub use error::{DiffError, DiffResult};
pub use matching::{match_records, RecordMatching};
pub use resolver::{InMemoryNameResolver, NameResolver};
pub use sequence::{classify, SequenceShape};
pub use stable_key::{stable_key, StableKey};
pub use tree_diff::{diff_bodies, FieldChange};
