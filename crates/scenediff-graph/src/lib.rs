//! Object hierarchy reconstruction.
//!
//! Turns the flat record list of one document version into an
//! [`ObjectGraph`](scenediff_types::ObjectGraph): objects, their components,
//! and the parent/child transform hierarchy. Broken references never fail
//! the build; they are reported as [`GraphIssue`]s and every node stays
//! reachable from the roots.

pub mod builder;
pub mod error;

pub use builder::{
    build_graph, build_graph_with_report, GraphBuilder, GraphReport, MISSING_OBJECT_LABEL,
    NESTED_REFERENCE_LABEL,
};
pub use error::GraphIssue;
