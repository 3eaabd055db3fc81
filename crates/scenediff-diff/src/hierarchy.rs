//! Hierarchy paths as reported on differences.

use scenediff_types::{FileId, ObjectGraph};

/// Path of a record in `graph`, with ` (Type)` appended unless the record is
/// an object. Records outside the hierarchy (scene settings and the like)
/// render as `(Type)` alone.
pub fn display_path(graph: &ObjectGraph, id: FileId, type_name: &str, object_level: bool) -> String {
    format_path(graph.hierarchy_path(id).as_deref(), type_name, object_level)
}

/// Attach the type suffix to a resolved base path.
pub fn format_path(base: Option<&str>, type_name: &str, object_level: bool) -> String {
    match (base, object_level) {
        (Some(base), true) => base.to_string(),
        (Some(base), false) => format!("{base} ({type_name})"),
        (None, _) => format!("({type_name})"),
    }
}
