//! File-based detection.
//!
//! Only existence is ever checked; file contents are never read here.

use std::path::Path;

/// Check if a file exists relative to project root.
pub fn file_exists(project_root: &Path, file: &str) -> bool {
    project_root.join(file).is_file()
}

/// Return the first entry of `table` whose file exists under `project_root`.
///
/// The table order is the precedence order.
pub fn first_existing<'a, T>(
    project_root: &Path,
    table: &'a [(&'a str, T)],
) -> Option<&'a (&'a str, T)> {
    table.iter().find(|(file, _)| file_exists(project_root, file))
}
