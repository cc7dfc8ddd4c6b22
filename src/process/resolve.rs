//! Turning a logical tool name into an executable path.

use std::path::PathBuf;

use crate::error::{PanamError, Result};

use super::options::ExecutionOptions;

/// Locate `program` on the search path the child would see.
///
/// Names containing a path separator are resolved against the working
/// directory instead.
pub fn resolve_executable(program: &str, options: &ExecutionOptions) -> Result<PathBuf> {
    which::which_in(program, options.search_path(), &options.working_directory).map_err(|e| {
        tracing::debug!("Could not resolve '{}': {}", program, e);
        PanamError::ExecutableNotFound {
            program: program.to_string(),
        }
    })
}
