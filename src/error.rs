//! Error types for panam operations.
//!
//! This module defines [`PanamError`], the error type shared by detection,
//! translation and process execution, and a [`Result`] alias.
//!
//! # Error Handling Strategy
//!
//! - Detection never fails: a missing or malformed manifest is reported as
//!   [`PanamError::MalformedManifest`] by the reader and then treated as
//!   "no signal" by the resolver.
//! - Translation errors are caller mistakes (an empty package list, say) and
//!   are returned before anything is spawned.
//! - Execution errors are never returned as `Err`; they are carried inside
//!   [`crate::process::ProcessResult::Failure`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for panam operations.
#[derive(Debug, Error)]
pub enum PanamError {
    /// The executable could not be located on the search path.
    #[error("Executable not found: {program}")]
    ExecutableNotFound { program: String },

    /// The `--version` check for a tool failed.
    #[error("{program} is not installed")]
    NotInstalled { program: String },

    /// The operating system refused to start the process.
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child ran but did not exit with status 0.
    ///
    /// `code` is `None` when the child was terminated by a signal.
    #[error("Command {command} failed{}", exit_suffix(.code))]
    NonZeroExit { command: String, code: Option<i32> },

    /// A verb was called without an argument it cannot do without.
    #[error("'{verb}' requires {expected}")]
    MissingArgument { verb: String, expected: String },

    /// A verb name that is not part of the uniform vocabulary.
    #[error("Unknown verb: {name}")]
    InvalidVerb { name: String },

    /// `package.json` exists but could not be read or parsed.
    #[error("Malformed manifest at {path}: {message}")]
    MalformedManifest { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PanamError {
    /// Exit code the CLI should report for this error.
    ///
    /// A failing child propagates its own code; everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonZeroExit {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

/// Result type alias for panam operations.
pub type Result<T> = std::result::Result<T, PanamError>;
