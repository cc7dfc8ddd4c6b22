//! Per-invocation execution options.

use std::collections::HashMap;
use std::path::PathBuf;

/// Where and how a child process runs.
///
/// The working directory and environment are copied into the child at spawn
/// time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Working directory of the child.
    pub working_directory: PathBuf,

    /// Complete environment of the child (not merged with ours).
    pub environment: HashMap<String, String>,

    /// Detach the child and discard its standard streams.
    pub daemon: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            working_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            environment: std::env::vars().collect(),
            daemon: false,
        }
    }
}

impl ExecutionOptions {
    /// Options for `working_directory` with the inherited environment.
    pub fn in_dir(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    /// The `PATH` the child will see.
    pub fn search_path(&self) -> Option<&str> {
        self.environment
            .get("PATH")
            .or_else(|| {
                // Windows spells it `Path`.
                self.environment
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case("PATH"))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}
