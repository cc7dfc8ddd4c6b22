//! Backend and runtime detection.
//!
//! Detection answers two questions for a project directory: which package
//! manager backend is "the" package manager, and which JavaScript runtime is
//! in effect. Every branch ends in a default, so detection never fails.
//!
//! Environment access goes through a lookup function so callers (and tests)
//! can supply their own view of the environment.

pub mod file_detection;
pub mod manifest;
pub mod package_manager;
pub mod runtime;
pub mod version;

use std::fmt;

pub use manifest::{load_manifest, Manifest};
pub use package_manager::{
    Backend, BackendDetection, BackendIdentity, PackageManagerDetector, LOCKFILES,
    USER_AGENT_VAR,
};
pub use runtime::{Runtime, RuntimeDetection, RuntimeDetector, RuntimeIdentity};
pub use version::ToolVersion;

/// Where a detected value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// Supplied explicitly by the caller.
    Override,
    /// The package-manager user-agent environment variable.
    UserAgent,
    /// The `packageManager` field of `package.json`.
    Manifest,
    /// A lockfile in the project root.
    Lockfile,
    /// The `engines` map of `package.json`.
    Engines,
    /// Derived from the detected runtime.
    Runtime,
    /// Nothing matched.
    Default,
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Override => "override",
            Self::UserAgent => "user agent",
            Self::Manifest => "package.json packageManager",
            Self::Lockfile => "lockfile",
            Self::Engines => "package.json engines",
            Self::Runtime => "runtime",
            Self::Default => "default",
        };
        f.write_str(label)
    }
}

/// Look up an environment variable, treating empty values as unset.
pub fn system_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
