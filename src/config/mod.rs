//! Startup configuration.
//!
//! Configuration is gathered once (from flags or their `PANAM_*` environment
//! variables) and resolved once into a [`ResolvedEngine`]. Everything after
//! that point works from the explicit identities it carries.
//!
//! ```
//! use panam::config::EngineConfig;
//! use panam::detection::{Backend, DetectionSource};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! std::fs::write(temp.path().join("yarn.lock"), "").unwrap();
//!
//! let engine = EngineConfig::new(temp.path()).resolve_with_env(|_| None);
//! assert_eq!(engine.panam.backend().backend, Backend::Yarn);
//! assert_eq!(engine.backend_source, DetectionSource::Lockfile);
//! ```

use std::path::{Path, PathBuf};

use crate::detection::{
    system_env, Backend, BackendIdentity, DetectionSource, PackageManagerDetector,
    RuntimeDetector, RuntimeIdentity, USER_AGENT_VAR,
};
use crate::facade::Panam;
use crate::process::{ExecutionOptions, ProcessExecutor};

/// Explicit engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding `package.json` and lockfiles; also the working
    /// directory of spawned commands.
    pub project_root: PathBuf,

    /// Backend name to use instead of detection. Unknown names mean `npm`.
    pub backend_override: Option<String>,

    /// Runtime name to use instead of detection. Unknown names mean `node`.
    pub runtime_override: Option<String>,

    /// Detach spawned commands and discard their output.
    pub daemon: bool,

    /// Require `--version` to succeed before running a command.
    pub verify_installed: bool,

    /// Print command lines instead of running them.
    pub dry_run: bool,
}

/// The result of resolving an [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct ResolvedEngine {
    pub panam: Panam,
    pub backend_source: DetectionSource,
    pub runtime_source: DetectionSource,
    pub options: ExecutionOptions,
    pub dry_run: bool,
}

impl EngineConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> ResolvedEngine {
        self.resolve_with_env(system_env)
    }

    /// Resolve with a custom environment lookup.
    pub fn resolve_with_env<F>(&self, env_fn: F) -> ResolvedEngine
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = self.project_root.as_path();

        let (runtime, runtime_source) = match self.runtime_override.as_deref() {
            Some(name) => (RuntimeIdentity::from_name(name), DetectionSource::Override),
            None => {
                let detection = RuntimeDetector::detect_with_env(root, &env_fn);
                (detection.identity, detection.source)
            }
        };

        let (backend, backend_source) = match self.backend_override.as_deref() {
            Some(name) => (BackendIdentity::from_name(name), DetectionSource::Override),
            None => {
                let detection = PackageManagerDetector::detect_with_env(root, &env_fn);
                // A forced runtime also decides the runtime-derived backend.
                if detection.source == DetectionSource::Runtime
                    && runtime_source == DetectionSource::Override
                {
                    (
                        BackendIdentity::new(Backend::for_runtime(runtime.runtime)),
                        DetectionSource::Runtime,
                    )
                } else {
                    (detection.identity, detection.source)
                }
            }
        };

        tracing::debug!(
            "Resolved backend {} ({}), runtime {} ({}); user agent: {:?}",
            backend.name(),
            backend_source,
            runtime.name(),
            runtime_source,
            env_fn(USER_AGENT_VAR)
        );

        let executor = ProcessExecutor::new().verify_installed(self.verify_installed);
        ResolvedEngine {
            panam: Panam::new(backend, runtime).with_executor(executor),
            backend_source,
            runtime_source,
            options: ExecutionOptions::in_dir(&self.project_root).with_daemon(self.daemon),
            dry_run: self.dry_run,
        }
    }
}
