//! JavaScript runtime detection.
//!
//! Precedence: the runtime that launched us (ambient) beats the runtime
//! declared in `engines`, which beats the `node` default.
//!
//! A native binary has no runtime globals to inspect, so "ambient" is read
//! from the runtime tokens of the package-manager user agent, e.g.
//! `bun/1.1.8 npm/? node/v21.6.0 linux x64`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::manifest::{load_manifest, Manifest};
use super::package_manager::USER_AGENT_VAR;
use super::version::ToolVersion;
use super::{system_env, DetectionSource};

/// Supported JavaScript runtimes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Runtime {
    #[default]
    Node,
    Bun,
    Deno,
}

impl Runtime {
    /// All runtimes.
    pub const ALL: [Runtime; 3] = [Runtime::Node, Runtime::Bun, Runtime::Deno];

    /// The canonical name, which is also the executable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Bun => "bun",
            Self::Deno => "deno",
        }
    }

    /// Look up a runtime by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Look up a runtime by name, falling back to `node`.
    pub fn normalize(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// Arguments that make this runtime execute a script file.
    pub fn run_file_args(self, file: &str) -> Vec<String> {
        match self {
            Self::Deno => vec!["run".to_string(), "-A".to_string(), file.to_string()],
            Self::Node | Self::Bun => vec![file.to_string()],
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown runtime: {}", s))
    }
}

/// A resolved runtime and, when known, its version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeIdentity {
    pub runtime: Runtime,
    pub version: Option<ToolVersion>,
}

impl RuntimeIdentity {
    /// Identity without a version.
    pub fn new(runtime: Runtime) -> Self {
        Self {
            runtime,
            version: None,
        }
    }

    /// Identity from a free-form name; unknown names become `node`.
    pub fn from_name(name: &str) -> Self {
        Self::new(Runtime::normalize(name))
    }

    /// Attach a version.
    pub fn with_version(mut self, version: ToolVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// The runtime's name.
    pub fn name(&self) -> &'static str {
        self.runtime.name()
    }
}

/// Result of runtime detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDetection {
    pub identity: RuntimeIdentity,
    pub source: DetectionSource,
}

/// Detects the runtime for a project.
pub struct RuntimeDetector;

impl RuntimeDetector {
    /// Detect using the process environment.
    pub fn detect(project_root: &Path) -> RuntimeDetection {
        Self::detect_with_env(project_root, system_env)
    }

    /// Detect with a custom environment lookup.
    pub fn detect_with_env<F>(project_root: &Path, env_fn: F) -> RuntimeDetection
    where
        F: Fn(&str) -> Option<String>,
    {
        let manifest = load_manifest(project_root);
        Self::detect_from(env_fn(USER_AGENT_VAR).as_deref(), manifest.as_ref())
    }

    /// Detect from already-gathered signals.
    pub fn detect_from(
        user_agent: Option<&str>,
        manifest: Option<&Manifest>,
    ) -> RuntimeDetection {
        if let Some(identity) = user_agent.and_then(ambient_runtime) {
            tracing::debug!("Runtime {} from user agent", identity.name());
            return RuntimeDetection {
                identity,
                source: DetectionSource::UserAgent,
            };
        }

        if let Some(identity) = manifest.and_then(declared_runtime) {
            tracing::debug!("Runtime {} from engines", identity.name());
            return RuntimeDetection {
                identity,
                source: DetectionSource::Engines,
            };
        }

        RuntimeDetection {
            identity: RuntimeIdentity::default(),
            source: DetectionSource::Default,
        }
    }
}

/// The runtime advertised by a user agent string.
///
/// Bun is checked first, then deno, then node, matching the order in which a
/// runtime that emulates another still identifies itself first.
pub fn ambient_runtime(user_agent: &str) -> Option<RuntimeIdentity> {
    let tokens: Vec<&str> = user_agent.split_whitespace().collect();

    [Runtime::Bun, Runtime::Deno, Runtime::Node]
        .into_iter()
        .find_map(|runtime| {
            let prefix = format!("{}/", runtime.name());
            tokens
                .iter()
                .find_map(|token| token.strip_prefix(prefix.as_str()))
                .map(|version| {
                    RuntimeIdentity::new(runtime).with_version(ToolVersion::parse(version))
                })
        })
}

/// The first runtime named in the manifest's `engines` map.
pub fn declared_runtime(manifest: &Manifest) -> Option<RuntimeIdentity> {
    manifest.engine_names().find_map(|name| {
        Runtime::from_name(&name.to_lowercase()).map(|runtime| {
            let identity = RuntimeIdentity::new(runtime);
            match manifest.engine_range(name) {
                Some(range) => identity.with_version(ToolVersion::parse(range)),
                None => identity,
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn unknown_names_normalize_to_node() {
        assert_eq!(Runtime::normalize("python"), Runtime::Node);
        assert_eq!(Runtime::normalize("Deno"), Runtime::Deno);
        assert_eq!(RuntimeIdentity::from_name("").runtime, Runtime::Node);
    }

    #[test]
    fn deno_runs_files_with_permissions() {
        assert_eq!(
            Runtime::Deno.run_file_args("main.ts"),
            vec!["run", "-A", "main.ts"]
        );
        assert_eq!(Runtime::Node.run_file_args("index.js"), vec!["index.js"]);
        assert_eq!(Runtime::Bun.run_file_args("index.ts"), vec!["index.ts"]);
    }

    #[test]
    fn ambient_prefers_bun_token() {
        let identity = ambient_runtime("bun/1.1.8 npm/? node/v21.6.0 linux x64").unwrap();
        assert_eq!(identity.runtime, Runtime::Bun);
        assert_eq!(identity.version, Some(ToolVersion::parse("1.1.8")));
    }

    #[test]
    fn ambient_detects_deno() {
        let identity = ambient_runtime("deno/2.0.0 npm/? deno/2.0.0 linux x86_64").unwrap();
        assert_eq!(identity.runtime, Runtime::Deno);
    }

    #[test]
    fn ambient_detects_node_version() {
        let identity = ambient_runtime("pnpm/9.1.0 npm/? node/v20.11.1 darwin arm64").unwrap();
        assert_eq!(identity.runtime, Runtime::Node);
        assert_eq!(identity.version, Some(ToolVersion::parse("20.11.1")));
    }

    #[test]
    fn ambient_none_without_runtime_token() {
        assert!(ambient_runtime("yarn/1.22.19").is_none());
    }

    #[test]
    fn engines_fallback() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "engines": { "pnpm": ">=9", "Bun": ">=1.1" } }"#,
        )
        .unwrap();

        let detection = RuntimeDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.runtime, Runtime::Bun);
        assert_eq!(detection.source, DetectionSource::Engines);
    }

    #[test]
    fn ambient_beats_engines() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "engines": { "deno": "2" } }"#,
        )
        .unwrap();

        let detection = RuntimeDetector::detect_with_env(temp.path(), |key| {
            (key == USER_AGENT_VAR).then(|| "npm/10.2.4 node/v20.11.1 linux x64".to_string())
        });
        assert_eq!(detection.identity.runtime, Runtime::Node);
        assert_eq!(detection.source, DetectionSource::UserAgent);
    }

    #[test]
    fn defaults_to_node() {
        let temp = TempDir::new().unwrap();

        let detection = RuntimeDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity, RuntimeIdentity::default());
        assert_eq!(detection.source, DetectionSource::Default);
    }

    #[test]
    fn malformed_manifest_defaults_to_node() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{").unwrap();

        let detection = RuntimeDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.runtime, Runtime::Node);
    }
}
