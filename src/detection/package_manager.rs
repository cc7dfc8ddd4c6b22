//! Package manager backend detection.
//!
//! First match wins:
//!
//! 1. the package-manager user agent (`npm_config_user_agent`)
//! 2. the `packageManager` field of `package.json`
//! 3. the first lockfile found, in [`LOCKFILES`] order
//! 4. the detected runtime's name, with `node` meaning `npm`
//!
//! Any name outside the supported set becomes `npm`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::file_detection::first_existing;
use super::manifest::{load_manifest, Manifest};
use super::runtime::{Runtime, RuntimeDetector};
use super::version::ToolVersion;
use super::{system_env, DetectionSource};

/// Environment variable package managers set for the scripts they spawn.
pub const USER_AGENT_VAR: &str = "npm_config_user_agent";

/// Lockfile to backend, in precedence order.
pub const LOCKFILES: [(&str, Backend); 5] = [
    ("pnpm-lock.yaml", Backend::Pnpm),
    ("yarn.lock", Backend::Yarn),
    ("package-lock.json", Backend::Npm),
    ("bun.lockb", Backend::Bun),
    ("deno.lock", Backend::Deno),
];

/// Supported package manager backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    #[default]
    Npm,
    Cnpm,
    Yarn,
    Pnpm,
    Bun,
    Deno,
}

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::Npm,
        Backend::Cnpm,
        Backend::Yarn,
        Backend::Pnpm,
        Backend::Bun,
        Backend::Deno,
    ];

    /// The canonical name, which is also the executable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Cnpm => "cnpm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
            Self::Deno => "deno",
        }
    }

    /// Look up a backend by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Look up a backend by name, falling back to `npm`.
    pub fn normalize(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// The backend a runtime ships with.
    pub fn for_runtime(runtime: Runtime) -> Self {
        match runtime {
            Runtime::Node => Self::Npm,
            Runtime::Bun => Self::Bun,
            Runtime::Deno => Self::Deno,
        }
    }

    /// Whether scripts are run without a `run` token (`pnpm build`).
    pub fn runs_scripts_bare(self) -> bool {
        matches!(self, Self::Pnpm | Self::Yarn)
    }

    /// Whether the backend has its own `exec` and `dlx` subcommands.
    pub fn has_dlx(self) -> bool {
        matches!(self, Self::Pnpm | Self::Yarn)
    }

    /// The command prefix that runs a package script.
    pub fn run_command(self) -> String {
        if self.runs_scripts_bare() {
            self.name().to_string()
        } else if self == Self::Deno {
            format!("{} run -A", self.name())
        } else {
            format!("{} run", self.name())
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown package manager: {}", s))
    }
}

/// A resolved backend. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendIdentity {
    pub backend: Backend,
    pub version: Option<ToolVersion>,
    /// Lockfile name, relative to the project root.
    pub lockfile: Option<String>,
}

impl BackendIdentity {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            version: None,
            lockfile: None,
        }
    }

    /// Identity from a free-form name; unknown names become `npm`.
    pub fn from_name(name: &str) -> Self {
        Self::new(Backend::normalize(name))
    }

    pub fn with_version(mut self, version: ToolVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_lockfile(mut self, lockfile: impl Into<String>) -> Self {
        self.lockfile = Some(lockfile.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.backend.name()
    }
}

/// Parse a user agent such as `pnpm/9.1.0 npm/? node/v20.11.1 linux x64`.
///
/// Only the first token is used; it is split at its last `/`. A token without
/// `/` yields an empty name, which normalizes to `npm`. `npminstall` is the
/// user agent of cnpm.
pub fn parse_user_agent(user_agent: &str) -> BackendIdentity {
    let spec = user_agent.split(' ').next().unwrap_or_default();
    let (name, version) = match spec.rfind('/') {
        Some(pos) => (&spec[..pos], &spec[pos + 1..]),
        None => ("", spec),
    };

    let backend = if name == "npminstall" {
        Backend::Cnpm
    } else {
        Backend::normalize(name)
    };

    BackendIdentity::new(backend).with_version(ToolVersion::parse(version))
}

/// Parse a `packageManager` field such as `pnpm@9.1.0`.
///
/// The version defaults to `latest` when omitted.
pub fn parse_package_manager_field(field: &str) -> BackendIdentity {
    let mut parts = field.splitn(2, '@');
    let name = parts.next().unwrap_or_default();
    let version = parts.next().unwrap_or_default();

    BackendIdentity::from_name(name).with_version(ToolVersion::parse(version))
}

/// Result of backend detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDetection {
    pub identity: BackendIdentity,
    pub source: DetectionSource,
}

/// Detects the package manager backend for a project.
pub struct PackageManagerDetector;

impl PackageManagerDetector {
    /// Detect using the process environment.
    pub fn detect(project_root: &Path) -> BackendDetection {
        Self::detect_with_env(project_root, system_env)
    }

    /// Detect with a custom environment lookup.
    pub fn detect_with_env<F>(project_root: &Path, env_fn: F) -> BackendDetection
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_agent = env_fn(USER_AGENT_VAR);
        if let Some(ua) = user_agent.as_deref() {
            let identity = parse_user_agent(ua);
            tracing::debug!("Backend {} from user agent '{}'", identity.name(), ua);
            return BackendDetection {
                identity,
                source: DetectionSource::UserAgent,
            };
        }

        let manifest = load_manifest(project_root);
        if let Some(field) = manifest.as_ref().and_then(Manifest::package_manager) {
            let identity = parse_package_manager_field(field);
            tracing::debug!("Backend {} from packageManager '{}'", identity.name(), field);
            return BackendDetection {
                identity,
                source: DetectionSource::Manifest,
            };
        }

        if let Some((lockfile, backend)) = first_existing(project_root, &LOCKFILES) {
            tracing::debug!("Backend {} from {}", backend, lockfile);
            return BackendDetection {
                identity: BackendIdentity::new(*backend).with_lockfile(*lockfile),
                source: DetectionSource::Lockfile,
            };
        }

        let runtime = RuntimeDetector::detect_from(user_agent.as_deref(), manifest.as_ref());
        let backend = Backend::for_runtime(runtime.identity.runtime);
        tracing::debug!(
            "Backend {} from runtime {}",
            backend,
            runtime.identity.name()
        );
        BackendDetection {
            identity: BackendIdentity::new(backend),
            source: DetectionSource::Runtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn user_agent(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key| (key == USER_AGENT_VAR).then(|| value.to_string())
    }

    #[test]
    fn unknown_names_normalize_to_npm() {
        assert_eq!(Backend::normalize("pip"), Backend::Npm);
        assert_eq!(Backend::normalize("PNPM"), Backend::Pnpm);
        assert_eq!(BackendIdentity::from_name("").backend, Backend::Npm);
    }

    #[test]
    fn parses_backend_from_str() {
        assert_eq!("yarn".parse::<Backend>(), Ok(Backend::Yarn));
        assert!("gradle".parse::<Backend>().is_err());
    }

    #[test]
    fn run_command_prefixes() {
        assert_eq!(Backend::Npm.run_command(), "npm run");
        assert_eq!(Backend::Cnpm.run_command(), "cnpm run");
        assert_eq!(Backend::Bun.run_command(), "bun run");
        assert_eq!(Backend::Deno.run_command(), "deno run -A");
        assert_eq!(Backend::Pnpm.run_command(), "pnpm");
        assert_eq!(Backend::Yarn.run_command(), "yarn");
    }

    #[test]
    fn bare_script_runners_have_their_own_dlx() {
        for backend in Backend::ALL {
            assert_eq!(backend.runs_scripts_bare(), backend.run_command() == backend.name());
            assert_eq!(backend.has_dlx(), matches!(backend, Backend::Pnpm | Backend::Yarn));
        }
    }

    #[test]
    fn parses_user_agent() {
        let identity = parse_user_agent("pnpm/9.1.0 npm/? node/v20.11.1 darwin arm64");
        assert_eq!(identity.backend, Backend::Pnpm);
        assert_eq!(identity.version, Some(ToolVersion::parse("9.1.0")));
        assert!(identity.lockfile.is_none());
    }

    #[test]
    fn npminstall_is_cnpm() {
        let identity = parse_user_agent("npminstall/7.12.0 npm/? node/v18.0.0 linux x64");
        assert_eq!(identity.backend, Backend::Cnpm);
    }

    #[test]
    fn user_agent_without_slash_is_npm() {
        assert_eq!(parse_user_agent("weird").backend, Backend::Npm);
    }

    #[test]
    fn package_manager_field_defaults_to_latest() {
        let identity = parse_package_manager_field("yarn");
        assert_eq!(identity.backend, Backend::Yarn);
        assert_eq!(identity.version, Some(ToolVersion::Latest));

        let identity = parse_package_manager_field("pnpm@9.1.0+sha512.abc");
        assert_eq!(identity.backend, Backend::Pnpm);
        assert_eq!(
            identity.version.as_ref().and_then(ToolVersion::as_exact).map(|v| v.major),
            Some(9)
        );
    }

    #[test]
    fn user_agent_beats_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "packageManager": "yarn@4.0.2" }"#,
        )
        .unwrap();

        let detection =
            PackageManagerDetector::detect_with_env(temp.path(), user_agent("bun/1.1.8 linux"));
        assert_eq!(detection.identity.backend, Backend::Bun);
        assert_eq!(detection.source, DetectionSource::UserAgent);
    }

    #[test]
    fn manifest_beats_lockfile() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "packageManager": "yarn@4.0.2" }"#,
        )
        .unwrap();
        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();

        let detection = PackageManagerDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.backend, Backend::Yarn);
        assert_eq!(detection.source, DetectionSource::Manifest);
        assert!(detection.identity.lockfile.is_none());
    }

    #[test]
    fn lockfile_order_is_fixed() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("deno.lock"), "").unwrap();
        fs::write(temp.path().join("package-lock.json"), "").unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();

        let detection = PackageManagerDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.backend, Backend::Yarn);
        assert_eq!(detection.identity.lockfile.as_deref(), Some("yarn.lock"));
        assert_eq!(detection.source, DetectionSource::Lockfile);
    }

    #[test]
    fn malformed_manifest_falls_through_to_lockfile() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ nope").unwrap();
        fs::write(temp.path().join("bun.lockb"), "").unwrap();

        let detection = PackageManagerDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.backend, Backend::Bun);
        assert_eq!(detection.identity.lockfile.as_deref(), Some("bun.lockb"));
    }

    #[test]
    fn unknown_package_manager_field_is_npm() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "packageManager": "rush@5.0.0" }"#,
        )
        .unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();

        let detection = PackageManagerDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.backend, Backend::Npm);
        assert_eq!(detection.source, DetectionSource::Manifest);
    }

    #[test]
    fn falls_back_to_runtime() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "engines": { "deno": ">=2" } }"#,
        )
        .unwrap();

        let detection = PackageManagerDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity.backend, Backend::Deno);
        assert_eq!(detection.source, DetectionSource::Runtime);
    }

    #[test]
    fn empty_project_is_npm() {
        let temp = TempDir::new().unwrap();

        let detection = PackageManagerDetector::detect_with_env(temp.path(), no_env);
        assert_eq!(detection.identity, BackendIdentity::new(Backend::Npm));
    }
}
