//! Tool versions as they appear in user agents and manifests.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::{Version, VersionReq};

/// First `x.y.z` (with optional pre-release) in free-form tool output.
static VERSION_IN_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?").expect("VERSION_IN_OUTPUT must compile")
});

/// A version attached to a detected backend or runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolVersion {
    /// No specific version was requested.
    #[default]
    Latest,
    /// An exact semantic version (`9.1.0`, `v20.11.1`).
    Exact(Version),
    /// A range, typically from the manifest's `engines` map.
    Range(VersionReq),
    /// Anything that is neither of the above, kept verbatim.
    Other(String),
}

impl ToolVersion {
    /// Parse a version string.
    ///
    /// Empty input and `latest` map to [`ToolVersion::Latest`]. A leading `v`
    /// is accepted on exact versions, as printed by node.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
            return Self::Latest;
        }

        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if let Ok(version) = Version::parse(bare) {
            return Self::Exact(version);
        }

        if let Ok(req) = VersionReq::parse(trimmed) {
            return Self::Range(req);
        }

        Self::Other(trimmed.to_string())
    }

    /// Pull a version out of `--version` output.
    ///
    /// Handles bare output (`10.2.4`), node's `v20.11.1` and deno's
    /// multi-line `deno 1.40.0 (release, ...)` banner.
    pub fn from_output(output: &str) -> Self {
        match VERSION_IN_OUTPUT.find(output) {
            Some(m) => Self::parse(m.as_str()),
            None => Self::parse(output.lines().next().unwrap_or_default()),
        }
    }

    /// The exact version, if this is one.
    pub fn as_exact(&self) -> Option<&Version> {
        match self {
            Self::Exact(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is [`ToolVersion::Latest`].
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Exact(v) => write!(f, "{}", v),
            Self::Range(r) => write!(f, "{}", r),
            Self::Other(s) => f.write_str(s),
        }
    }
}
