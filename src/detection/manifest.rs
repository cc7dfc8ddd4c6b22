//! Tolerant `package.json` reader.
//!
//! Only the fields the resolver cares about are deserialized. Everything else
//! in the manifest is ignored, and a manifest that cannot be read or parsed is
//! reported as [`PanamError::MalformedManifest`] so callers can treat it as
//! "no signal".

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{PanamError, Result};

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of `package.json` used for detection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Declared package manager, formatted as `<name>@<version>`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub package_manager: Option<String>,

    /// Runtime/tool name to version range, in declaration order.
    #[serde(default, deserialize_with = "lenient_engines")]
    pub engines: Map<String, Value>,
}

impl Manifest {
    /// Parse a manifest from its JSON text.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| PanamError::MalformedManifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The `packageManager` field, if present and non-empty.
    pub fn package_manager(&self) -> Option<&str> {
        self.package_manager
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Engine names in declaration order.
    pub fn engine_names(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    /// The version range declared for an engine, when it is a string.
    pub fn engine_range(&self, name: &str) -> Option<&str> {
        self.engines.get(name).and_then(Value::as_str)
    }
}

// A field of the wrong type must not hide the fields we can use.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

// `engines` is sometimes written as an array by old tooling; treat anything
// that is not an object as absent instead of failing the whole manifest.
fn lenient_engines<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Path of the manifest for a project root.
pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(MANIFEST_FILE)
}

/// Read the manifest of a project.
///
/// Returns `Ok(None)` when there is no manifest at all.
pub fn read_manifest(project_root: &Path) -> Result<Option<Manifest>> {
    let path = manifest_path(project_root);
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| PanamError::MalformedManifest {
        path: path.clone(),
        message: e.to_string(),
    })?;

    Manifest::parse(&path, &content).map(Some)
}

/// Read the manifest, treating any failure as absence.
pub fn load_manifest(project_root: &Path) -> Option<Manifest> {
    match read_manifest(project_root) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::debug!("Ignoring manifest: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), content).unwrap();
        temp
    }

    #[test]
    fn reads_package_manager_and_engines() {
        let temp = write_manifest(
            r#"{
                "name": "demo",
                "packageManager": "pnpm@9.1.0",
                "engines": { "node": ">=20", "pnpm": ">=9" }
            }"#,
        );

        let manifest = read_manifest(temp.path()).unwrap().unwrap();
        assert_eq!(manifest.package_manager(), Some("pnpm@9.1.0"));
        assert_eq!(manifest.engine_range("node"), Some(">=20"));
    }

    #[test]
    fn engine_names_keep_declaration_order() {
        let temp = write_manifest(r#"{ "engines": { "pnpm": "9", "deno": "2", "node": "20" } }"#);

        let manifest = read_manifest(temp.path()).unwrap().unwrap();
        let names: Vec<_> = manifest.engine_names().collect();
        assert_eq!(names, vec!["pnpm", "deno", "node"]);
    }

    #[test]
    fn missing_manifest_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_manifest(temp.path()).unwrap().is_none());
        assert!(load_manifest(temp.path()).is_none());
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let temp = write_manifest("{ not json");

        let err = read_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, PanamError::MalformedManifest { .. }));
    }

    #[test]
    fn malformed_manifest_is_ignored_by_load() {
        let temp = write_manifest("{ not json");
        assert!(load_manifest(temp.path()).is_none());
    }

    #[test]
    fn empty_package_manager_is_absent() {
        let temp = write_manifest(r#"{ "packageManager": "" }"#);

        let manifest = read_manifest(temp.path()).unwrap().unwrap();
        assert!(manifest.package_manager().is_none());
    }

    #[test]
    fn unrelated_fields_do_not_hide_package_manager() {
        let temp =
            write_manifest(r#"{ "name": 42, "version": [], "packageManager": "yarn@4.0.2" }"#);

        let manifest = read_manifest(temp.path()).unwrap().unwrap();
        assert_eq!(manifest.package_manager(), Some("yarn@4.0.2"));
    }

    #[test]
    fn non_object_engines_are_ignored() {
        let temp = write_manifest(r#"{ "engines": ["node"] }"#);

        let manifest = read_manifest(temp.path()).unwrap().unwrap();
        assert_eq!(manifest.engine_names().count(), 0);
    }
}
