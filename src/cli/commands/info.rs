//! The `panam info` command.

use crate::config::ResolvedEngine;
use crate::detection::{ToolVersion, USER_AGENT_VAR};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

const LABEL_WIDTH: usize = 14;

/// Shows what panam resolved and what it would run.
pub struct InfoCommand {
    engine: ResolvedEngine,
}

impl InfoCommand {
    pub fn new(engine: ResolvedEngine) -> Self {
        Self { engine }
    }

    fn rows(&self, installed: Option<String>) -> Vec<(&'static str, String)> {
        let panam = &self.engine.panam;
        let backend = panam.backend();
        let runtime = panam.runtime();

        let declared = |version: &Option<ToolVersion>| match version {
            Some(v) => format!(" ({})", v),
            None => String::new(),
        };

        let binary = match panam.realname(&self.engine.options) {
            Ok(path) => path.display().to_string(),
            Err(e) => e.to_string(),
        };

        vec![
            ("Project", self.engine.options.working_directory.display().to_string()),
            ("Backend", format!("{}{}", backend.name(), declared(&backend.version))),
            ("Detected from", self.engine.backend_source.to_string()),
            (
                "Lockfile",
                backend.lockfile.clone().unwrap_or_else(|| "none".to_string()),
            ),
            ("Runtime", format!("{}{}", runtime.name(), declared(&runtime.version))),
            ("Runtime from", self.engine.runtime_source.to_string()),
            ("Run command", backend.backend.run_command()),
            ("Binary", binary),
            (
                "Version",
                installed.unwrap_or_else(|| "unavailable".to_string()),
            ),
        ]
    }
}

impl Command for InfoCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let installed = runtime
            .block_on(self.engine.panam.version(&self.engine.options))
            .ok()
            .map(|output| ToolVersion::from_output(&output).to_string());

        tracing::debug!(
            "{} = {:?}",
            USER_AGENT_VAR,
            self.engine.options.environment.get(USER_AGENT_VAR)
        );

        for (key, value) in self.rows(installed) {
            ui.show_field(key, &value, LABEL_WIDTH);
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn shows_lockfile_detection() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();
        let engine = EngineConfig::new(temp.path()).resolve_with_env(|_| None);
        let mut ui = MockUI::new();

        let result = InfoCommand::new(engine).execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.field("Backend"), Some("pnpm"));
        assert_eq!(ui.field("Lockfile"), Some("pnpm-lock.yaml"));
        assert_eq!(ui.field("Run command"), Some("pnpm"));
        assert_eq!(ui.field("Runtime"), Some("node"));
    }

    #[test]
    fn shows_manifest_version() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{ "packageManager": "yarn@4.1.0" }"#,
        )
        .unwrap();
        let engine = EngineConfig::new(temp.path()).resolve_with_env(|_| None);
        let mut ui = MockUI::new();

        InfoCommand::new(engine).execute(&mut ui).unwrap();

        assert_eq!(ui.field("Backend"), Some("yarn (4.1.0)"));
        assert_eq!(ui.field("Lockfile"), Some("none"));
    }
}
