//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use panam::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.progress("Adding dependencies \"left-pad\"");
//! ui.success("Added dependencies \"left-pad\"");
//!
//! assert!(ui.has_progress("Adding dependencies"));
//! assert!(ui.successes().contains(&"Added dependencies \"left-pad\"".to_string()));
//! ```

use super::{OutputMode, UserInterface};

/// Captures every UI call. Output mode filtering is not applied.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    outputs: Vec<String>,
    progress: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    commands: Vec<String>,
    fields: Vec<(String, String)>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn progress_lines(&self) -> &[String] {
        &self.progress
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Value of the first field named `key`.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_progress(&self, needle: &str) -> bool {
        self.progress.iter().any(|p| p.contains(needle))
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn progress(&mut self, msg: &str) {
        self.progress.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_command(&mut self, line: &str) {
        self.commands.push(line.to_string());
    }

    fn show_field(&mut self, key: &str, value: &str, _width: usize) {
        self.fields.push((key.to_string(), value.to_string()));
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
