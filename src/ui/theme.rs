//! Visual theme and styling.

use console::Style;

/// Panam's visual theme.
#[derive(Debug, Clone)]
pub struct PanamTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for progress lines (cyan).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for command lines (dim italic).
    pub command: Style,
    /// Style for key labels in key-value displays (bold).
    pub key: Style,
    /// Style for values in key-value displays (normal).
    pub value: Style,
}

impl Default for PanamTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PanamTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            command: Style::new().dim().italic(),
            key: Style::new().bold(),
            value: Style::new(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            command: Style::new(),
            key: Style::new(),
            value: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_info(&self, msg: &str) -> String {
        format!("{}", self.info.apply_to(format!("› {}", msg)))
    }

    /// Format a command line about to run.
    pub fn format_command(&self, line: &str) -> String {
        format!("{} {}", self.dim.apply_to("$"), self.command.apply_to(line))
    }

    /// Format a `key: value` row with the key padded to `width`.
    pub fn format_field(&self, key: &str, value: &str, width: usize) -> String {
        format!(
            "{} {}",
            self.key.apply_to(format!("{:<width$}", format!("{}:", key), width = width + 1)),
            self.value.apply_to(value)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_status_lines() {
        let theme = PanamTheme::plain();
        assert_eq!(theme.format_success("Installed"), "✓ Installed");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
        assert_eq!(theme.format_info("Adding"), "› Adding");
    }

    #[test]
    fn theme_formats_command() {
        let theme = PanamTheme::plain();
        assert_eq!(theme.format_command("pnpm add left-pad"), "$ pnpm add left-pad");
    }

    #[test]
    fn theme_pads_fields() {
        let theme = PanamTheme::plain();
        assert_eq!(theme.format_field("Backend", "pnpm", 8), "Backend:  pnpm");
    }

    #[test]
    fn default_impl_matches_new() {
        let default = PanamTheme::default();
        let new = PanamTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
