//! Plain output for pipes and CI.

use super::{OutputMode, PanamTheme, UserInterface};

/// Writes uncolored lines. Status goes to stdout, warnings and errors to
/// stderr.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: PanamTheme,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: PanamTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn output(&mut self, text: &str) {
        println!("{}", text);
    }

    fn progress(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            println!("{}", self.theme.format_info(msg));
        }
    }

    fn success(&mut self, msg: &str) {
        println!("{}", self.theme.format_success(msg));
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_command(&mut self, line: &str) {
        if self.mode.shows_commands() {
            println!("{}", self.theme.format_command(line));
        }
    }

    fn show_field(&mut self, key: &str, value: &str, width: usize) {
        println!("{}", self.theme.format_field(key, value, width));
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_is_not_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn non_interactive_keeps_mode() {
        let ui = NonInteractiveUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
