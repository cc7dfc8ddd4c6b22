//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::info::InfoCommand;
use super::verb::VerbCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: EngineConfig,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given engine configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Dispatch and execute a command.
    ///
    /// Backend and runtime are resolved here, once, and only for commands
    /// that need them.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(command) = &cli.command else {
            ui.error("No command given. Run 'panam --help' for usage.");
            return Ok(CommandResult::failure(1));
        };

        match command {
            Commands::Completions(args) => CompletionsCommand::new(args.clone()).execute(ui),
            Commands::Info => InfoCommand::new(self.config.resolve()).execute(ui),
            other => match other.verb() {
                Some((verb, args)) => {
                    VerbCommand::new(self.config.resolve(), verb, args.to_vec()).execute(ui)
                }
                None => Ok(CommandResult::failure(1)),
            },
        }
    }
}
