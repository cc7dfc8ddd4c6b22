//! Command-line interface for Panam.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, OptionalArgs, RequiredArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
