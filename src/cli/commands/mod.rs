//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Every verb
//! subcommand shares [`verb::VerbCommand`]; only `info` and `completions`
//! have their own implementations.

pub mod completions;
pub mod dispatcher;
pub mod info;
pub mod verb;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
