//! Child process execution.
//!
//! `Created -> Spawning -> Running -> Exited`, or `Spawning -> SpawnFailed`.
//! An aborted child still ends in `Exited`; there is no separate aborted
//! result.

pub mod executor;
pub mod handle;
pub mod options;
pub mod resolve;

pub use executor::{capture, is_installed, tool_help, tool_version, CommandLine, ProcessExecutor};
pub use handle::{AbortHandle, AbortKind, ProcessHandle, ProcessResult};
pub use options::ExecutionOptions;
pub use resolve::resolve_executable;
