//! Panam - one command set for every JavaScript package manager.
//!
//! Panam works out which package manager (npm, cnpm, yarn, pnpm, bun, deno)
//! and which runtime (node, bun, deno) a project uses, translates a small set
//! of verbs into that tool's command line, and runs it.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Startup configuration and one-time resolution
//! - [`detection`] - Backend and runtime detection
//! - [`error`] - Error types and result aliases
//! - [`facade`] - The [`Panam`] entry point
//! - [`process`] - Executable lookup and child process supervision
//! - [`translate`] - Verb to argv translation, including JSR
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use panam::detection::Backend;
//! use panam::translate::{translate, Plan, Verb};
//!
//! let plan = translate(Backend::Npm, Verb::Add, ["left-pad"]).unwrap();
//! assert_eq!(plan, Plan::Single(vec!["install".into(), "left-pad".into()]));
//! ```

pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod facade;
pub mod process;
pub mod translate;
pub mod ui;

pub use detection::{Backend, Runtime};
pub use error::{PanamError, Result};
pub use facade::{BoundVerb, Panam, PreparedCall};
pub use translate::{JsrVerb, Verb};
