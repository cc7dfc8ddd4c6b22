//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::translate::{JsrVerb, Verb};

/// Panam - one command set for npm, yarn, pnpm, bun and deno.
#[derive(Debug, Parser)]
#[command(name = "panam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true, env = "PANAM_CWD")]
    pub cwd: Option<PathBuf>,

    /// Package manager to use instead of detecting one
    #[arg(long, global = true, env = "PANAM_PM")]
    pub pm: Option<String>,

    /// Runtime to use instead of detecting one
    #[arg(long, global = true, env = "PANAM_RUNTIME")]
    pub runtime: Option<String>,

    /// Detach the command and discard its output
    #[arg(long, global = true, env = "PANAM_DAEMON")]
    pub daemon: bool,

    /// Check that the package manager answers --version before running
    #[arg(long, global = true, env = "PANAM_VERIFY")]
    pub verify: bool,

    /// Print the translated command lines without running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Show the command line before it runs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Engine configuration from the global flags.
    pub fn engine_config(&self) -> std::io::Result<EngineConfig> {
        let project_root = match &self.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        Ok(EngineConfig {
            backend_override: self.pm.clone(),
            runtime_override: self.runtime.clone(),
            daemon: self.daemon,
            verify_installed: self.verify,
            dry_run: self.dry_run,
            ..EngineConfig::new(project_root)
        })
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install all project dependencies
    #[command(visible_alias = "i")]
    Install(OptionalArgs),

    /// Create a new project from a template
    Create(RequiredArgs),

    /// Add one or more dependencies
    #[command(visible_alias = "use")]
    Add(RequiredArgs),

    /// Remove one or more dependencies
    #[command(visible_aliases = ["uninstall", "rm"])]
    Remove(RequiredArgs),

    /// Run a local file or a package.json script
    #[command(visible_alias = "task")]
    Run(RequiredArgs),

    /// Execute a binary from the project's dependencies
    Exec(RequiredArgs),

    /// Download and run a package binary without installing it
    Dlx(RequiredArgs),

    /// Run a local binary, falling back to download and run
    X(RequiredArgs),

    /// Add JSR dependencies
    #[command(name = "jsr-add", alias = "jsr:add")]
    JsrAdd(RequiredArgs),

    /// Remove JSR dependencies
    #[command(name = "jsr-remove", alias = "jsr:remove")]
    JsrRemove(RequiredArgs),

    /// Run a script through JSR
    #[command(name = "jsr-run", alias = "jsr:run")]
    JsrRun(RequiredArgs),

    /// Execute a binary through JSR
    #[command(name = "jsr-exec", alias = "jsr:exec")]
    JsrExec(RequiredArgs),

    /// Download and run a JSR package binary
    #[command(name = "jsr-dlx", alias = "jsr:dlx")]
    JsrDlx(RequiredArgs),

    /// Run a JSR package binary
    #[command(name = "jsr-x", alias = "jsr:x")]
    JsrX(RequiredArgs),

    /// Show the resolved package manager and runtime
    Info,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// The verb and its arguments, for subcommands that run one.
    pub fn verb(&self) -> Option<(Verb, &[String])> {
        let (verb, args) = match self {
            Self::Install(a) => (Verb::Install, &a.args),
            Self::Create(a) => (Verb::Create, &a.args),
            Self::Add(a) => (Verb::Add, &a.args),
            Self::Remove(a) => (Verb::Remove, &a.args),
            Self::Run(a) => (Verb::Run, &a.args),
            Self::Exec(a) => (Verb::Exec, &a.args),
            Self::Dlx(a) => (Verb::Dlx, &a.args),
            Self::X(a) => (Verb::X, &a.args),
            Self::JsrAdd(a) => (Verb::Jsr(JsrVerb::Add), &a.args),
            Self::JsrRemove(a) => (Verb::Jsr(JsrVerb::Remove), &a.args),
            Self::JsrRun(a) => (Verb::Jsr(JsrVerb::Run), &a.args),
            Self::JsrExec(a) => (Verb::Jsr(JsrVerb::Exec), &a.args),
            Self::JsrDlx(a) => (Verb::Jsr(JsrVerb::Dlx), &a.args),
            Self::JsrX(a) => (Verb::Jsr(JsrVerb::X), &a.args),
            Self::Info | Self::Completions(_) => return None,
        };
        Some((verb, args.as_slice()))
    }
}

/// Arguments passed through to the package manager, possibly none.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct OptionalArgs {
    /// Extra arguments for the package manager
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments passed through to the package manager, at least one.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RequiredArgs {
    /// Packages, scripts or binaries followed by their arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
