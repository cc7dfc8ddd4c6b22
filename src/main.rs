//! Panam CLI entry point.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use panam::cli::{Cli, CommandDispatcher};
use panam::ui::{create_ui, OutputMode, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("panam=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("panam=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Report a parse failure. Help and version go through clap untouched.
fn parse_failure(err: clap::Error, ui: &mut dyn UserInterface) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            err.print().ok();
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            err.print().ok();
            ExitCode::from(1)
        }
        ErrorKind::InvalidSubcommand => {
            let name = err
                .get(clap::error::ContextKind::InvalidSubcommand)
                .map(|value| value.to_string())
                .unwrap_or_default();
            ui.error(&format!("Unknown command: {}", name));
            ExitCode::from(1)
        }
        _ => {
            let rendered = err.render().to_string();
            let line = rendered.lines().next().unwrap_or_default();
            ui.error(line.trim_start_matches("error: "));
            ExitCode::from(1)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let mut ui = create_ui(false, OutputMode::Normal);
            return parse_failure(err, ui.as_mut());
        }
    };
    init_tracing(cli.debug);

    tracing::debug!("Panam starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    // Handle --no-color
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut ui = create_ui(true, output_mode);

    let config = match cli.engine_config() {
        Ok(config) => config,
        Err(e) => {
            ui.error(&format!("Cannot determine the working directory: {}", e));
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(config);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => exit_code(result.exit_code),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            exit_code(e.exit_code())
        }
    }
}
