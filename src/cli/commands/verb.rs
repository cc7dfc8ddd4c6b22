//! The package-manager verbs (`add`, `run`, `jsr-add`, ...).

use std::time::Duration;

use crate::config::ResolvedEngine;
use crate::error::Result;
use crate::facade::{Panam, PreparedCall};
use crate::process::{ExecutionOptions, ProcessResult};
use crate::translate::{JsrVerb, Verb};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Exit code after Ctrl+C, as shells report it.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// How long an attached child gets to handle the terminal's SIGINT before
/// panam forwards one itself.
const INTERRUPT_GRACE: Duration = Duration::from_secs(5);

/// Runs one verb through the resolved backend.
pub struct VerbCommand {
    engine: ResolvedEngine,
    verb: Verb,
    args: Vec<String>,
}

enum Outcome {
    Finished(ProcessResult),
    Detached(u32),
    Interrupted,
}

impl VerbCommand {
    pub fn new(engine: ResolvedEngine, verb: Verb, args: Vec<String>) -> Self {
        Self { engine, verb, args }
    }
}

impl Command for VerbCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let wording = Wording::of(self.verb);
        let target = self.args.join(" ");
        let panam = &self.engine.panam;
        let options = &self.engine.options;

        let call = match panam.prepare(self.verb, self.args.clone(), options) {
            Ok(call) => call,
            Err(e) => {
                ui.error(&format!("{}: {}", wording.failed(&target), e));
                return Ok(CommandResult::failure(e.exit_code()));
            }
        };

        if self.engine.dry_run {
            for line in call.command_lines() {
                ui.output(&line.to_string());
            }
            return Ok(CommandResult::success());
        }

        ui.show_command(&call.to_string());
        ui.progress(&wording.started(&target));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let outcome = runtime.block_on(drive(panam, call, options));

        match outcome {
            Outcome::Finished(ProcessResult::Success) => {
                ui.success(&wording.done(&target));
                Ok(CommandResult::success())
            }
            Outcome::Finished(ProcessResult::Failure(e)) => {
                ui.error(&format!("{}: {}", wording.failed(&target), e));
                Ok(CommandResult::failure(e.exit_code()))
            }
            Outcome::Detached(pid) => {
                ui.success(&format!("Started {} in the background (pid {})", panam.name(), pid));
                Ok(CommandResult::success())
            }
            Outcome::Interrupted => {
                ui.warning("Interrupted");
                Ok(CommandResult::failure(INTERRUPTED_EXIT_CODE))
            }
        }
    }
}

async fn drive(panam: &Panam, call: PreparedCall, options: &ExecutionOptions) -> Outcome {
    let handle = panam.spawn(call, options).await;

    if options.daemon {
        if let Some(pid) = handle.pid() {
            return Outcome::Detached(pid);
        }
    }

    let abort = handle.abort_handle();
    let outcome = handle.result();
    tokio::pin!(outcome);

    tokio::select! {
        result = &mut outcome => Outcome::Finished(result),
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                let Some(abort) = abort else {
                    let _ = (&mut outcome).await;
                    return Outcome::Interrupted;
                };

                if options.daemon {
                    // Detached children are outside the terminal's process group.
                    tracing::debug!("Ctrl+C received, interrupting {}", panam.name());
                    abort.abort();
                    let _ = (&mut outcome).await;
                    return Outcome::Interrupted;
                }

                // The terminal has already sent SIGINT to the child. A second
                // one makes npm and pnpm quit without cleaning up.
                tracing::debug!("Ctrl+C received, waiting for {} to stop", panam.name());
                abort.cancel();
                if tokio::time::timeout(INTERRUPT_GRACE, &mut outcome).await.is_err() {
                    tracing::debug!("{} still running, interrupting it", panam.name());
                    abort.abort();
                    let _ = (&mut outcome).await;
                }
                Outcome::Interrupted
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not listen for Ctrl+C");
                Outcome::Finished((&mut outcome).await)
            }
        },
    }
}

/// How a verb is described in status lines.
struct Wording {
    doing: &'static str,
    done: &'static str,
    action: &'static str,
    noun: &'static str,
    jsr: bool,
}

impl Wording {
    fn of(verb: Verb) -> Self {
        let (jsr, verb) = match verb {
            Verb::Jsr(JsrVerb::Add) => (true, Verb::Add),
            Verb::Jsr(JsrVerb::Remove) => (true, Verb::Remove),
            Verb::Jsr(JsrVerb::Run) => (true, Verb::Run),
            Verb::Jsr(JsrVerb::Exec) => (true, Verb::Exec),
            Verb::Jsr(JsrVerb::Dlx) => (true, Verb::Dlx),
            Verb::Jsr(JsrVerb::X) => (true, Verb::X),
            other => (false, other),
        };

        let (doing, done, action, noun) = match verb {
            Verb::Install => ("Installing", "Installed", "install", "dependencies"),
            Verb::Create => ("Creating", "Created", "create", "project with"),
            Verb::Add => ("Adding", "Added", "add", "dependencies"),
            Verb::Remove => ("Removing", "Removed", "remove", "dependencies"),
            Verb::Run => ("Running", "Ran", "execute", "script"),
            Verb::Exec => ("Executing", "Executed", "execute", "command"),
            Verb::Dlx => ("Running", "Ran", "execute", "DLX binary"),
            Verb::X | Verb::Jsr(_) => ("Running", "Ran", "execute", "shortcut command"),
        };

        Self {
            doing,
            done,
            action,
            noun,
            jsr,
        }
    }

    fn subject(&self, target: &str) -> String {
        let noun = if self.jsr {
            format!("JSR {}", self.noun)
        } else {
            self.noun.to_string()
        };
        if target.is_empty() {
            noun
        } else {
            format!("{} \"{}\"", noun, target)
        }
    }

    fn started(&self, target: &str) -> String {
        format!("{} {}", self.doing, self.subject(target))
    }

    fn done(&self, target: &str) -> String {
        format!("{} {}", self.done, self.subject(target))
    }

    fn failed(&self, target: &str) -> String {
        format!("Failed to {} {}", self.action, self.subject(target))
    }
}
