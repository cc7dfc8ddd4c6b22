//! Spawning resolved command lines.

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::{PanamError, Result};

use super::handle::{AbortKind, ProcessHandle, ProcessResult};
use super::options::ExecutionOptions;
use super::resolve::resolve_executable;

/// A logical program name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Starts child processes.
///
/// Every failure is reported through the returned handle; nothing here
/// returns `Err` for an execution problem.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    verify_installed: bool,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `<program> --version` to succeed before running the real command.
    pub fn verify_installed(mut self, verify: bool) -> Self {
        self.verify_installed = verify;
        self
    }

    /// Resolve and spawn `line`. Must be called inside a tokio runtime.
    pub async fn spawn(&self, line: &CommandLine, options: &ExecutionOptions) -> ProcessHandle {
        let path = match resolve_executable(&line.program, options) {
            Ok(path) => path,
            Err(e) => return ProcessHandle::resolved(ProcessResult::Failure(e)),
        };

        if self.verify_installed && capture(&path, &["--version"], options).await.is_err() {
            return ProcessHandle::resolved(ProcessResult::Failure(PanamError::NotInstalled {
                program: line.program.clone(),
            }));
        }

        tracing::debug!(
            "Spawning {} ({}) in {}",
            line,
            path.display(),
            options.working_directory.display()
        );

        match build_command(&path, &line.args, options).spawn() {
            Ok(child) => ProcessHandle::supervise(child, line.to_string()),
            Err(source) => ProcessHandle::resolved(ProcessResult::Failure(PanamError::SpawnFailed {
                program: line.program.clone(),
                source,
            })),
        }
    }

    /// Spawn `line` and wait for it.
    pub async fn run(&self, line: &CommandLine, options: &ExecutionOptions) -> ProcessResult {
        self.spawn(line, options).await.result().await
    }

    /// Run `primary`, then `fallback` only if `primary` failed without being
    /// aborted. The fallback's outcome replaces the primary's.
    pub fn spawn_with_fallback(
        &self,
        primary: CommandLine,
        fallback: CommandLine,
        options: &ExecutionOptions,
    ) -> ProcessHandle {
        let executor = self.clone();
        let options = options.clone();

        ProcessHandle::from_task(move |mut abort_rx| async move {
            let first = executor.attempt(&primary, &options, &mut abort_rx).await;
            if first.result.is_success() || first.aborted {
                return first.result;
            }

            if abort_rx.try_recv().is_ok() {
                return first.result;
            }

            tracing::debug!("'{}' failed, falling back to '{}'", primary, fallback);
            executor.attempt(&fallback, &options, &mut abort_rx).await.result
        })
    }

    async fn attempt(
        &self,
        line: &CommandLine,
        options: &ExecutionOptions,
        abort_rx: &mut mpsc::UnboundedReceiver<AbortKind>,
    ) -> Attempt {
        let handle = self.spawn(line, options).await;
        let child_abort = handle.abort_handle();
        let outcome = handle.result();
        tokio::pin!(outcome);

        let mut aborted = false;
        let mut abort_open = true;
        loop {
            tokio::select! {
                result = &mut outcome => return Attempt { result, aborted },
                request = abort_rx.recv(), if abort_open => match request {
                    Some(kind) => {
                        aborted = true;
                        if let Some(abort) = &child_abort {
                            abort.request(kind);
                        }
                    }
                    None => abort_open = false,
                },
            }
        }
    }
}

struct Attempt {
    result: ProcessResult,
    aborted: bool,
}

fn build_command(path: &Path, args: &[String], options: &ExecutionOptions) -> Command {
    let mut cmd = Command::new(path);
    cmd.args(args)
        .current_dir(&options.working_directory)
        .env_clear()
        .envs(&options.environment);

    if options.daemon {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut cmd);
    } else {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    }

    cmd
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}

/// Run `path` with `args` and capture its trimmed standard output.
pub async fn capture(path: &Path, args: &[&str], options: &ExecutionOptions) -> Result<String> {
    let output = Command::new(path)
        .args(args)
        .current_dir(&options.working_directory)
        .env_clear()
        .envs(&options.environment)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| PanamError::SpawnFailed {
            program: path.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(PanamError::NonZeroExit {
            command: format!("{} {}", path.display(), args.join(" ")),
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `<program> --version`, trimmed.
pub async fn tool_version(program: &str, options: &ExecutionOptions) -> Result<String> {
    let path = resolve_executable(program, options)?;
    capture(&path, &["--version"], options).await
}

/// `<program> --help`.
pub async fn tool_help(program: &str, options: &ExecutionOptions) -> Result<String> {
    let path = resolve_executable(program, options)?;
    capture(&path, &["--help"], options).await
}

/// Whether `program` resolves and answers `--version`.
pub async fn is_installed(program: &str, options: &ExecutionOptions) -> bool {
    tool_version(program, options).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_display() {
        let line = CommandLine::new("pnpm", vec!["add".to_string(), "left-pad".to_string()]);
        assert_eq!(line.to_string(), "pnpm add left-pad");
        assert_eq!(CommandLine::new("npm", Vec::new()).to_string(), "npm");
    }

    #[tokio::test]
    async fn missing_executable_resolves_to_failure() {
        let line = CommandLine::new("panam-no-such-tool-xyz", vec!["install".to_string()]);
        let result = ProcessExecutor::new()
            .run(&line, &ExecutionOptions::default())
            .await;

        match result {
            ProcessResult::Failure(PanamError::ExecutableNotFound { program }) => {
                assert_eq!(program, "panam-no-such-tool-xyz");
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_tool_is_not_installed() {
        assert!(!is_installed("panam-no-such-tool-xyz", &ExecutionOptions::default()).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_decides_outcome() {
        let executor = ProcessExecutor::new();
        let options = ExecutionOptions::default();

        let ok = executor.run(&CommandLine::new("true", Vec::new()), &options).await;
        assert!(ok.is_success());

        let failed = executor
            .run(
                &CommandLine::new("sh", vec!["-c".to_string(), "exit 3".to_string()]),
                &options,
            )
            .await;
        assert_eq!(failed.exit_code(), 3);
        let message = failed.error().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("sh -c exit 3"), "{}", message);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fallback_runs_only_after_failure() {
        let executor = ProcessExecutor::new();
        let options = ExecutionOptions::default();

        let handle = executor.spawn_with_fallback(
            CommandLine::new("false", Vec::new()),
            CommandLine::new("true", Vec::new()),
            &options,
        );
        assert!(handle.result().await.is_success());

        let handle = executor.spawn_with_fallback(
            CommandLine::new("true", Vec::new()),
            CommandLine::new("sh", vec!["-c".to_string(), "exit 4".to_string()]),
            &options,
        );
        assert!(handle.result().await.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fallback_result_is_authoritative() {
        let handle = ProcessExecutor::new().spawn_with_fallback(
            CommandLine::new("false", Vec::new()),
            CommandLine::new("sh", vec!["-c".to_string(), "exit 4".to_string()]),
            &ExecutionOptions::default(),
        );
        assert_eq!(handle.result().await.exit_code(), 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn capture_trims_output() {
        let options = ExecutionOptions::default();
        let path = resolve_executable("sh", &options).unwrap();
        let out = capture(&path, &["-c", "echo '  hello  '"], &options).await.unwrap();
        assert_eq!(out, "hello");
    }
}
