//! Handles to running child processes.
//!
//! A spawned child is owned by a supervisor task. The handle talks to it over
//! two channels: an abort channel (many senders, checked while the child is
//! running) and a oneshot result channel, which can only ever deliver one
//! [`ProcessResult`].

use std::future::Future;

use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};

use crate::error::PanamError;

/// Outcome of one invocation.
#[derive(Debug)]
pub enum ProcessResult {
    /// The child exited with status 0.
    Success,
    /// The child could not be started or did not exit with status 0.
    Failure(PanamError),
}

impl ProcessResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The error, if this is a failure.
    pub fn error(&self) -> Option<&PanamError> {
        match self {
            Self::Success => None,
            Self::Failure(e) => Some(e),
        }
    }

    /// The exit code a CLI should report for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure(e) => e.exit_code(),
        }
    }

    pub fn into_result(self) -> crate::error::Result<()> {
        match self {
            Self::Success => Ok(()),
            Self::Failure(e) => Err(e),
        }
    }
}

/// What an abort request does to the running child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortKind {
    /// Send the child an interrupt signal.
    Interrupt,
    /// The child was already signalled elsewhere; only stop any fallback.
    Cancel,
}

/// A cloneable way to stop a running child.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: mpsc::UnboundedSender<AbortKind>,
}

impl AbortHandle {
    /// Ask the child to stop with an interrupt signal.
    ///
    /// Best effort. Does nothing once the child has exited.
    pub fn abort(&self) {
        self.request(AbortKind::Interrupt);
    }

    /// Mark the invocation as aborted without signalling the child.
    ///
    /// For a child in the terminal's foreground group, which has already
    /// received the SIGINT from Ctrl+C. A pending fallback never starts.
    pub fn cancel(&self) {
        self.request(AbortKind::Cancel);
    }

    pub(crate) fn request(&self, kind: AbortKind) {
        if self.tx.send(kind).is_err() {
            tracing::debug!("{:?} requested after the process finished", kind);
        }
    }
}

/// A running (or already finished) invocation.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Option<u32>,
    abort: Option<AbortHandle>,
    result: oneshot::Receiver<ProcessResult>,
}

impl ProcessHandle {
    /// Take ownership of `child` and supervise it on the current runtime.
    pub(crate) fn supervise(child: Child, command: String) -> Self {
        let pid = child.id();
        let mut handle = Self::from_task(move |abort_rx| wait_for_exit(child, command, abort_rx));
        handle.pid = pid;
        handle
    }

    /// Run `work` on the current runtime. It receives this handle's abort
    /// requests and produces the result.
    pub(crate) fn from_task<F, Fut>(work: F) -> Self
    where
        F: FnOnce(mpsc::UnboundedReceiver<AbortKind>) -> Fut,
        Fut: Future<Output = ProcessResult> + Send + 'static,
    {
        let (abort_tx, abort_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();
        let work = work(abort_rx);

        tokio::spawn(async move {
            // The receiver may have been dropped; the work is done either way.
            let _ = result_tx.send(work.await);
        });

        Self {
            pid: None,
            abort: Some(AbortHandle { tx: abort_tx }),
            result: result_rx,
        }
    }

    /// A handle whose result is already known, e.g. a spawn failure.
    pub fn resolved(result: ProcessResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self {
            pid: None,
            abort: None,
            result: rx,
        }
    }

    /// OS process id, when a child was started.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Interrupt the child. Idempotent; a no-op when nothing is running.
    pub fn abort(&self) {
        if let Some(handle) = &self.abort {
            handle.abort();
        }
    }

    /// A handle that can abort this process from elsewhere.
    pub fn abort_handle(&self) -> Option<AbortHandle> {
        self.abort.clone()
    }

    /// Wait for the outcome.
    pub async fn result(self) -> ProcessResult {
        match self.result.await {
            Ok(result) => result,
            Err(_) => ProcessResult::Failure(PanamError::Other(anyhow::anyhow!(
                "process supervisor stopped before reporting a result"
            ))),
        }
    }
}

async fn wait_for_exit(
    mut child: Child,
    command: String,
    mut abort_rx: mpsc::UnboundedReceiver<AbortKind>,
) -> ProcessResult {
    let mut abort_open = true;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            request = abort_rx.recv(), if abort_open => match request {
                Some(AbortKind::Interrupt) => interrupt(&mut child),
                Some(AbortKind::Cancel) => tracing::debug!("'{}' cancelled", command),
                None => abort_open = false,
            },
        }
    };

    match status {
        Ok(status) if status.success() => ProcessResult::Success,
        Ok(status) => {
            tracing::debug!("'{}' exited with {}", command, status);
            ProcessResult::Failure(PanamError::NonZeroExit {
                command,
                code: status.code(),
            })
        }
        Err(e) => ProcessResult::Failure(PanamError::Io(e)),
    }
}

#[cfg(unix)]
fn interrupt(child: &mut Child) {
    let Some(pid) = child.id() else {
        return;
    };

    // SAFETY: kill(2) only delivers a signal. The child has not been reaped
    // yet, so the pid still refers to it.
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) };
    if rc != 0 {
        tracing::warn!(
            pid,
            error = %std::io::Error::last_os_error(),
            "Failed to interrupt process"
        );
    }
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        tracing::warn!(error = %e, "Failed to stop process");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolved_handle_reports_its_result() {
        let handle = ProcessHandle::resolved(ProcessResult::Success);
        assert!(handle.pid().is_none());
        assert!(handle.abort_handle().is_none());
        handle.abort();
        assert!(handle.result().await.is_success());
    }

    #[test]
    fn failure_exit_codes() {
        let result = ProcessResult::Failure(PanamError::NonZeroExit {
            command: "npm install".to_string(),
            code: Some(2),
        });
        assert_eq!(result.exit_code(), 2);
        assert!(result.error().is_some());

        let result = ProcessResult::Failure(PanamError::ExecutableNotFound {
            program: "pnpm".to_string(),
        });
        assert_eq!(result.exit_code(), 1);
        assert!(result.into_result().is_err());
    }

    #[test]
    fn success_exit_code_is_zero() {
        assert_eq!(ProcessResult::Success.exit_code(), 0);
        assert!(ProcessResult::Success.into_result().is_ok());
    }
}
