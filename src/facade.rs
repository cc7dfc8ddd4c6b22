//! The uniform package-manager API.
//!
//! [`Panam`] holds an explicitly resolved backend and runtime. Nothing is
//! detected behind the caller's back: build one with [`Panam::new`] from
//! identities you already have, or with [`Panam::detect`] once at startup.
//!
//! ```no_run
//! use panam::detection::{Backend, BackendIdentity, Runtime, RuntimeIdentity};
//! use panam::process::ExecutionOptions;
//! use panam::Panam;
//!
//! # async fn demo() -> panam::Result<()> {
//! let panam = Panam::new(
//!     BackendIdentity::new(Backend::Pnpm),
//!     RuntimeIdentity::new(Runtime::Node),
//! );
//! let handle = panam.add(["left-pad"], &ExecutionOptions::default()).await?;
//! handle.result().await.into_result()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::detection::{
    BackendIdentity, PackageManagerDetector, RuntimeDetector, RuntimeIdentity,
};
use crate::error::Result;
use crate::process::{
    self, resolve_executable, CommandLine, ExecutionOptions, ProcessExecutor, ProcessHandle,
};
use crate::translate::{jsr::is_jsr, translate, JsrVerb, Plan, RawArgs, Verb};

/// Command lines ready to run for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedCall {
    Single(CommandLine),
    /// Run `primary`; on failure run `fallback`, whose outcome is final.
    Fallback {
        primary: CommandLine,
        fallback: CommandLine,
    },
}

impl PreparedCall {
    fn from_plan(program: &str, plan: Plan) -> Self {
        match plan {
            Plan::Single(argv) => Self::Single(CommandLine::new(program, argv)),
            Plan::Fallback { primary, fallback } => Self::Fallback {
                primary: CommandLine::new(program, primary),
                fallback: CommandLine::new(program, fallback),
            },
        }
    }

    /// Every command line this call may run, in order.
    pub fn command_lines(&self) -> Vec<&CommandLine> {
        match self {
            Self::Single(line) => vec![line],
            Self::Fallback { primary, fallback } => vec![primary, fallback],
        }
    }
}

impl fmt::Display for PreparedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(line) => write!(f, "{}", line),
            Self::Fallback { primary, fallback } => write!(f, "{} || {}", primary, fallback),
        }
    }
}

/// A resolved backend and runtime, exposing the uniform verbs.
#[derive(Debug, Clone, Default)]
pub struct Panam {
    backend: BackendIdentity,
    runtime: RuntimeIdentity,
    executor: ProcessExecutor,
}

impl Panam {
    pub fn new(backend: BackendIdentity, runtime: RuntimeIdentity) -> Self {
        Self {
            backend,
            runtime,
            executor: ProcessExecutor::new(),
        }
    }

    /// Detect the backend and runtime of `project_root` from the process
    /// environment and project files.
    pub fn detect(project_root: &Path) -> Self {
        let backend = PackageManagerDetector::detect(project_root).identity;
        let runtime = RuntimeDetector::detect(project_root).identity;
        Self::new(backend, runtime)
    }

    /// Replace the executor, e.g. to enable the `--version` pre-check.
    pub fn with_executor(mut self, executor: ProcessExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn backend(&self) -> &BackendIdentity {
        &self.backend
    }

    pub fn runtime(&self) -> &RuntimeIdentity {
        &self.runtime
    }

    /// The backend's name.
    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    /// Absolute path of the backend executable.
    pub fn realname(&self, options: &ExecutionOptions) -> Result<PathBuf> {
        resolve_executable(self.name(), options)
    }

    /// The backend's `--version` output.
    pub async fn version(&self, options: &ExecutionOptions) -> Result<String> {
        process::tool_version(self.name(), options).await
    }

    /// The backend's `--help` output.
    pub async fn help(&self, options: &ExecutionOptions) -> Result<String> {
        process::tool_help(self.name(), options).await
    }

    pub async fn is_installed(&self, options: &ExecutionOptions) -> bool {
        process::is_installed(self.name(), options).await
    }

    /// Work out what `verb` would run, without running it.
    ///
    /// `run` prefers a file: when `<working directory>/<first token>` exists
    /// it is executed with the runtime instead of the backend's script runner.
    pub fn prepare(
        &self,
        verb: Verb,
        args: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<PreparedCall> {
        let tokens = args.into().tokens();

        if verb == Verb::Run {
            if let Some(line) = self.local_file(&tokens, options) {
                return Ok(PreparedCall::Single(line));
            }
        }

        let plan = translate(self.backend.backend, verb, tokens)?;
        Ok(PreparedCall::from_plan(self.name(), plan))
    }

    fn local_file(&self, tokens: &[String], options: &ExecutionOptions) -> Option<CommandLine> {
        let (script, rest) = tokens.split_first()?;
        if is_jsr(script) {
            return None;
        }

        let file = options.working_directory.join(script);
        if !file.is_file() {
            return None;
        }

        tracing::debug!("Running local file {} with {}", file.display(), self.runtime.name());
        let mut args = self.runtime.runtime.run_file_args(&file.to_string_lossy());
        args.extend(rest.iter().cloned());
        Some(CommandLine::new(self.runtime.name(), args))
    }

    /// Start a prepared call.
    pub async fn spawn(&self, call: PreparedCall, options: &ExecutionOptions) -> ProcessHandle {
        match call {
            PreparedCall::Single(line) => self.executor.spawn(&line, options).await,
            PreparedCall::Fallback { primary, fallback } => {
                self.executor.spawn_with_fallback(primary, fallback, options)
            }
        }
    }

    /// Translate and start `verb`.
    ///
    /// Returns `Err` only for unusable arguments; every execution problem is
    /// reported through the handle's result.
    pub async fn call(
        &self,
        verb: Verb,
        args: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        let call = self.prepare(verb, args, options)?;
        Ok(self.spawn(call, options).await)
    }

    /// A verb bound to this backend, callable without `self`.
    pub fn bind(&self, verb: Verb) -> BoundVerb {
        BoundVerb {
            panam: self.clone(),
            verb,
        }
    }

    /// Run a script file with the runtime.
    pub async fn run_file(&self, file: &str, options: &ExecutionOptions) -> ProcessHandle {
        let line = CommandLine::new(self.runtime.name(), self.runtime.runtime.run_file_args(file));
        self.executor.spawn(&line, options).await
    }

    pub async fn install(&self, options: &ExecutionOptions) -> Result<ProcessHandle> {
        self.call(Verb::Install, RawArgs::default(), options).await
    }

    pub async fn create(
        &self,
        template: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Create, template, options).await
    }

    pub async fn add(
        &self,
        packages: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Add, packages, options).await
    }

    pub async fn remove(
        &self,
        packages: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Remove, packages, options).await
    }

    /// Alias of [`Panam::remove`].
    pub async fn uninstall(
        &self,
        packages: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.remove(packages, options).await
    }

    pub async fn run(
        &self,
        script: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Run, script, options).await
    }

    pub async fn exec(
        &self,
        command: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Exec, command, options).await
    }

    pub async fn dlx(
        &self,
        binary: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Dlx, binary, options).await
    }

    pub async fn x(
        &self,
        executable: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::X, executable, options).await
    }

    /// Run one of the JSR verbs.
    pub async fn jsr(
        &self,
        verb: JsrVerb,
        args: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.call(Verb::Jsr(verb), args, options).await
    }
}

/// A verb closed over a [`Panam`].
#[derive(Debug, Clone)]
pub struct BoundVerb {
    panam: Panam,
    verb: Verb,
}

impl BoundVerb {
    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub async fn call(
        &self,
        args: impl Into<RawArgs>,
        options: &ExecutionOptions,
    ) -> Result<ProcessHandle> {
        self.panam.call(self.verb, args, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Backend, Runtime};
    use crate::error::PanamError;
    use crate::process::ProcessResult;
    use std::fs;
    use tempfile::TempDir;

    fn panam(backend: Backend, runtime: Runtime) -> Panam {
        Panam::new(BackendIdentity::new(backend), RuntimeIdentity::new(runtime))
    }

    #[test]
    fn prepares_backend_command_lines() {
        let temp = TempDir::new().unwrap();
        let options = ExecutionOptions::in_dir(temp.path());

        let call = panam(Backend::Npm, Runtime::Node)
            .prepare(Verb::Add, ["left-pad"], &options)
            .unwrap();
        assert_eq!(call.to_string(), "npm install left-pad");
    }

    #[test]
    fn run_prefers_local_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.ts"), "console.log(1)").unwrap();
        let options = ExecutionOptions::in_dir(temp.path());

        let call = panam(Backend::Npm, Runtime::Deno)
            .prepare(Verb::Run, "main.ts --watch", &options)
            .unwrap();
        let file = temp.path().join("main.ts").to_string_lossy().to_string();
        assert_eq!(
            call,
            PreparedCall::Single(CommandLine::new(
                "deno",
                vec!["run".to_string(), "-A".to_string(), file, "--watch".to_string()]
            ))
        );
    }

    #[test]
    fn run_uses_script_runner_without_file() {
        let temp = TempDir::new().unwrap();
        let options = ExecutionOptions::in_dir(temp.path());

        let call = panam(Backend::Pnpm, Runtime::Node)
            .prepare(Verb::Run, "build", &options)
            .unwrap();
        assert_eq!(call.to_string(), "pnpm build");
    }

    #[test]
    fn directories_are_not_local_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("build")).unwrap();
        let options = ExecutionOptions::in_dir(temp.path());

        let call = panam(Backend::Bun, Runtime::Bun)
            .prepare(Verb::Run, "build", &options)
            .unwrap();
        assert_eq!(call.to_string(), "bun run build");
    }

    #[test]
    fn fallback_calls_display_both_steps() {
        let temp = TempDir::new().unwrap();
        let options = ExecutionOptions::in_dir(temp.path());

        let call = panam(Backend::Yarn, Runtime::Node)
            .prepare(Verb::X, "cowsay hi", &options)
            .unwrap();
        assert_eq!(call.to_string(), "yarn exec cowsay hi || yarn dlx cowsay hi");
        assert_eq!(call.command_lines().len(), 2);
    }

    #[tokio::test]
    async fn translation_errors_are_returned_before_spawning() {
        let err = panam(Backend::Npm, Runtime::Node)
            .add(Vec::<String>::new(), &ExecutionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PanamError::MissingArgument { .. }));
    }

    #[tokio::test]
    async fn missing_backend_is_a_failure_result() {
        let empty = TempDir::new().unwrap();
        let options = ExecutionOptions::in_dir(empty.path())
            .with_env("PATH", empty.path().to_string_lossy());

        let handle = panam(Backend::Pnpm, Runtime::Node)
            .install(&options)
            .await
            .unwrap();
        match handle.result().await {
            ProcessResult::Failure(PanamError::ExecutableNotFound { program }) => {
                assert_eq!(program, "pnpm");
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bound_verbs_keep_their_backend() {
        let temp = TempDir::new().unwrap();
        let options = ExecutionOptions::in_dir(temp.path());
        let remove = panam(Backend::Npm, Runtime::Node).bind(Verb::Remove);

        assert_eq!(remove.verb(), Verb::Remove);
        assert!(remove.call(Vec::<String>::new(), &options).await.is_err());
    }
}
