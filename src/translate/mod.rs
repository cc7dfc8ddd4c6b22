//! Uniform verbs and their per-backend argv.
//!
//! [`translate`] is pure: it maps a backend, a [`Verb`] and its arguments to a
//! [`Plan`] without touching the filesystem or spawning anything.

pub mod jsr;

use std::fmt;
use std::str::FromStr;

use crate::detection::Backend;
use crate::error::{PanamError, Result};

use jsr::{is_jsr, jsr_argv, words};

const NPM_PREFIX: &str = "npm:";

/// Verbs that have a JSR counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsrVerb {
    Add,
    Remove,
    Run,
    Exec,
    Dlx,
    X,
}

impl JsrVerb {
    pub const ALL: [JsrVerb; 6] = [
        JsrVerb::Add,
        JsrVerb::Remove,
        JsrVerb::Run,
        JsrVerb::Exec,
        JsrVerb::Dlx,
        JsrVerb::X,
    ];

    /// The name after `jsr-` in the verb spelling.
    pub fn command(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Run => "run",
            Self::Exec => "exec",
            Self::Dlx => "dlx",
            Self::X => "x",
        }
    }
}

/// A backend-agnostic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Install,
    Create,
    Add,
    Remove,
    Run,
    Exec,
    Dlx,
    X,
    Jsr(JsrVerb),
}

impl Verb {
    /// Canonical name; JSR verbs are spelled `jsr-<verb>`.
    pub fn name(self) -> String {
        match self {
            Self::Install => "install".to_string(),
            Self::Create => "create".to_string(),
            Self::Add => "add".to_string(),
            Self::Remove => "remove".to_string(),
            Self::Run => "run".to_string(),
            Self::Exec => "exec".to_string(),
            Self::Dlx => "dlx".to_string(),
            Self::X => "x".to_string(),
            Self::Jsr(verb) => format!("jsr-{}", verb.command()),
        }
    }

    fn plain(name: &str) -> Option<Self> {
        let verb = match name {
            "install" | "i" => Self::Install,
            "create" => Self::Create,
            "add" | "use" => Self::Add,
            "remove" | "uninstall" | "rm" => Self::Remove,
            "run" | "task" => Self::Run,
            "exec" => Self::Exec,
            "dlx" => Self::Dlx,
            "x" => Self::X,
            _ => return None,
        };
        Some(verb)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Verb {
    type Err = PanamError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        let jsr_target = name
            .strip_prefix("jsr-")
            .or_else(|| name.strip_prefix("jsr:"));

        let verb = match jsr_target {
            Some(target) => match Self::plain(target) {
                Some(Self::Add) => Some(Self::Jsr(JsrVerb::Add)),
                Some(Self::Remove) => Some(Self::Jsr(JsrVerb::Remove)),
                Some(Self::Run) => Some(Self::Jsr(JsrVerb::Run)),
                Some(Self::Exec) => Some(Self::Jsr(JsrVerb::Exec)),
                Some(Self::Dlx) => Some(Self::Jsr(JsrVerb::Dlx)),
                Some(Self::X) => Some(Self::Jsr(JsrVerb::X)),
                _ => None,
            },
            None => Self::plain(&name),
        };

        verb.ok_or_else(|| PanamError::InvalidVerb {
            name: s.to_string(),
        })
    }
}

/// Arguments as received from a caller.
///
/// A single line is split on runs of whitespace with no quoting support, so
/// `commit -m "fix bug"` becomes four tokens. Pass a list to keep tokens
/// intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArgs {
    Line(String),
    List(Vec<String>),
}

impl RawArgs {
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Self::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Self::List(list) => list.clone(),
        }
    }
}

impl Default for RawArgs {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<&str> for RawArgs {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for RawArgs {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<Vec<String>> for RawArgs {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

impl From<&[&str]> for RawArgs {
    fn from(list: &[&str]) -> Self {
        Self::List(words(list))
    }
}

impl<const N: usize> From<[&str; N]> for RawArgs {
    fn from(list: [&str; N]) -> Self {
        Self::List(words(&list))
    }
}

/// What to run for one verb, as arguments to the backend executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Single(Vec<String>),
    /// Run `primary`; only if it fails, run `fallback` and report that
    /// outcome instead.
    Fallback {
        primary: Vec<String>,
        fallback: Vec<String>,
    },
}

impl Plan {
    /// The argv of the first attempt.
    pub fn primary(&self) -> &[String] {
        match self {
            Self::Single(argv) => argv,
            Self::Fallback { primary, .. } => primary,
        }
    }

    /// Every argv this plan may run, in order.
    pub fn attempts(&self) -> Vec<&[String]> {
        match self {
            Self::Single(argv) => vec![argv.as_slice()],
            Self::Fallback { primary, fallback } => vec![primary.as_slice(), fallback.as_slice()],
        }
    }
}

/// Translate a verb for `backend`.
///
/// Fails only when the arguments are unusable for the verb, e.g. `add` with
/// no packages.
pub fn translate(backend: Backend, verb: Verb, args: impl Into<RawArgs>) -> Result<Plan> {
    let tokens = args.into().tokens();
    let plan = translate_tokens(backend, verb, tokens)?;
    tracing::debug!("{} {} -> {:?}", backend, verb, plan);
    Ok(plan)
}

fn translate_tokens(backend: Backend, verb: Verb, tokens: Vec<String>) -> Result<Plan> {
    let redirect = tokens.first().is_some_and(|t| is_jsr(t));

    let argv = match verb {
        Verb::Install => prepend(&["install"], tokens),
        Verb::Create => create(backend, tokens)?,
        Verb::Add => {
            require(verb, &tokens, "at least one package")?;
            if redirect {
                jsr_argv(backend, JsrVerb::Add, &tokens)
            } else {
                add(backend, tokens)
            }
        }
        Verb::Remove => {
            require(verb, &tokens, "at least one package")?;
            if redirect {
                jsr_argv(backend, JsrVerb::Remove, &tokens)
            } else {
                let command = match backend {
                    Backend::Npm | Backend::Deno => "uninstall",
                    Backend::Cnpm | Backend::Yarn | Backend::Pnpm | Backend::Bun => "remove",
                };
                prepend(&[command], tokens)
            }
        }
        Verb::Run => {
            require(verb, &tokens, "a script name")?;
            if redirect {
                jsr_argv(backend, JsrVerb::Run, &tokens)
            } else {
                run(backend, tokens)
            }
        }
        Verb::Exec => {
            require(verb, &tokens, "a command")?;
            if redirect {
                jsr_argv(backend, JsrVerb::Exec, &tokens)
            } else {
                exec(backend, tokens)
            }
        }
        Verb::Dlx => {
            require(verb, &tokens, "a binary")?;
            if redirect {
                jsr_argv(backend, JsrVerb::Dlx, &tokens)
            } else {
                dlx(backend, tokens)
            }
        }
        Verb::X => {
            require(verb, &tokens, "an executable")?;
            if redirect {
                jsr_argv(backend, JsrVerb::Dlx, &tokens)
            } else {
                match backend {
                    Backend::Deno | Backend::Pnpm | Backend::Yarn => {
                        return Ok(Plan::Fallback {
                            primary: exec(backend, tokens.clone()),
                            fallback: dlx(backend, tokens),
                        });
                    }
                    Backend::Npm | Backend::Cnpm | Backend::Bun => prepend(&["x"], tokens),
                }
            }
        }
        Verb::Jsr(jsr_verb) => {
            require(verb, &tokens, "at least one argument")?;
            jsr_argv(backend, jsr_verb, &tokens)
        }
    };

    Ok(Plan::Single(argv))
}

fn require(verb: Verb, tokens: &[String], expected: &str) -> Result<()> {
    if tokens.is_empty() {
        return Err(PanamError::MissingArgument {
            verb: verb.name(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

fn prepend(prefix: &[&str], tokens: Vec<String>) -> Vec<String> {
    let mut argv = words(prefix);
    argv.extend(tokens);
    argv
}

// Deno has no `create`: the package is run as `npm:create-<pkg>` (or
// `npm:<scope>/create-<pkg>`). A leading literal `create` token is dropped.
fn create(backend: Backend, mut tokens: Vec<String>) -> Result<Vec<String>> {
    if backend != Backend::Deno {
        require(Verb::Create, &tokens, "a template")?;
        return Ok(prepend(&["create"], tokens));
    }

    if tokens.first().is_some_and(|t| t == "create") {
        tokens.remove(0);
    }
    require(Verb::Create, &tokens, "a template")?;

    let mut parts = tokens[0].splitn(2, '/');
    let first = parts.next().unwrap_or_default();
    let target = match parts.next().filter(|s| !s.is_empty()) {
        Some(name) => format!("npm:{}/create-{}", first, name),
        None => format!("npm:create-{}", first),
    };

    let mut argv = words(&["run", "-A"]);
    argv.push(target);
    argv.extend(tokens.into_iter().skip(1));
    Ok(argv)
}

fn add(backend: Backend, tokens: Vec<String>) -> Vec<String> {
    match backend {
        Backend::Deno => {
            let packages = tokens.into_iter().map(|pkg| {
                if pkg.starts_with(NPM_PREFIX) {
                    pkg
                } else {
                    format!("{}{}", NPM_PREFIX, pkg)
                }
            });
            prepend(&["add"], packages.collect())
        }
        Backend::Npm | Backend::Cnpm | Backend::Yarn | Backend::Pnpm | Backend::Bun => {
            let command = if backend == Backend::Npm { "install" } else { "add" };
            let packages = tokens.iter().map(|pkg| {
                pkg.strip_prefix(NPM_PREFIX)
                    .unwrap_or(pkg.as_str())
                    .to_string()
            });
            prepend(&[command], packages.collect())
        }
    }
}

fn run(backend: Backend, tokens: Vec<String>) -> Vec<String> {
    if backend.runs_scripts_bare() {
        tokens
    } else if backend == Backend::Deno {
        prepend(&["task"], tokens)
    } else {
        prepend(&["run"], tokens)
    }
}

fn exec(backend: Backend, tokens: Vec<String>) -> Vec<String> {
    if backend == Backend::Deno {
        prepend(&["run", "-A"], tokens)
    } else if backend.has_dlx() {
        prepend(&["exec"], tokens)
    } else {
        prepend(&["x"], tokens)
    }
}

fn dlx(backend: Backend, tokens: Vec<String>) -> Vec<String> {
    if backend == Backend::Deno {
        prepend(&["run", "-A", "-r"], tokens)
    } else if backend.has_dlx() {
        prepend(&["dlx"], tokens)
    } else {
        prepend(&["x"], tokens)
    }
}
