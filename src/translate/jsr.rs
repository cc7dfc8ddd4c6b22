//! JSR registry support.
//!
//! Deno understands `jsr:` specifiers natively. Every other backend reaches
//! the registry through the `jsr` CLI, launched with its own dlx mechanism.

use crate::detection::Backend;

use super::JsrVerb;

/// Specifier prefix of the JSR registry.
pub const JSR_PREFIX: &str = "jsr:";

/// Whether a specifier targets JSR.
pub fn is_jsr(module: &str) -> bool {
    module.starts_with(JSR_PREFIX)
}

/// Add the `jsr:` prefix unless it is already there.
pub fn to_jsr(module: &str) -> String {
    if is_jsr(module) {
        module.to_string()
    } else {
        format!("{}{}", JSR_PREFIX, module)
    }
}

/// Remove one leading `jsr:` prefix.
pub fn un_jsr(module: &str) -> &str {
    module.strip_prefix(JSR_PREFIX).unwrap_or(module)
}

/// The argv for a JSR verb on `backend`.
pub fn jsr_argv(backend: Backend, verb: JsrVerb, args: &[String]) -> Vec<String> {
    if backend == Backend::Deno {
        let mut argv = match verb {
            JsrVerb::Add => words(&["add"]),
            JsrVerb::Remove => words(&["uninstall"]),
            JsrVerb::Run | JsrVerb::Exec => words(&["run", "-A"]),
            JsrVerb::Dlx | JsrVerb::X => words(&["run", "-A", "-r"]),
        };
        argv.extend(args.iter().map(|arg| to_jsr(arg)));
        return argv;
    }

    let launcher = if backend.has_dlx() { "dlx" } else { "x" };
    let subcommand = match verb {
        JsrVerb::Add => "add",
        JsrVerb::Remove => "remove",
        JsrVerb::Run | JsrVerb::Exec | JsrVerb::Dlx | JsrVerb::X => "run",
    };

    let mut argv = words(&[launcher, "jsr", subcommand]);
    argv.extend(args.iter().map(|arg| un_jsr(arg).to_string()));
    argv
}

pub(crate) fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
