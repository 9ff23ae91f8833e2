//! engine::command
//!
//! The command table and the argument-vector builder.
//!
//! # Command Table
//!
//! Each top-level verb declares a fixed, ordered list of option names and a
//! fixed, ordered list of positional-argument names. The table is the
//! contract between Kiln and Terraform's CLI grammar; the resolvers in
//! [`crate::engine::attrs`] supply the values.
//!
//! # Invocation Shape
//!
//! ```text
//! terraform <verb> [<subcommand>...] [-option=value]... [passthrough]... [positional]...
//! ```
//!
//! Options must precede positional arguments, and pass-through arguments sit
//! between the two so they can never be mistaken for option values.

use crate::core::context::RunContext;

use super::attrs::{self, AttrError};

/// The external tool driven by Kiln.
pub const TOOL: &str = "terraform";

/// The option and positional-argument names declared for one verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub verb: &'static str,
    pub options: &'static [&'static str],
    pub args: &'static [&'static str],
}

/// The full command table.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        verb: "init",
        options: &["backend", "backend-config", "plugin-dir", "get-plugins"],
        args: &[],
    },
    CommandSpec {
        verb: "get",
        options: &[],
        args: &[],
    },
    CommandSpec {
        verb: "plan",
        options: &["var-file", "state"],
        args: &[],
    },
    CommandSpec {
        verb: "apply",
        options: &["var-file", "state"],
        args: &[],
    },
    CommandSpec {
        verb: "destroy",
        options: &["var-file", "state"],
        args: &[],
    },
    CommandSpec {
        verb: "refresh",
        options: &["var-file", "state"],
        args: &[],
    },
    CommandSpec {
        verb: "import",
        options: &["var-file", "state"],
        args: &["address", "id"],
    },
    CommandSpec {
        verb: "validate",
        options: &["var-file", "check-variables"],
        args: &[],
    },
    CommandSpec {
        verb: "state",
        options: &[],
        args: &[],
    },
];

/// Look up the spec for a primary verb.
pub fn spec_for(verb: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|s| s.verb == verb)
}

/// Build the full argument vector for `command` against a run context.
///
/// `command` is a primary verb plus optional subcommand tokens (e.g.
/// `"state list"`). Options are resolved in the order the spec declares
/// them, each contributing `-<option>=<value>` per resolved value;
/// pass-through arguments follow verbatim; declared positionals come last.
///
/// # Panics
///
/// Panics on an empty command or a verb absent from the table; both are
/// programming errors in the callers, not user input.
pub fn build(command: &str, ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let mut tokens = command.split_whitespace();
    let verb = tokens
        .next()
        .unwrap_or_else(|| panic!("empty command string"));
    let spec = spec_for(verb).unwrap_or_else(|| panic!("no command spec for verb '{}'", verb));

    let mut argv = vec![TOOL.to_string(), verb.to_string()];
    argv.extend(tokens.map(str::to_string));

    for option in spec.options {
        for value in attrs::resolve(option, ctx)? {
            argv.push(format!("-{}={}", option, value));
        }
    }

    argv.extend(ctx.tool_args.iter().cloned());

    for arg in spec.args {
        argv.extend(attrs::resolve(arg, ctx)?);
    }

    Ok(argv)
}
