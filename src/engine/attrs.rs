//! engine::attrs
//!
//! Attribute resolvers: the mapping from a declared option or argument name
//! to the values it contributes to the command line.
//!
//! # Contract
//!
//! Each resolver is a pure function of the [`RunContext`] (plus captured
//! process-environment overrides and variable-file existence on disk). It
//! returns an ordered list of string values; an empty list means the option
//! is omitted entirely.
//!
//! # Registry
//!
//! The registry is a static dispatch table. Every name that appears in the
//! command table must be registered here; resolving an unregistered name is
//! a programming error in the table, not a user error, and panics.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::context::RunContext;

/// Errors from attribute resolution.
#[derive(Debug, Error)]
pub enum AttrError {
    /// A configuration lookup failed (e.g., undeclared environment).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The command requires a context field that was not provided.
    #[error("the '{command}' command requires a {field}")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },
}

type ResolveFn = fn(&RunContext) -> Result<Vec<String>, AttrError>;

/// The resolver registry. Order is irrelevant; the command table decides
/// option order.
const RESOLVERS: &[(&str, ResolveFn)] = &[
    ("backend", backend),
    ("backend-config", backend_config),
    ("var-file", var_file),
    ("state", state),
    ("plugin-dir", plugin_dir),
    ("get-plugins", get_plugins),
    ("check-variables", check_variables),
    ("address", address),
    ("id", id),
];

/// Whether a resolver is registered for `name`.
pub fn registered(name: &str) -> bool {
    RESOLVERS.iter().any(|(n, _)| *n == name)
}

/// Resolve the values for a declared option or argument name.
///
/// # Panics
///
/// Panics if `name` has no registered resolver. The command table is static
/// data; an unregistered name there is a bug, and failing fast beats
/// silently dropping an option from a `terraform` invocation.
pub fn resolve(name: &str, ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let (_, f) = RESOLVERS
        .iter()
        .find(|(n, _)| *n == name)
        .unwrap_or_else(|| panic!("no resolver registered for attribute '{}'", name));

    f(ctx)
}

/// `-backend=`: true unless the remote backend is disabled by override.
fn backend(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let value = if ctx.overrides.no_remote {
        "false"
    } else {
        "true"
    };
    Ok(vec![value.to_string()])
}

/// `-backend-config=`: bucket, profile, and state key for the run's
/// environment. Fails if the environment is not declared.
fn backend_config(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let env = ctx.config.environment(ctx.environment)?;
    let key = format!(
        "{}/{}/{}.tfstate",
        ctx.environment, ctx.project, ctx.component
    );

    Ok(vec![
        format!("bucket={}", env.states_bucket),
        format!("profile={}", env.aws_profile),
        format!("key={}", key),
    ])
}

/// `-var-file=`: the shared file then the component file, each included only
/// if it exists on disk. May be empty.
fn var_file(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let mut values = Vec::new();

    let shared = ctx.layout.shared_vars_file(ctx.environment, ctx.project);
    if shared.exists() {
        values.push(shared.display().to_string());
    }

    let stem = ctx.component_config.variables_stem(ctx.component);
    let own = ctx
        .layout
        .component_vars_file(ctx.environment, ctx.project, stem);
    if own.exists() {
        values.push(own.display().to_string());
    }

    Ok(values)
}

/// `-state=`: the deterministic cached state file path for the triple.
fn state(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let path = ctx
        .layout
        .state_file(ctx.environment, ctx.project, ctx.component);
    Ok(vec![path.display().to_string()])
}

/// `-plugin-dir=`: the local plugin cache.
fn plugin_dir(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    Ok(vec![ctx.layout.plugin_cache_dir().display().to_string()])
}

/// `-get-plugins=`: always false; plugins are pre-installed out of band.
fn get_plugins(_ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    Ok(vec!["false".to_string()])
}

/// `-check-variables=`: true unless the component opts out.
fn check_variables(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    let value = if ctx.component_config.check_variables() {
        "true"
    } else {
        "false"
    };
    Ok(vec![value.to_string()])
}

/// The resource address positional for `import`.
fn address(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    ctx.import
        .as_ref()
        .map(|i| vec![i.address.clone()])
        .ok_or(AttrError::MissingField {
            command: "import",
            field: "resource address",
        })
}

/// The resource id positional for `import`.
fn id(ctx: &RunContext) -> Result<Vec<String>, AttrError> {
    ctx.import
        .as_ref()
        .map(|i| vec![i.id.clone()])
        .ok_or(AttrError::MissingField {
            command: "import",
            field: "resource id",
        })
}
