//! engine::runner
//!
//! The component loop: Select → Gate → Bootstrap → Execute → Settle.
//!
//! # Lifecycle
//!
//! 1. **Select**: requested components (or all configured) minus exclusions,
//!    every name validated against the configuration before anything runs
//! 2. **Gate** (`validate` only): components without a variables file, or
//!    marked `skip`, succeed without a tool invocation
//! 3. **Bootstrap**: `init` when the cached state is cold, `get` when warm;
//!    pass-through arguments never reach this phase
//! 4. **Execute**: the fully resolved primary command
//! 5. **Settle**: the state lease commits, whatever Execute did
//!
//! Components run strictly sequentially, in selection order. The first
//! bootstrap or execution failure stops the run; the settle still happens
//! first, so no failure path loses state. An interrupt takes the same
//! settle path and surfaces as [`RunError::Interrupted`].

use thiserror::Error;

use crate::core::config::{Config, ConfigError};
use crate::core::context::{ImportArgs, Overrides, RunContext};
use crate::core::paths::Layout;
use crate::ui::output::{self, Verbosity};

use super::attrs::AttrError;
use super::cache::{CacheError, StateCache, StateLease};
use super::command;
use super::exec::{self, CancelToken, ExecError};

/// Errors from a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Attr(#[from] AttrError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The init/get phase failed; never retried.
    #[error("bootstrap failed for {project}/{component}: {source}")]
    Bootstrap {
        project: String,
        component: String,
        source: ExecError,
    },

    /// The primary command failed.
    #[error("command failed for {project}/{component}: {source}")]
    Execution {
        project: String,
        component: String,
        source: ExecError,
    },

    /// The run was cancelled from outside (Ctrl-C).
    #[error("interrupted")]
    Interrupted,
}

/// One orchestrated run: a command across the selected components.
#[derive(Debug)]
pub struct RunRequest<'a> {
    /// Primary verb plus optional subcommand tokens (e.g. `"state list"`).
    pub command: &'a str,
    pub project: &'a str,

    /// Explicitly requested components; empty means all configured.
    pub components: &'a [String],
    pub exclude: &'a [String],

    /// Environment name; `None` selects the first configured environment.
    pub environment: Option<&'a str>,

    /// Arguments forwarded verbatim to the primary command.
    pub tool_args: &'a [String],

    /// Present only for `import`.
    pub import: Option<ImportArgs>,
}

/// Run a command across the selected components of a project.
pub fn run(
    req: &RunRequest,
    config: &Config,
    layout: &Layout,
    verbosity: Verbosity,
    cancel: &CancelToken,
) -> Result<(), RunError> {
    let components = select_components(req, config)?;

    let environment: &str = match req.environment {
        Some(name) => config.environment(name)?.name.as_str(),
        None => config.default_environment()?.name.as_str(),
    };

    let overrides = Overrides::from_env();

    for component in &components {
        if cancel.is_cancelled() {
            return Err(RunError::Interrupted);
        }

        let component_config = config.component_config(req.project, component)?;
        let ctx = RunContext {
            project: req.project,
            component,
            environment,
            component_config,
            config,
            layout,
            verbosity,
            tool_args: req.tool_args,
            import: req.import.clone(),
            overrides,
        };

        output::component_heading(ctx.project, ctx.component, verbosity);

        if req.command == "validate" && !should_validate(&ctx) {
            output::success("OK!", verbosity);
            continue;
        }

        let argv = command::build(req.command, &ctx)?;
        run_component(&ctx, &argv, cancel)?;
    }

    Ok(())
}

/// Resolve the effective component list for a request.
///
/// Preserves request order (or configuration order when nothing was
/// requested), drops exclusions and duplicates, and validates every
/// remaining name so configuration errors surface before any process runs.
fn select_components(req: &RunRequest, config: &Config) -> Result<Vec<String>, RunError> {
    let project = config.project(req.project)?;

    let requested: Vec<String> = if req.components.is_empty() {
        project.keys().cloned().collect()
    } else {
        req.components.to_vec()
    };

    let mut selected = Vec::new();
    for name in requested {
        if req.exclude.contains(&name) || selected.contains(&name) {
            continue;
        }
        config.component_config(req.project, &name)?;
        selected.push(name);
    }

    Ok(selected)
}

/// The validate gate: whether `terraform validate` should run at all.
fn should_validate(ctx: &RunContext) -> bool {
    let stem = ctx.component_config.variables_stem(ctx.component);
    let vars_file = ctx
        .layout
        .component_vars_file(ctx.environment, ctx.project, stem);

    if !vars_file.exists() {
        output::print(
            format!(
                "skipping validation: vars file '{}' not found",
                vars_file.display()
            ),
            ctx.verbosity,
        );
        return false;
    }

    if ctx.component_config.skip_validate() {
        output::print(
            "skipping validation: 'skip' set in the configuration",
            ctx.verbosity,
        );
        return false;
    }

    true
}

/// Bootstrap, execute, and settle one component.
fn run_component(ctx: &RunContext, argv: &[String], cancel: &CancelToken) -> Result<(), RunError> {
    let cache = StateCache::for_context(ctx);
    let workdir = cache.work_dir().to_path_buf();

    let bootstrap_verb = if cache.needs_bootstrap(ctx.overrides.force_init) {
        output::print(
            "state not found or init forced, initializing with 'terraform init'...",
            ctx.verbosity,
        );
        "init"
    } else {
        output::print("fetching modules with 'terraform get'...", ctx.verbosity);
        "get"
    };

    // Bootstrap never sees the user's pass-through arguments.
    let bootstrap_argv = command::build(bootstrap_verb, &ctx.without_tool_args())?;

    let lease = cache.checkout()?;

    if let Err(source) = exec::run_tool(&bootstrap_argv, &workdir, ctx.verbosity, cancel) {
        settle_after_failure(lease);
        return Err(escalate_bootstrap(ctx, source));
    }

    match exec::run_tool(argv, &workdir, ctx.verbosity, cancel) {
        Ok(()) => {
            lease.commit()?;
            output::success("OK!", ctx.verbosity);
            Ok(())
        }
        Err(source) => {
            settle_after_failure(lease);
            Err(escalate_execution(ctx, source))
        }
    }
}

/// Settle a lease on a failure path without masking the original error.
fn settle_after_failure(lease: StateLease) {
    if let Err(e) = lease.commit() {
        output::error(e);
    }
}

fn escalate_bootstrap(ctx: &RunContext, source: ExecError) -> RunError {
    match source {
        ExecError::Interrupted => RunError::Interrupted,
        source => RunError::Bootstrap {
            project: ctx.project.to_string(),
            component: ctx.component.to_string(),
            source,
        },
    }
}

fn escalate_execution(ctx: &RunContext, source: ExecError) -> RunError {
    match source {
        ExecError::Interrupted => RunError::Interrupted,
        source => RunError::Execution {
            project: ctx.project.to_string(),
            component: ctx.component.to_string(),
            source,
        },
    }
}
