//! core::context
//!
//! The per-component run context.
//!
//! A [`RunContext`] is assembled by the runner for every (component, command)
//! pair and handed to the attribute resolvers and the command builder. It is
//! immutable for the duration of the component and discarded afterwards.

use std::env;

use super::config::{ComponentConfig, Config};
use super::paths::Layout;
use crate::ui::output::Verbosity;

/// Environment variable forcing a cold bootstrap (`terraform init`).
pub const FORCE_INIT_ENV: &str = "KILN_FORCE_INIT";

/// Environment variable disabling the remote backend.
pub const NO_REMOTE_ENV: &str = "KILN_NO_REMOTE";

/// Process-environment overrides, read once per invocation.
///
/// Captured eagerly so resolver behavior is a function of the context alone,
/// which keeps tests free of process-global environment mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    /// Force `init` even when cached state looks complete.
    pub force_init: bool,

    /// Disable the remote backend (`-backend=false`).
    pub no_remote: bool,
}

impl Overrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self {
            force_init: flag_set(FORCE_INIT_ENV),
            no_remote: flag_set(NO_REMOTE_ENV),
        }
    }
}

fn flag_set(name: &str) -> bool {
    env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// Extra fields carried by the `import` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportArgs {
    /// Terraform resource address (e.g., `aws_instance.web`).
    pub address: String,

    /// Provider-specific resource id.
    pub id: String,
}

/// Immutable per-invocation bundle handed to the resolvers.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub project: &'a str,
    pub component: &'a str,
    pub environment: &'a str,

    /// Effective (defaulted) configuration for this component.
    pub component_config: ComponentConfig,

    pub config: &'a Config,
    pub layout: &'a Layout,
    pub verbosity: Verbosity,

    /// Pass-through arguments forwarded verbatim to the primary command.
    pub tool_args: &'a [String],

    /// Present only for the `import` command.
    pub import: Option<ImportArgs>,

    pub overrides: Overrides,
}

impl<'a> RunContext<'a> {
    /// A copy of this context with the pass-through arguments stripped.
    ///
    /// Bootstrap commands (`init`, `get`) must never see user-supplied
    /// arguments intended for the primary command.
    pub fn without_tool_args(&self) -> RunContext<'a> {
        RunContext {
            tool_args: &[],
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn without_tool_args_strips_passthrough() {
        let config = Config::default();
        let layout = Layout::with_plugin_cache(PathBuf::from("/r"), PathBuf::from("/p"));
        let args = vec!["-target=aws_instance.web".to_string()];

        let ctx = RunContext {
            project: "blog",
            component: "web",
            environment: "prod",
            component_config: ComponentConfig::default(),
            config: &config,
            layout: &layout,
            verbosity: Verbosity::Quiet,
            tool_args: &args,
            import: None,
            overrides: Overrides::default(),
        };

        let stripped = ctx.without_tool_args();
        assert!(stripped.tool_args.is_empty());
        assert_eq!(stripped.project, "blog");
    }
}
