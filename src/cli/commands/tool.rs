//! cli::commands::tool
//!
//! The shared handler for commands that drive terraform.

use anyhow::Result;

use crate::cli::args::Selection;
use crate::core::config::Config;
use crate::core::context::ImportArgs;
use crate::core::paths::Layout;
use crate::engine::exec::CancelToken;
use crate::engine::runner::{self, RunRequest};
use crate::ui::output::Verbosity;

/// Run a tool command across the selected components.
pub fn tool_command(
    command: &str,
    selection: &Selection,
    import: Option<ImportArgs>,
    config: &Config,
    layout: &Layout,
    verbosity: Verbosity,
    cancel: &CancelToken,
) -> Result<()> {
    let request = RunRequest {
        command,
        project: &selection.project,
        components: &selection.components,
        exclude: &selection.exclude,
        environment: selection.environment.as_deref(),
        tool_args: &selection.tool_args,
        import,
    };

    runner::run(&request, config, layout, verbosity, cancel)?;
    Ok(())
}
