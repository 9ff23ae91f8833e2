//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler validates its command-specific arguments and delegates to
//! the engine. Handlers never touch the state cache or spawn processes
//! directly; all of that flows through [`crate::engine::runner`].

mod listing;
mod tool;

pub use listing::{components, projects};
pub use tool::tool_command;

use anyhow::Result;

use crate::core::config::Config;
use crate::core::context::ImportArgs;
use crate::core::paths::Layout;
use crate::engine::exec::CancelToken;
use crate::ui::output::Verbosity;

use super::args::Command;

/// Dispatch a parsed command.
pub fn dispatch(
    command: Command,
    config: &Config,
    layout: &Layout,
    verbosity: Verbosity,
    cancel: &CancelToken,
) -> Result<()> {
    match command {
        Command::Projects => {
            projects(config);
            Ok(())
        }

        Command::Components {
            project,
            component_type,
        } => {
            components(config, &project, &component_type)?;
            Ok(())
        }

        Command::Plan(sel) => tool_command("plan", &sel, None, config, layout, verbosity, cancel),
        Command::Apply(sel) => tool_command("apply", &sel, None, config, layout, verbosity, cancel),
        Command::Destroy(sel) => {
            tool_command("destroy", &sel, None, config, layout, verbosity, cancel)
        }
        Command::Refresh(sel) => {
            tool_command("refresh", &sel, None, config, layout, verbosity, cancel)
        }
        Command::Validate(sel) => {
            tool_command("validate", &sel, None, config, layout, verbosity, cancel)
        }

        Command::Import {
            project,
            component,
            address,
            id,
            environment,
            tool_args,
        } => {
            let sel = super::args::Selection {
                project,
                components: vec![component],
                exclude: Vec::new(),
                environment,
                tool_args,
            };
            let import = ImportArgs { address, id };
            tool_command("import", &sel, Some(import), config, layout, verbosity, cancel)
        }

        Command::State {
            subcommand,
            selection,
        } => {
            let command = format!("state {}", subcommand.as_str());
            tool_command(&command, &selection, None, config, layout, verbosity, cancel)
        }
    }
}
