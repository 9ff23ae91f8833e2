//! cli
//!
//! Command-line interface layer for Kiln.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load the configuration file
//! - Delegate to command handlers
//!
//! The CLI layer is thin. All state-cache and process management flows
//! through [`crate::engine`].

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::paths::Layout;
use crate::engine::exec::{self, CancelToken};
use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);

    let config = Config::load(&cli.config)?;
    let layout = Layout::new(std::env::current_dir().context("cannot resolve working directory")?);

    // Installed before any checkout so an early Ctrl-C still takes the
    // cancellation path instead of killing the process outright.
    let cancel = CancelToken::new();
    exec::install_interrupt_handler(&cancel).context("failed to install interrupt handler")?;

    commands::dispatch(cli.command, &config, &layout, verbosity, &cancel)
}
