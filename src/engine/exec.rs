//! engine::exec
//!
//! External process invocation and the cancellation token.
//!
//! # Design
//!
//! Terraform inherits our stdio and runs in the component's template
//! directory, passed explicitly; the orchestrator never changes its own
//! working directory. There are no timeouts: the runner blocks for as long
//! as the child runs.
//!
//! Ctrl-C is delivered to the whole foreground process group, so the child
//! receives it directly and terminates on its own terms; our handler only
//! flips the [`CancelToken`], which the runner observes after the wait to
//! take the interrupt path (settle state, stop the component loop).

use std::path::Path;
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::ui::output::{self, Verbosity};

/// Errors from running the external tool.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch '{tool}': {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("command exited with {status}")]
    Failed { status: ExitStatus },

    #[error("interrupted")]
    Interrupted,
}

/// Cooperative cancellation flag shared with the Ctrl-C handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Install a Ctrl-C handler that cancels `token`.
pub fn install_interrupt_handler(token: &CancelToken) -> Result<(), ctrlc::Error> {
    let token = token.clone();
    ctrlc::set_handler(move || token.cancel())
}

/// Run the tool with the given argument vector in `workdir` and wait.
///
/// Reports [`ExecError::Interrupted`] when the cancellation token fired
/// during the wait, regardless of the child's own exit status.
pub fn run_tool(
    argv: &[String],
    workdir: &Path,
    verbosity: Verbosity,
    cancel: &CancelToken,
) -> Result<(), ExecError> {
    assert!(!argv.is_empty(), "empty argument vector");

    output::debug(format!("running: {}", argv.join(" ")), verbosity);

    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .current_dir(workdir)
        .status()
        .map_err(|source| ExecError::Spawn {
            tool: argv[0].clone(),
            source,
        })?;

    if cancel.is_cancelled() {
        return Err(ExecError::Interrupted);
    }

    if !status.success() {
        return Err(ExecError::Failed { status });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn successful_command_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let argv = vec!["true".to_string()];
        let result = run_tool(&argv, tmp.path(), Verbosity::Quiet, &CancelToken::new());
        assert!(result.is_ok());
    }

    #[test]
    fn failing_command_reports_status() {
        let tmp = tempfile::tempdir().unwrap();
        let argv = vec!["false".to_string()];
        let err = run_tool(&argv, tmp.path(), Verbosity::Quiet, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, ExecError::Failed { .. }));
    }

    #[test]
    fn missing_binary_reports_spawn_error() {
        let tmp = tempfile::tempdir().unwrap();
        let argv = vec!["kiln-test-no-such-binary".to_string()];
        let err = run_tool(&argv, tmp.path(), Verbosity::Quiet, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn cancelled_token_overrides_exit_status() {
        let tmp = tempfile::tempdir().unwrap();
        let token = CancelToken::new();
        token.cancel();
        let argv = vec!["true".to_string()];
        let err = run_tool(&argv, tmp.path(), Verbosity::Quiet, &token).unwrap_err();
        assert!(matches!(err, ExecError::Interrupted));
    }
}
