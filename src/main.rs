//! Kiln binary entry point.
//!
//! Exit codes: 0 on full success, 130 when interrupted, 1 on any other
//! failure. The run never continues past the first failing component.

use std::process;

use kiln::engine::RunError;
use kiln::ui::output;

fn main() {
    if let Err(err) = kiln::cli::run() {
        if matches!(err.downcast_ref::<RunError>(), Some(RunError::Interrupted)) {
            output::error("interrupted, state rolled back");
            process::exit(130);
        }

        output::error(&err);
        process::exit(1);
    }
}
