//! engine
//!
//! Orchestrates the per-component lifecycle:
//! Select → Gate → Bootstrap → Execute → Settle.
//!
//! # Architecture
//!
//! - [`attrs`] - Attribute resolvers: option/argument name → values
//! - [`command`] - The command table and argument-vector builder
//! - [`cache`] - State checkout/commit between invocations
//! - [`exec`] - External process invocation
//! - [`runner`] - The component loop tying it all together
//!
//! # Command Lifecycle
//!
//! Every selected component follows the same lifecycle:
//!
//! ```text
//! Select → Gate → Bootstrap → Execute → Settle
//! ```
//!
//! Gate only applies to `validate` (components without variables, or marked
//! `skip`, succeed without running anything). Bootstrap is `init` when the
//! cached state is cold, `get` when it is warm. Settle always runs, on
//! success, failure, or interrupt.
//!
//! # Invariants
//!
//! - Only the cache module moves state between its at-rest and checked-out
//!   locations
//! - A checkout is always settled exactly once
//! - The first failing component stops the run; later components never start

pub mod attrs;
pub mod cache;
pub mod command;
pub mod exec;
pub mod runner;

pub use attrs::AttrError;
pub use cache::{CacheError, StateCache, StateLease};
pub use command::{build, CommandSpec, TOOL};
pub use exec::{CancelToken, ExecError};
pub use runner::{run, RunError, RunRequest};
