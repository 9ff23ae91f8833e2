//! Kiln - an orchestration layer for multi-project Terraform deployments
//!
//! Kiln drives the `terraform` binary across a tree of projects, components,
//! and environments described by a single YAML configuration file. For each
//! selected (project, component, environment) triple it resolves the concrete
//! `terraform` invocation and manages the cached `.terraform` working state
//! between invocations.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the engine)
//! - [`engine`] - Orchestrates the Select → Gate → Bootstrap → Execute → Settle lifecycle
//! - [`core`] - Configuration schema, path routing, and run context
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! Kiln maintains the following invariants:
//!
//! 1. Configuration references are validated before any external process runs
//! 2. Cached state is either at rest or checked out, never both, never neither
//! 3. Every checkout is settled back into the cache, on success, failure,
//!    or interrupt
//! 4. Components run strictly sequentially; one `terraform` process at a time

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
