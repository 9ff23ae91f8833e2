//! core
//!
//! Domain types for Kiln: the configuration schema, centralized path
//! routing, and the per-component run context.
//!
//! Nothing in this layer spawns processes or mutates the filesystem beyond
//! reading the configuration file; all side effects live in [`crate::engine`].

pub mod config;
pub mod context;
pub mod paths;

pub use config::{ComponentConfig, Config, ConfigError, Environment};
pub use context::{ImportArgs, Overrides, RunContext};
pub use paths::Layout;
