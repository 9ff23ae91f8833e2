//! core::paths
//!
//! Centralized path routing for Kiln's on-disk layout.
//!
//! # Storage Layout
//!
//! Everything is resolved relative to a single root (by default the current
//! working directory):
//!
//! - `projects/<project>/<alias>/` - Terraform templates per component
//! - `variables/<env>/<project>/{shared,<stem>}.tfvars` - optional var files
//! - `states/<env>/<project>/<component>/` - persistent state cache
//!
//! The plugin cache lives outside the root, under `~/.kiln/plugins` by
//! default, overridable with `$KILN_PLUGIN_CACHE`.
//!
//! **Hard rule:** no code outside this module computes these paths by hand,
//! and nothing ever changes the process working directory. Working
//! directories are explicit paths passed down the call chain.
//!
//! # Example
//!
//! ```
//! use kiln::core::paths::Layout;
//! use std::path::PathBuf;
//!
//! let layout = Layout::with_plugin_cache(
//!     PathBuf::from("/deploy"),
//!     PathBuf::from("/home/me/.kiln/plugins"),
//! );
//!
//! assert_eq!(
//!     layout.state_dir("prod", "blog", "web"),
//!     PathBuf::from("/deploy/states/prod/blog/web")
//! );
//! ```

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the plugin cache directory.
pub const PLUGIN_CACHE_ENV: &str = "KILN_PLUGIN_CACHE";

/// Centralized path routing.
///
/// # Invariants
///
/// - All layout paths derive from `root`; the plugin cache is the only
///   location outside it
/// - The state directory for a triple is unique and deterministic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    plugin_cache: PathBuf,
}

impl Layout {
    /// Create a layout rooted at `root`, resolving the plugin cache from
    /// `$KILN_PLUGIN_CACHE`, then `~/.kiln/plugins`.
    pub fn new(root: PathBuf) -> Self {
        let plugin_cache = env::var_os(PLUGIN_CACHE_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".kiln").join("plugins")))
            .unwrap_or_else(|| root.join(".kiln-plugins"));

        Self { root, plugin_cache }
    }

    /// Create a layout with an explicit plugin cache location.
    pub fn with_plugin_cache(root: PathBuf, plugin_cache: PathBuf) -> Self {
        Self { root, plugin_cache }
    }

    /// The layout root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/projects`
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// `<root>/states`
    pub fn states_dir(&self) -> PathBuf {
        self.root.join("states")
    }

    /// `<root>/variables`
    pub fn vars_dir(&self) -> PathBuf {
        self.root.join("variables")
    }

    /// The template directory for a component, through its alias:
    /// `<root>/projects/<project>/<alias>`.
    pub fn component_dir(&self, project: &str, alias: &str) -> PathBuf {
        self.projects_dir().join(project).join(alias)
    }

    /// The persistent state directory for a (environment, project, component)
    /// triple: `<root>/states/<env>/<project>/<component>`.
    pub fn state_dir(&self, environment: &str, project: &str, component: &str) -> PathBuf {
        self.states_dir()
            .join(environment)
            .join(project)
            .join(component)
    }

    /// The cached state file inside [`Layout::state_dir`].
    pub fn state_file(&self, environment: &str, project: &str, component: &str) -> PathBuf {
        self.state_dir(environment, project, component)
            .join("terraform.tfstate")
    }

    /// The shared variables file for an (environment, project) pair.
    pub fn shared_vars_file(&self, environment: &str, project: &str) -> PathBuf {
        self.vars_dir()
            .join(environment)
            .join(project)
            .join("shared.tfvars")
    }

    /// The component-specific variables file, named by the variables stem.
    pub fn component_vars_file(&self, environment: &str, project: &str, stem: &str) -> PathBuf {
        self.vars_dir()
            .join(environment)
            .join(project)
            .join(format!("{}.tfvars", stem))
    }

    /// The local plugin cache directory.
    ///
    /// Plugins are installed there out of band; `terraform init` is pointed
    /// at it with `-plugin-dir` and never fetches anything itself.
    pub fn plugin_cache_dir(&self) -> &Path {
        &self.plugin_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::with_plugin_cache(PathBuf::from("/deploy"), PathBuf::from("/plugins"))
    }

    #[test]
    fn top_level_dirs() {
        let l = layout();
        assert_eq!(l.projects_dir(), PathBuf::from("/deploy/projects"));
        assert_eq!(l.states_dir(), PathBuf::from("/deploy/states"));
        assert_eq!(l.vars_dir(), PathBuf::from("/deploy/variables"));
    }

    #[test]
    fn component_dir_uses_alias() {
        assert_eq!(
            layout().component_dir("blog", "generic-web"),
            PathBuf::from("/deploy/projects/blog/generic-web")
        );
    }

    #[test]
    fn state_dir_is_keyed_by_triple() {
        assert_eq!(
            layout().state_dir("prod", "blog", "web"),
            PathBuf::from("/deploy/states/prod/blog/web")
        );
    }

    #[test]
    fn state_file_lives_in_state_dir() {
        assert_eq!(
            layout().state_file("prod", "blog", "web"),
            PathBuf::from("/deploy/states/prod/blog/web/terraform.tfstate")
        );
    }

    #[test]
    fn vars_files() {
        let l = layout();
        assert_eq!(
            l.shared_vars_file("prod", "blog"),
            PathBuf::from("/deploy/variables/prod/blog/shared.tfvars")
        );
        assert_eq!(
            l.component_vars_file("prod", "blog", "web-vars"),
            PathBuf::from("/deploy/variables/prod/blog/web-vars.tfvars")
        );
    }

    #[test]
    fn explicit_plugin_cache_wins() {
        assert_eq!(layout().plugin_cache_dir(), Path::new("/plugins"));
    }
}
