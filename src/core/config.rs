//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! A single YAML file describes everything Kiln orchestrates:
//!
//! ```yaml
//! environments:
//!   - name: production
//!     states_bucket: acme-tfstates
//!     aws_profile: acme-prod
//!
//! projects:
//!   blog:
//!     network:
//!     web:
//!       component: generic-web
//!       variables: web
//!       validate:
//!         skip: true
//! ```
//!
//! A component entry may be empty, in which case every field takes its
//! default: the template directory and the variables-file stem both default
//! to the component name itself.
//!
//! # Validation
//!
//! The file is deserialized strictly (`deny_unknown_fields`). Reference
//! validation - does this project/component/environment exist - happens
//! through the lookup methods on [`Config`], and always before any external
//! process is spawned.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors from configuration loading and lookups.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unknown project '{0}'")]
    UnknownProject(String),

    #[error("unknown component '{component}' in project '{project}'")]
    UnknownComponent { project: String, component: String },

    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    #[error("no environments declared in the configuration")]
    NoEnvironments,
}

/// A deployment target with its own remote-state storage credentials.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Environment {
    /// Environment name (e.g., "production").
    pub name: String,

    /// S3 bucket holding the remote states for this environment.
    pub states_bucket: String,

    /// AWS profile used to reach the states bucket.
    pub aws_profile: String,
}

/// Per-component validation settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ValidateConfig {
    /// Skip validation for this component entirely.
    pub skip: bool,

    /// Forwarded to `terraform validate -check-variables=`.
    #[serde(rename = "check-variables")]
    pub check_variables: Option<bool>,
}

/// Configuration for a single component.
///
/// All fields are optional; an absent field defaults against the component
/// name through the accessor methods.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentConfig {
    /// Template-directory alias under `projects/<project>/`.
    pub component: Option<String>,

    /// Variables-file stem under `variables/<env>/<project>/`.
    pub variables: Option<String>,

    /// Validation settings.
    pub validate: Option<ValidateConfig>,
}

impl ComponentConfig {
    /// The on-disk template directory name, defaulting to the component name.
    pub fn template_alias<'a>(&'a self, component: &'a str) -> &'a str {
        self.component.as_deref().unwrap_or(component)
    }

    /// The variables-file stem, defaulting to the component name.
    pub fn variables_stem<'a>(&'a self, component: &'a str) -> &'a str {
        self.variables.as_deref().unwrap_or(component)
    }

    /// Whether `terraform validate` should check variables (default: true).
    pub fn check_variables(&self) -> bool {
        self.validate
            .as_ref()
            .and_then(|v| v.check_variables)
            .unwrap_or(true)
    }

    /// Whether validation is skipped for this component.
    pub fn skip_validate(&self) -> bool {
        self.validate.as_ref().is_some_and(|v| v.skip)
    }
}

/// A project: an ordered map of component name to optional configuration.
pub type Project = BTreeMap<String, Option<ComponentConfig>>;

/// The root configuration document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Deployment environments, in declaration order. The first one is the
    /// default when no `-e` flag is given.
    pub environments: Vec<Environment>,

    /// Project name → components.
    pub projects: BTreeMap<String, Project>,
}

impl Config {
    /// Load and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Look up a project by name.
    pub fn project(&self, name: &str) -> Result<&Project, ConfigError> {
        self.projects
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProject(name.to_string()))
    }

    /// Look up a component within a project.
    ///
    /// Returns the effective (defaulted) component configuration.
    pub fn component_config(
        &self,
        project: &str,
        component: &str,
    ) -> Result<ComponentConfig, ConfigError> {
        let entry =
            self.project(project)?
                .get(component)
                .ok_or_else(|| ConfigError::UnknownComponent {
                    project: project.to_string(),
                    component: component.to_string(),
                })?;

        Ok(entry.clone().unwrap_or_default())
    }

    /// Look up an environment by name.
    pub fn environment(&self, name: &str) -> Result<&Environment, ConfigError> {
        self.environments
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))
    }

    /// The default environment: the first one declared.
    pub fn default_environment(&self) -> Result<&Environment, ConfigError> {
        self.environments.first().ok_or(ConfigError::NoEnvironments)
    }
}
