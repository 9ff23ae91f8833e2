//! cli::commands::listing
//!
//! Read-only listing commands: `projects` and `components`.

use crate::core::config::{Config, ConfigError};

/// Display the projects declared in the configuration.
pub fn projects(config: &Config) {
    println!("Available projects:");
    for name in config.projects.keys() {
        println!("- {}", name);
    }
}

/// Display the components of a project, optionally filtered by template
/// alias.
pub fn components(config: &Config, project: &str, types: &[String]) -> Result<(), ConfigError> {
    let entries = config.project(project)?;

    if types.is_empty() {
        println!("Available components for project \"{}\":", project);
    } else {
        println!(
            "Available components for project \"{}\" of type(s) \"{}\":",
            project,
            types.join(", ")
        );
    }

    for (name, entry) in entries {
        let cc = entry.clone().unwrap_or_default();
        let alias = cc.template_alias(name);
        if types.is_empty() || types.iter().any(|t| t == alias) {
            println!("- {}", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_rejects_unknown_project() {
        let config = Config::default();
        assert!(matches!(
            components(&config, "nope", &[]),
            Err(ConfigError::UnknownProject(_))
        ));
    }
}
