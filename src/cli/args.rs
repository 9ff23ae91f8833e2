//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <file>`: Configuration file (default: `kiln.yml`)
//! - `-v` / `--verbose`: Show resolved commands and cache traffic
//! - `-q` / `--quiet`: Errors only
//!
//! # Pass-Through Arguments
//!
//! Tool commands accept extra arguments after a `--` separator; they are
//! forwarded verbatim to the primary `terraform` command and never to the
//! bootstrap phase:
//!
//! ```text
//! kiln plan blog -c web -- -no-color -target=aws_instance.web
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Kiln - orchestrate Terraform across projects, components, and environments
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "kiln.yml", value_name = "FILE")]
    pub config: PathBuf,

    /// Show resolved commands and state-cache traffic
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Component selection and pass-through arguments shared by tool commands.
#[derive(Args, Debug)]
pub struct Selection {
    /// Project to operate on
    pub project: String,

    /// Component(s) to include; all configured components when omitted
    #[arg(short = 'c', long = "component", value_name = "COMPONENT")]
    pub components: Vec<String>,

    /// Component(s) to exclude
    #[arg(short = 'x', long = "exclude", value_name = "COMPONENT")]
    pub exclude: Vec<String>,

    /// Target environment; the first configured one when omitted
    #[arg(short = 'e', long = "environment", value_name = "ENV")]
    pub environment: Option<String>,

    /// Extra arguments forwarded verbatim to terraform (after `--`)
    #[arg(last = true, allow_hyphen_values = true, value_name = "TF_ARGS")]
    pub tool_args: Vec<String>,
}

/// Subcommands of `terraform state` Kiln forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateSub {
    List,
    Mv,
    Pull,
    Push,
    Rm,
    Show,
}

impl StateSub {
    /// The subcommand token as terraform spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateSub::List => "list",
            StateSub::Mv => "mv",
            StateSub::Pull => "pull",
            StateSub::Push => "push",
            StateSub::Rm => "rm",
            StateSub::Show => "show",
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display available projects in your configuration
    Projects,

    /// Display available components for a project
    Components {
        /// Project to inspect
        project: String,

        /// Only list components using these template aliases
        #[arg(short = 't', long = "type", value_name = "ALIAS")]
        component_type: Vec<String>,
    },

    /// Run `terraform plan` across the selected components
    Plan(Selection),

    /// Run `terraform apply` across the selected components
    Apply(Selection),

    /// Run `terraform destroy` across the selected components
    Destroy(Selection),

    /// Run `terraform refresh` across the selected components
    Refresh(Selection),

    /// Run `terraform validate` across the selected components
    Validate(Selection),

    /// Run `terraform import` for a single component
    Import {
        /// Project the component belongs to
        project: String,

        /// Component to import into
        component: String,

        /// Terraform resource address
        address: String,

        /// Provider-specific resource id
        id: String,

        /// Target environment; the first configured one when omitted
        #[arg(short = 'e', long = "environment", value_name = "ENV")]
        environment: Option<String>,

        /// Extra arguments forwarded verbatim to terraform (after `--`)
        #[arg(last = true, allow_hyphen_values = true, value_name = "TF_ARGS")]
        tool_args: Vec<String>,
    },

    /// Run a `terraform state` subcommand across the selected components
    State {
        /// State subcommand to run
        #[arg(value_enum)]
        subcommand: StateSub,

        #[command(flatten)]
        selection: Selection,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_selection_flags() {
        let cli = Cli::parse_from([
            "kiln", "plan", "blog", "-c", "web", "-x", "network", "-e", "prod",
        ]);
        match cli.command {
            Command::Plan(sel) => {
                assert_eq!(sel.project, "blog");
                assert_eq!(sel.components, ["web"]);
                assert_eq!(sel.exclude, ["network"]);
                assert_eq!(sel.environment.as_deref(), Some("prod"));
            }
            other => panic!("parsed wrong command: {:?}", other),
        }
    }

    #[test]
    fn trailing_args_keep_hyphens() {
        let cli = Cli::parse_from(["kiln", "apply", "blog", "--", "-no-color", "-target=a.b"]);
        match cli.command {
            Command::Apply(sel) => {
                assert_eq!(sel.tool_args, ["-no-color", "-target=a.b"]);
            }
            other => panic!("parsed wrong command: {:?}", other),
        }
    }

    #[test]
    fn state_takes_subcommand_then_project() {
        let cli = Cli::parse_from(["kiln", "state", "list", "blog"]);
        match cli.command {
            Command::State {
                subcommand,
                selection,
            } => {
                assert_eq!(subcommand, StateSub::List);
                assert_eq!(selection.project, "blog");
            }
            other => panic!("parsed wrong command: {:?}", other),
        }
    }

    #[test]
    fn import_takes_four_positionals() {
        let cli = Cli::parse_from(["kiln", "import", "blog", "web", "aws_instance.web", "i-1"]);
        match cli.command {
            Command::Import {
                project,
                component,
                address,
                id,
                ..
            } => {
                assert_eq!(project, "blog");
                assert_eq!(component, "web");
                assert_eq!(address, "aws_instance.web");
                assert_eq!(id, "i-1");
            }
            other => panic!("parsed wrong command: {:?}", other),
        }
    }
}
