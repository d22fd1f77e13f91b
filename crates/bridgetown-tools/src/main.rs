//! Bridgetown tools - apply automations and bundled configurations to a site

use anyhow::Result;
use automation_core::tui::{ApplyArgs, ConfigureArgs};
use automation_core::{BundlerType, PackageManager, ProductConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bridgetown product configuration
#[derive(Clone)]
pub struct BridgetownConfig;

impl ProductConfig for BridgetownConfig {
    fn name(&self) -> &'static str {
        "bridgetown-tools"
    }

    fn display_name(&self) -> &'static str {
        "Bridgetown"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for applying Bridgetown automations and bundled configurations"
    }

    fn docs_url(&self) -> &'static str {
        "https://www.bridgetownrb.com/docs/automations"
    }

    fn automation_file_env(&self) -> &'static str {
        "BRIDGETOWN_AUTOMATION_FILE"
    }
}

#[derive(Parser, Debug)]
#[command(name = "bridgetown-tools")]
#[command(about = "CLI for applying Bridgetown automations and bundled configurations")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply an automation script from a path or URL
    Apply(CliApplyArgs),
    /// Set up a bundled configuration in the current project
    #[command(subcommand)]
    Configure(Configuration),
}

#[derive(Parser, Debug)]
pub struct CliApplyArgs {
    /// Path or URL of the automation (defaults to bridgetown.automation.rb)
    pub location: Option<String>,

    /// Project directory to apply the automation to
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
}

impl From<CliApplyArgs> for ApplyArgs {
    fn from(args: CliApplyArgs) -> Self {
        ApplyArgs {
            location: args.location,
            directory: args.directory,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Configuration {
    /// Install Stimulus and create a controllers directory
    Stimulus(CliStimulusArgs),
}

#[derive(Parser, Debug)]
pub struct CliStimulusArgs {
    /// Bundler the project uses (detected from its config file when omitted)
    #[arg(short, long, value_enum)]
    pub bundler: Option<BundlerType>,

    /// Package manager to install with (detected from lockfiles when omitted)
    #[arg(short, long = "package-manager", value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Project directory to configure
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliStimulusArgs> for ConfigureArgs {
    fn from(args: CliStimulusArgs) -> Self {
        ConfigureArgs {
            directory: args.directory,
            bundler: args.bundler,
            package_manager: args.package_manager,
            yes: args.yes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = BridgetownConfig;

    let result = match args.command {
        Some(Command::Apply(apply_args)) => {
            automation_core::run_apply(&config, apply_args.into()).await
        }
        Some(Command::Configure(Configuration::Stimulus(stimulus_args))) => {
            automation_core::run_configure(&config, stimulus_args.into())
        }
        None => {
            // No subcommand provided, apply the project's own automation file
            automation_core::run_apply(&config, ApplyArgs::default()).await
        }
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_with_url() {
        let args = Args::parse_from([
            "bridgetown-tools",
            "apply",
            "https://github.com/bridgetownrb/bridgetown-automations",
        ]);
        match args.command {
            Some(Command::Apply(apply)) => assert_eq!(
                apply.location.as_deref(),
                Some("https://github.com/bridgetownrb/bridgetown-automations")
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_configure_stimulus() {
        let args = Args::parse_from([
            "bridgetown-tools",
            "configure",
            "stimulus",
            "--bundler",
            "esbuild",
            "--package-manager",
            "npm",
            "--yes",
        ]);
        match args.command {
            Some(Command::Configure(Configuration::Stimulus(stimulus))) => {
                assert_eq!(stimulus.bundler, Some(BundlerType::Esbuild));
                assert_eq!(stimulus.package_manager, Some(PackageManager::Npm));
                assert!(stimulus.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_automation_file_env_name() {
        assert_eq!(
            BridgetownConfig.automation_file_env(),
            "BRIDGETOWN_AUTOMATION_FILE"
        );
        assert_eq!(
            BridgetownConfig.automation_filename(),
            "bridgetown.automation.rb"
        );
    }
}
