//! Charm-style CLI prompts using cliclack

use crate::automation::{Applier, ApplyOutcome};
use crate::dsl::ProjectActions;
use crate::product::ProductConfig;
use crate::scaffold::{configure_stimulus, BundlerChoice, BundlerType, PackageManager};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for the apply command
#[derive(Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Path or URL of the automation; the project's automation file when absent
    pub location: Option<String>,

    /// Project directory to apply the automation to
    pub directory: Option<PathBuf>,
}

/// CLI arguments for the Stimulus configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigureArgs {
    /// Project directory to configure
    pub directory: Option<PathBuf>,

    /// Bundler to generate the controllers index for
    pub bundler: Option<BundlerType>,

    /// Package manager used to install dependencies
    pub package_manager: Option<PackageManager>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Apply an automation to the project
pub async fn run_apply<C: ProductConfig>(config: &C, args: ApplyArgs) -> Result<()> {
    cliclack::intro(format!("{} automations", config.display_name()))?;

    let root = project_dir(args.directory.as_deref())?;
    let applier = Applier::from_config(config, root.clone());
    let mut actions = ProjectActions::stdout(root);

    match applier.apply(args.location.as_deref(), &mut actions).await {
        Ok(ApplyOutcome::StubCreated(path)) => {
            cliclack::outro(format!(
                "Edit {} and run apply again to run it.",
                path.display()
            ))?;
        }
        Ok(ApplyOutcome::Applied { source, statements }) => {
            cliclack::outro(format!(
                "Applied {} ({} statement(s))",
                source, statements
            ))?;
        }
        Err(e) => {
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Automation stopped. Changes made before the error were kept.");
        }
    }

    Ok(())
}

/// Add Stimulus to the project
pub fn run_configure<C: ProductConfig>(config: &C, args: ConfigureArgs) -> Result<()> {
    cliclack::intro(format!("{} · Stimulus", config.display_name()))?;

    let root = project_dir(args.directory.as_deref())?;
    let bundler = select_bundler(&root, &args)?;
    let package_manager = match args.package_manager {
        Some(manager) => manager,
        None => PackageManager::detect(&root),
    };
    cliclack::log::info(format!(
        "Using {} with {}",
        package_manager, bundler
    ))?;

    let mut actions = ProjectActions::stdout(root);
    if let Err(e) = configure_stimulus(&mut actions, bundler, package_manager) {
        cliclack::log::error(format!("{:#}", e))?;
        anyhow::bail!("Stimulus setup stopped. Steps completed before the error were kept.");
    }

    cliclack::outro(format!("Read more at {}", config.docs_url()))?;

    Ok(())
}

fn project_dir(directory: Option<&Path>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let path = match directory {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !path.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", path.display());
    }

    Ok(path)
}

fn select_bundler(root: &Path, args: &ConfigureArgs) -> Result<BundlerType> {
    let bundler = match BundlerType::choose(args.bundler, root, args.yes) {
        BundlerChoice::Explicit(bundler) => {
            cliclack::log::info(format!("Bundler: {}", bundler))?;
            bundler
        }
        BundlerChoice::Detected(bundler) => {
            cliclack::log::success(format!("Detected {}", bundler))?;
            bundler
        }
        BundlerChoice::Fallback(bundler) => {
            cliclack::log::warning("No esbuild.config.js or webpack.config.js found")?;
            cliclack::log::info(format!("Defaulting to {} (--yes mode)", bundler))?;
            bundler
        }
        BundlerChoice::Ask => {
            cliclack::log::warning("No esbuild.config.js or webpack.config.js found")?;
            cliclack::select("Which bundler does this project use?")
                .item(BundlerType::Esbuild, "esbuild", "esbuild.config.js")
                .item(BundlerType::Webpack, "Webpack", "webpack.config.js")
                .initial_value(BundlerType::Webpack)
                .interact()?
        }
    };

    Ok(bundler)
}
