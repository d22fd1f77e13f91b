//! Automation Core - Shared library for Bridgetown automation tooling
//!
//! This library provides the core functionality for applying automation scripts
//! to a project and for scaffolding bundled frontend configurations. It is designed
//! to be driven by a thin CLI binary that supplies its own product configuration.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Location classification, URL rewriting, fetching,
//!   and the `Actions` capability interface with its real and recording implementations
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait, the `Applier` that
//!   resolves and runs automations, and the Stimulus scaffolder
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use automation_core::{Applier, ProductConfig, ProjectActions};
//!
//! let applier = Applier::from_config(&MyConfig, std::env::current_dir()?);
//! let mut actions = ProjectActions::stdout(std::env::current_dir()?);
//! applier.apply(Some("https://github.com/bridgetownrb/bridgetown-automations"), &mut actions).await?;
//! ```

pub mod automation;
pub mod dsl;
pub mod product;
pub mod scaffold;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use automation::{
    rewrite_url, ApplyError, ApplyOutcome, Applier, AutomationFetcher, AutomationSource,
    FetchError,
};
pub use dsl::{Actions, ExecutionError, ProjectActions, RecordingActions};
pub use product::ProductConfig;
pub use scaffold::{configure_stimulus, BundlerType, PackageManager};

#[cfg(feature = "tui")]
pub use tui::{run_apply, run_configure};

/// Conventional automation script name, looked up in the project root and
/// appended to directory-like remote URLs
pub const AUTOMATION_FILENAME: &str = "bridgetown.automation.rb";
