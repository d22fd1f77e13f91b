//! Bundled frontend configurations
//!
//! This module provides:
//! - Bundler and package manager detection for a project
//! - The Stimulus configuration scaffolder

pub mod stimulus;

use clap::ValueEnum;
use std::fmt;
use std::path::Path;

pub use stimulus::{configure_stimulus, controllers_index};

/// Frontend bundler a project is set up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum BundlerType {
    Esbuild,
    Webpack,
}

/// Bundler config files, checked in order
const BUNDLER_CONFIGS: &[(&str, BundlerType)] = &[
    ("esbuild.config.js", BundlerType::Esbuild),
    ("webpack.config.js", BundlerType::Webpack),
];

/// How a bundler was settled on without prompting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundlerChoice {
    /// Given on the command line
    Explicit(BundlerType),
    /// Found from the project's bundler config file
    Detected(BundlerType),
    /// Nothing detected and prompts are skipped
    Fallback(BundlerType),
    /// Nothing detected, the user has to be asked
    Ask,
}

impl BundlerType {
    pub fn display_name(&self) -> &'static str {
        match self {
            BundlerType::Esbuild => "esbuild",
            BundlerType::Webpack => "Webpack",
        }
    }

    /// Detect the bundler from its config file in the project root
    pub fn detect(root: &Path) -> Option<Self> {
        BUNDLER_CONFIGS
            .iter()
            .find(|(file, _)| root.join(file).is_file())
            .map(|(_, bundler)| *bundler)
    }

    /// Settle on a bundler: explicit choice, then detection, then Webpack
    /// when `assume_default` is set
    pub fn choose(explicit: Option<Self>, root: &Path, assume_default: bool) -> BundlerChoice {
        if let Some(bundler) = explicit {
            return BundlerChoice::Explicit(bundler);
        }
        match Self::detect(root) {
            Some(bundler) => BundlerChoice::Detected(bundler),
            None if assume_default => BundlerChoice::Fallback(BundlerType::Webpack),
            None => BundlerChoice::Ask,
        }
    }
}

impl fmt::Display for BundlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// JavaScript package managers, keyed by lockfile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PackageManager {
    Yarn,
    Npm,
    Pnpm,
    Bun,
}

/// Lockfiles in order of preference
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("yarn.lock", PackageManager::Yarn),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("package-lock.json", PackageManager::Npm),
];

impl PackageManager {
    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// Detect the package manager from lockfiles; yarn when none is present
    pub fn detect(root: &Path) -> Self {
        LOCKFILES
            .iter()
            .find(|(file, _)| root.join(file).is_file())
            .map(|(_, manager)| *manager)
            .unwrap_or(PackageManager::Yarn)
    }

    /// Shell command adding packages to the project
    pub fn add_command(&self, packages: &[&str]) -> String {
        let verb = match self {
            PackageManager::Npm => "install",
            _ => "add",
        };
        format!("{} {} {}", self.display_name(), verb, packages.join(" "))
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
