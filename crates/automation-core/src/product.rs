//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface a binary implements to configure how
//! automations are discovered, fetched and reported.

use crate::AUTOMATION_FILENAME;

/// Configuration trait for the CLI product
///
/// The binary implements this trait to define:
/// - Product identity (name, display name)
/// - Automation file conventions
/// - Remote source defaults
/// - Documentation links
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Conventional automation script name
    fn automation_filename(&self) -> &'static str {
        AUTOMATION_FILENAME
    }

    /// Environment variable name for overriding the local automation file
    fn automation_file_env(&self) -> &'static str;

    /// Branch used when a GitHub repository root is given without one
    fn default_branch(&self) -> &'static str {
        "master"
    }

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
