//! Capability interface for scaffolding actions
//!
//! Automation scripts and bundled configurations never touch the filesystem
//! or spawn processes directly. They go through [`Actions`], so a recording
//! fake can stand in for the real project.

use colored::Color;
use std::io;
use std::path::Path;

/// Primitive operations available to automations and configurations
///
/// Paths are relative to the project root unless absolute.
pub trait Actions {
    /// Print a plain message
    fn say(&mut self, message: &str, color: Option<Color>) -> io::Result<()>;

    /// Print a status line (`status` word followed by a message)
    fn emit_status(&mut self, status: &str, message: &str, color: Option<Color>)
        -> io::Result<()>;

    /// Run a shell command in the project root, failing on non-zero exit
    fn run_command(&mut self, command: &str) -> io::Result<()>;

    /// Create a directory and any missing parents; no-op if it exists
    fn create_dir(&mut self, path: &Path) -> io::Result<()>;

    /// Create or overwrite a file
    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()>;

    /// Append to a file, creating it when missing
    fn append_file(&mut self, path: &Path, content: &str) -> io::Result<()>;

    /// Add an import statement to the frontend JavaScript entry file
    fn inject_import(&mut self, statement: &str) -> io::Result<()>;
}
