//! Recording fake for the `Actions` interface

use super::actions::Actions;
use colored::Color;
use std::io;
use std::path::{Path, PathBuf};

/// One call made against [`RecordingActions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Say {
        message: String,
        color: Option<Color>,
    },
    Status {
        status: String,
        message: String,
    },
    Run(String),
    CreateDir(PathBuf),
    WriteFile {
        path: PathBuf,
        content: String,
    },
    AppendFile {
        path: PathBuf,
        content: String,
    },
    InjectImport(String),
}

/// Records every action in order without touching the system
#[derive(Debug, Default)]
pub struct RecordingActions {
    actions: Vec<RecordedAction>,
    fail_commands: bool,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `run_command` fail after being recorded
    pub fn failing_commands(mut self) -> Self {
        self.fail_commands = true;
        self
    }

    pub fn actions(&self) -> &[RecordedAction] {
        &self.actions
    }

    /// Printed lines, in the order a terminal would show them
    pub fn output(&self) -> String {
        let mut out = String::new();
        for action in &self.actions {
            match action {
                RecordedAction::Say { message, .. } => {
                    out.push_str(message);
                    out.push('\n');
                }
                RecordedAction::Status { status, message } => {
                    out.push_str(&format!("{status}  {message}\n"));
                }
                _ => {}
            }
        }
        out
    }

    /// Commands passed to `run_command`
    pub fn commands(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                RecordedAction::Run(command) => Some(command.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Actions for RecordingActions {
    fn say(&mut self, message: &str, color: Option<Color>) -> io::Result<()> {
        self.actions.push(RecordedAction::Say {
            message: message.to_string(),
            color,
        });
        Ok(())
    }

    fn emit_status(
        &mut self,
        status: &str,
        message: &str,
        _color: Option<Color>,
    ) -> io::Result<()> {
        self.actions.push(RecordedAction::Status {
            status: status.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn run_command(&mut self, command: &str) -> io::Result<()> {
        self.actions.push(RecordedAction::Run(command.to_string()));
        if self.fail_commands {
            return Err(io::Error::other(format!("`{}` failed", command)));
        }
        Ok(())
    }

    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        self.actions.push(RecordedAction::CreateDir(path.to_path_buf()));
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        self.actions.push(RecordedAction::WriteFile {
            path: path.to_path_buf(),
            content: content.to_string(),
        });
        Ok(())
    }

    fn append_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        self.actions.push(RecordedAction::AppendFile {
            path: path.to_path_buf(),
            content: content.to_string(),
        });
        Ok(())
    }

    fn inject_import(&mut self, statement: &str) -> io::Result<()> {
        self.actions
            .push(RecordedAction::InjectImport(statement.to_string()));
        Ok(())
    }
}
