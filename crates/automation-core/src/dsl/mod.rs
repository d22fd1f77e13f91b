//! Scaffolding DSL: the capability interface and the script interpreter
//!
//! This module provides:
//! - The `Actions` trait every automation effect goes through
//! - `ProjectActions`, which applies effects to a real project directory
//! - `RecordingActions`, a fake that records calls for tests and dry runs
//! - The interpreter that runs automation scripts against any `Actions`

pub mod actions;
pub mod project;
pub mod recording;
pub mod script;

pub use actions::Actions;
pub use project::{insert_import, ProjectActions};
pub use recording::{RecordedAction, RecordingActions};
pub use script::{execute, run_script, ExecutionError, Parser, Statement, Value};
