//! Actions applied to a real project directory

use super::actions::Actions;
use colored::{Color, Colorize};
use std::fs::{self, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Entry files checked by `inject_import`, in order of preference
const ENTRY_FILES: &[&str] = &["frontend/javascript/index.js", "frontend/javascript/index.ts"];

/// Width of the right-aligned status column
const STATUS_WIDTH: usize = 12;

/// Real filesystem and process effects, rooted at a project directory
pub struct ProjectActions<W: Write = Stdout> {
    root: PathBuf,
    out: W,
}

impl ProjectActions<Stdout> {
    /// Project actions reporting to stdout
    pub fn stdout(root: PathBuf) -> Self {
        Self::new(root, io::stdout())
    }
}

impl<W: Write> ProjectActions<W> {
    pub fn new(root: PathBuf, out: W) -> Self {
        Self { root, out }
    }

    /// Consume the actions, returning the status output writer
    pub fn into_output(self) -> W {
        self.out
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn entry_file(&self) -> Option<PathBuf> {
        ENTRY_FILES
            .iter()
            .map(|candidate| self.root.join(candidate))
            .find(|path| path.is_file())
    }
}

impl<W: Write> Actions for ProjectActions<W> {
    fn say(&mut self, message: &str, color: Option<Color>) -> io::Result<()> {
        match color {
            Some(color) => writeln!(self.out, "{}", message.color(color)),
            None => writeln!(self.out, "{}", message),
        }
    }

    fn emit_status(
        &mut self,
        status: &str,
        message: &str,
        color: Option<Color>,
    ) -> io::Result<()> {
        let status = format!("{:>width$}", status, width = STATUS_WIDTH);
        writeln!(
            self.out,
            "{}  {}",
            status.color(color.unwrap_or(Color::Green)).bold(),
            message
        )
    }

    fn run_command(&mut self, command: &str) -> io::Result<()> {
        self.emit_status("run", command, None)?;
        self.out.flush()?;

        let status = shell(command).current_dir(&self.root).status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "`{}` failed with {}",
                command, status
            )));
        }
        Ok(())
    }

    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        let target = self.resolve(path);
        if target.is_dir() {
            return self.emit_status("exist", &path.display().to_string(), Some(Color::Blue));
        }
        fs::create_dir_all(&target)?;
        self.emit_status("create", &path.display().to_string(), None)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        let target = self.resolve(path);
        let status = match fs::read_to_string(&target) {
            Ok(existing) if existing == content => {
                return self.emit_status(
                    "identical",
                    &path.display().to_string(),
                    Some(Color::Blue),
                );
            }
            Ok(_) => ("force", Color::Yellow),
            Err(e) if e.kind() == io::ErrorKind::NotFound => ("create", Color::Green),
            Err(e) => return Err(e),
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        self.emit_status(status.0, &path.display().to_string(), Some(status.1))
    }

    fn append_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        let target = self.resolve(path);
        let mut file = OpenOptions::new().create(true).append(true).open(&target)?;
        file.write_all(content.as_bytes())?;
        self.emit_status("append", &path.display().to_string(), None)
    }

    fn inject_import(&mut self, statement: &str) -> io::Result<()> {
        let entry = self.entry_file().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "No JavaScript entry file found (looked for {})",
                    ENTRY_FILES.join(", ")
                ),
            )
        })?;
        let display = entry
            .strip_prefix(&self.root)
            .unwrap_or(&entry)
            .display()
            .to_string();

        let contents = fs::read_to_string(&entry)?;
        match insert_import(&contents, statement) {
            Some(updated) => {
                fs::write(&entry, updated)?;
                self.emit_status("insert", &display, None)
            }
            None => self.emit_status("identical", &display, Some(Color::Blue)),
        }
    }
}

/// Build a command that runs through the platform shell
fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Insert an import statement after the last import of a JavaScript file
///
/// Returns `None` when the statement is already present. Files without any
/// import get the statement at the top.
pub fn insert_import(contents: &str, statement: &str) -> Option<String> {
    let statement = statement.trim();
    if statement.is_empty() || contents.contains(statement) {
        return None;
    }

    let mut insert_at = 0;
    let mut offset = 0;
    let mut inside_braces = false;
    for line in contents.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_start();
        if inside_braces {
            if trimmed.contains('}') {
                inside_braces = false;
                insert_at = offset;
            }
            continue;
        }
        if trimmed.starts_with("import ") {
            if trimmed.contains('{') && !trimmed.contains('}') {
                inside_braces = true;
            } else {
                insert_at = offset;
            }
        }
    }

    let (head, tail) = contents.split_at(insert_at);
    let mut updated = String::with_capacity(contents.len() + statement.len() + 2);
    updated.push_str(head);
    if !head.is_empty() && !head.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(statement);
    updated.push('\n');
    updated.push_str(tail);
    Some(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> (tempfile::TempDir, ProjectActions<Vec<u8>>) {
        let dir = tempfile::tempdir().unwrap();
        let actions = ProjectActions::new(dir.path().to_path_buf(), Vec::new());
        (dir, actions)
    }

    fn output(actions: ProjectActions<Vec<u8>>) -> String {
        String::from_utf8(actions.into_output()).unwrap()
    }

    #[test]
    fn test_insert_import_after_last_import() {
        let contents = "import \"index.css\"\nimport \"./lib\"\n\nconsole.info(\"hi\")\n";
        let updated = insert_import(contents, "import \"./controllers\"").unwrap();
        assert_eq!(
            updated,
            "import \"index.css\"\nimport \"./lib\"\nimport \"./controllers\"\n\nconsole.info(\"hi\")\n"
        );
    }

    #[test]
    fn test_insert_import_skips_multiline_import_body() {
        let contents = "import {\n  a,\n  b,\n} from \"x\"\nrun()\n";
        let updated = insert_import(contents, "import \"./controllers\"").unwrap();
        assert_eq!(
            updated,
            "import {\n  a,\n  b,\n} from \"x\"\nimport \"./controllers\"\nrun()\n"
        );
    }

    #[test]
    fn test_insert_import_without_imports_goes_first() {
        let updated = insert_import("console.log(1)\n", "import \"./controllers\"").unwrap();
        assert_eq!(updated, "import \"./controllers\"\nconsole.log(1)\n");
    }

    #[test]
    fn test_insert_import_is_skipped_when_present() {
        let contents = "import \"./controllers\"\n";
        assert!(insert_import(contents, "import \"./controllers\"\n").is_none());
    }

    #[test]
    fn test_create_dir_is_idempotent() {
        let (dir, mut actions) = project();
        let path = Path::new("frontend/javascript/controllers");

        actions.create_dir(path).unwrap();
        actions.create_dir(path).unwrap();

        assert!(dir.path().join(path).is_dir());
        let out = output(actions);
        assert!(out.contains("create"));
        assert!(out.contains("exist"));
    }

    #[test]
    fn test_write_file_reports_create_identical_force() {
        let (dir, mut actions) = project();
        let path = Path::new("nested/file.txt");

        actions.write_file(path, "one").unwrap();
        actions.write_file(path, "one").unwrap();
        actions.write_file(path, "two").unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(path)).unwrap(),
            "two"
        );
        let out = output(actions);
        assert!(out.contains("create"));
        assert!(out.contains("identical"));
        assert!(out.contains("force"));
    }

    #[test]
    fn test_append_file_creates_then_appends() {
        let (dir, mut actions) = project();
        let path = Path::new("log.txt");

        actions.append_file(path, "a\n").unwrap();
        actions.append_file(path, "b\n").unwrap();

        assert_eq!(fs::read_to_string(dir.path().join(path)).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_inject_import_requires_entry_file() {
        let (_dir, mut actions) = project();
        let err = actions.inject_import("import \"./controllers\"").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_inject_import_updates_entry_file() {
        let (dir, mut actions) = project();
        let entry = dir.path().join("frontend/javascript/index.js");
        fs::create_dir_all(entry.parent().unwrap()).unwrap();
        fs::write(&entry, "import \"index.css\"\n").unwrap();

        actions.inject_import("import \"./controllers\"").unwrap();
        actions.inject_import("import \"./controllers\"").unwrap();

        assert_eq!(
            fs::read_to_string(&entry).unwrap(),
            "import \"index.css\"\nimport \"./controllers\"\n"
        );
        let out = output(actions);
        assert!(out.contains("insert"));
        assert!(out.contains("identical"));
    }

    #[test]
    fn test_status_line_layout() {
        let (_dir, mut actions) = project();
        colored::control::set_override(false);
        actions.emit_status("apply", "http://x.test/a.rb", None).unwrap();
        assert_eq!(output(actions), "       apply  http://x.test/a.rb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_fails_on_nonzero_exit() {
        let (_dir, mut actions) = project();
        actions.run_command("true").unwrap();
        assert!(actions.run_command("exit 3").is_err());
    }
}
