//! Automation resolution and application
//!
//! This module provides:
//! - Location classification (local path vs remote URL)
//! - Remote URL normalization through an ordered rule table
//! - Fetching script text from the network or the filesystem
//! - The `Applier`, which resolves a location and runs the script it names

pub mod fetcher;
pub mod rewrite;
pub mod source;

use crate::dsl::{run_script, Actions, ExecutionError};
use crate::product::ProductConfig;
use crate::AUTOMATION_FILENAME;
use colored::Color;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use fetcher::{AutomationFetcher, FetchError};
pub use rewrite::{rewrite_url, Conventions, RewriteRule, RULES};
pub use source::AutomationSource;

/// Errors from applying an automation
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Failed to update project: {0}")]
    Io(#[from] io::Error),
}

/// What an apply run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No automation file existed, so a stub was written and nothing ran
    StubCreated(PathBuf),
    /// The automation was read and all of its statements ran
    Applied {
        source: AutomationSource,
        statements: usize,
    },
}

/// Resolves automation locations and runs them against a project
pub struct Applier {
    root: PathBuf,
    default_file: PathBuf,
    filename: String,
    branch: String,
    fetcher: AutomationFetcher,
}

impl Applier {
    /// Create an applier for a project root with default conventions
    pub fn new(root: PathBuf, fetcher: AutomationFetcher) -> Self {
        Self {
            root,
            default_file: PathBuf::from(AUTOMATION_FILENAME),
            filename: AUTOMATION_FILENAME.to_string(),
            branch: "master".to_string(),
            fetcher,
        }
    }

    /// Create an applier from a product config
    ///
    /// The local automation file can be overridden through the product's
    /// environment variable.
    pub fn from_config<C: ProductConfig>(config: &C, root: PathBuf) -> Self {
        let default_file = std::env::var_os(config.automation_file_env())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(config.automation_filename()));

        Self {
            root,
            default_file,
            filename: config.automation_filename().to_string(),
            branch: config.default_branch().to_string(),
            fetcher: AutomationFetcher::from_config(config),
        }
    }

    /// Use a different file for argument-less runs
    pub fn with_default_file(mut self, path: PathBuf) -> Self {
        self.default_file = path;
        self
    }

    pub fn conventions(&self) -> Conventions<'_> {
        Conventions {
            filename: &self.filename,
            branch: &self.branch,
        }
    }

    /// Classify a location and rewrite it if remote
    pub fn resolve(&self, location: &str) -> Result<AutomationSource, FetchError> {
        AutomationSource::classify(location, &self.root)
            .resolve(&self.conventions())
            .map_err(|source| FetchError::InvalidUrl {
                url: location.to_string(),
                source,
            })
    }

    /// Resolve `location` (or the default automation file) and run it
    pub async fn apply<A: Actions + ?Sized>(
        &self,
        location: Option<&str>,
        actions: &mut A,
    ) -> Result<ApplyOutcome, ApplyError> {
        let source = match location {
            Some(location) => self.resolve(location)?,
            None => {
                let path = self.root.join(&self.default_file);
                if !path.exists() {
                    self.create_stub(&path, actions)?;
                    return Ok(ApplyOutcome::StubCreated(path));
                }
                AutomationSource::Local(path)
            }
        };

        actions.emit_status("apply", &source.to_string(), None)?;
        let script = self.fetcher.read_source(&source).await?;
        let statements = run_script(&script, actions)?;

        Ok(ApplyOutcome::Applied { source, statements })
    }

    /// Write the starter file and report it with a single `add` status
    fn create_stub<A: Actions + ?Sized>(&self, path: &Path, actions: &mut A) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, stub_script(&self.filename))?;
        actions.emit_status(
            "add",
            &format!(
                "{} (edit it, then apply again to run it)",
                self.default_file.display()
            ),
            Some(Color::Yellow),
        )
    }
}

fn stub_script(filename: &str) -> String {
    format!(
        "# Statements in {filename} run when you apply it from this folder.\n\
         say_status :automation, \"Hello from {filename}!\"\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{ProjectActions, RecordingActions};
    use std::fs;

    fn applier(root: &Path) -> Applier {
        Applier::new(
            root.to_path_buf(),
            AutomationFetcher::new("bridgetown-tools-test"),
        )
    }

    fn output(actions: ProjectActions<Vec<u8>>) -> String {
        String::from_utf8(actions.into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_runs_relative_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("test/fixtures/test_automation.rb");
        fs::create_dir_all(fixture.parent().unwrap()).unwrap();
        fs::write(&fixture, "say_status :fixture, \"Works!\"\n").unwrap();

        let mut actions = RecordingActions::new();
        let outcome = applier(dir.path())
            .apply(Some("test/fixtures/test_automation.rb"), &mut actions)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                source: AutomationSource::Local(fixture.clone()),
                statements: 1,
            }
        );
        let out = actions.output();
        assert!(out.contains(&format!("apply  {}", fixture.display())));
        assert!(out.contains("fixture  Works!"));
    }

    #[tokio::test]
    async fn test_runs_automation_from_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/12345.rb")
            .with_status(200)
            .with_body("say_status :urltest, \"Works!\"\n")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}/12345.rb", server.url());
        let mut actions = RecordingActions::new();
        applier(dir.path())
            .apply(Some(url.as_str()), &mut actions)
            .await
            .unwrap();

        let out = actions.output();
        assert!(out.contains(&format!("apply  {}", url)));
        assert!(out.contains("urltest  Works!"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_directory_url_gets_automation_filename() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/foo/bridgetown.automation.rb")
            .with_status(200)
            .with_body("say_status :urltest, \"Works!\"\n")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let location = format!("{}/foo", server.url());
        let mut actions = RecordingActions::new();
        applier(dir.path())
            .apply(Some(location.as_str()), &mut actions)
            .await
            .unwrap();

        assert!(actions.output().contains(&format!(
            "apply  {}/foo/bridgetown.automation.rb",
            server.url()
        )));
        mock.assert_async().await;
    }

    #[test]
    fn test_resolves_github_and_gist_urls() {
        let applier = applier(Path::new("."));

        let repo = applier
            .resolve("https://github.com/bridgetownrb/bridgetown-automations")
            .unwrap();
        assert_eq!(
            repo.to_string(),
            "https://raw.githubusercontent.com/bridgetownrb/bridgetown-automations/master/bridgetown.automation.rb"
        );

        let gist = applier
            .resolve("https://gist.github.com/jaredcwhite/963d40acab5f21b42152536ad6847575")
            .unwrap();
        assert_eq!(
            gist.to_string(),
            "https://gist.githubusercontent.com/jaredcwhite/963d40acab5f21b42152536ad6847575/raw/bridgetown.automation.rb"
        );
    }

    #[tokio::test]
    async fn test_missing_default_file_creates_stub_without_running_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut actions = ProjectActions::new(dir.path().to_path_buf(), Vec::new());

        let outcome = applier(dir.path()).apply(None, &mut actions).await.unwrap();

        let stub = dir.path().join(AUTOMATION_FILENAME);
        assert_eq!(outcome, ApplyOutcome::StubCreated(stub.clone()));
        assert!(fs::read_to_string(&stub).unwrap().contains("say_status"));

        let out = output(actions);
        assert_eq!(out.lines().count(), 1, "{out}");
        assert!(out.contains("add"));
        assert!(out.contains(AUTOMATION_FILENAME));
        assert!(!out.contains("create"));
        assert!(!out.contains("Hello from"));
    }

    #[tokio::test]
    async fn test_existing_default_file_is_run_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let script = "say_status :applytest, 'I am Bridgetown. Hear me roar!'\n";
        fs::write(dir.path().join(AUTOMATION_FILENAME), script).unwrap();
        let mut actions = ProjectActions::new(dir.path().to_path_buf(), Vec::new());

        let outcome = applier(dir.path()).apply(None, &mut actions).await.unwrap();

        assert!(matches!(outcome, ApplyOutcome::Applied { statements: 1, .. }));
        let out = output(actions);
        assert!(out.contains("applytest"));
        assert!(out.contains("Hear me roar!"));
        assert_eq!(
            fs::read_to_string(dir.path().join(AUTOMATION_FILENAME)).unwrap(),
            script
        );
    }

    #[tokio::test]
    async fn test_stub_runs_on_second_apply() {
        let dir = tempfile::tempdir().unwrap();
        let applier = applier(dir.path());

        let mut first = ProjectActions::new(dir.path().to_path_buf(), Vec::new());
        applier.apply(None, &mut first).await.unwrap();

        let mut second = RecordingActions::new();
        applier.apply(None, &mut second).await.unwrap();
        assert!(second
            .output()
            .contains("automation  Hello from bridgetown.automation.rb!"));
    }

    #[tokio::test]
    async fn test_custom_default_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.rb"), "say 'custom'\n").unwrap();

        let mut actions = RecordingActions::new();
        applier(dir.path())
            .with_default_file(PathBuf::from("setup.rb"))
            .apply(None, &mut actions)
            .await
            .unwrap();
        assert!(actions.output().contains("custom"));
    }

    #[derive(Clone)]
    struct TestConfig;

    impl ProductConfig for TestConfig {
        fn name(&self) -> &'static str {
            "automation-core-test"
        }

        fn display_name(&self) -> &'static str {
            "Test"
        }

        fn cli_description(&self) -> &'static str {
            "Test product"
        }

        fn docs_url(&self) -> &'static str {
            "https://example.com/docs"
        }

        fn automation_file_env(&self) -> &'static str {
            "AUTOMATION_CORE_TEST_AUTOMATION_FILE"
        }
    }

    #[tokio::test]
    async fn test_env_var_overrides_default_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("override.rb"), "say 'from override'\n").unwrap();
        fs::write(dir.path().join(AUTOMATION_FILENAME), "say 'from default'\n").unwrap();

        std::env::set_var(TestConfig.automation_file_env(), "override.rb");
        let applier = Applier::from_config(&TestConfig, dir.path().to_path_buf());
        std::env::remove_var(TestConfig.automation_file_env());

        let mut actions = RecordingActions::new();
        let outcome = applier.apply(None, &mut actions).await.unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                source: AutomationSource::Local(dir.path().join("override.rb")),
                statements: 1,
            }
        );
        let out = actions.output();
        assert!(out.contains("from override"));
        assert!(!out.contains("from default"));
    }

    #[tokio::test]
    async fn test_not_found_url_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gone/bridgetown.automation.rb")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let location = format!("{}/gone", server.url());
        let mut actions = RecordingActions::new();
        let err = applier(dir.path())
            .apply(Some(location.as_str()), &mut actions)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplyError::Fetch(FetchError::Status { .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_script_keeps_earlier_effects() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("broken.rb"),
            "create_file 'kept.txt', 'kept'\nthis is not a statement\n",
        )
        .unwrap();

        let mut actions = ProjectActions::new(dir.path().to_path_buf(), Vec::new());
        let err = applier(dir.path())
            .apply(Some("broken.rb"), &mut actions)
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::Execution(ref e) if e.line() == 2));
        assert_eq!(
            fs::read_to_string(dir.path().join("kept.txt")).unwrap(),
            "kept"
        );
    }
}
