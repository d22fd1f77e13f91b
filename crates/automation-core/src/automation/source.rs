//! Automation source classification

use super::rewrite::{rewrite_url, Conventions};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Automation source - either remote URL or local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationSource {
    Remote(Url),
    Local(PathBuf),
}

impl AutomationSource {
    /// Classify a user-supplied location
    ///
    /// A location is remote when it parses as a URL with a host. Anything else
    /// is a filesystem path, resolved against `base_dir` when relative.
    pub fn classify(location: &str, base_dir: &Path) -> Self {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(_) => Self::local(location, base_dir),
            },
            Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => Self::Remote(url),
            _ => Self::local(location, base_dir),
        }
    }

    fn local(location: &str, base_dir: &Path) -> Self {
        let path = PathBuf::from(location);
        if path.is_absolute() {
            Self::Local(path)
        } else {
            Self::Local(base_dir.join(path))
        }
    }

    /// Normalize remote URLs to the URL that is fetched; local paths are unchanged
    pub fn resolve(self, conventions: &Conventions<'_>) -> Result<Self, url::ParseError> {
        match self {
            Self::Remote(url) => rewrite_url(&url, conventions).map(Self::Remote),
            local => Ok(local),
        }
    }
}

impl fmt::Display for AutomationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
