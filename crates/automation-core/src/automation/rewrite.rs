//! Remote automation URL normalization
//!
//! Shorthand URLs (GitHub repositories, Gists, bare directories) are rewritten
//! to the raw-content URL of the automation script they point at. Rules are
//! evaluated top to bottom and the first match wins, so a new provider only
//! needs a new entry in [`RULES`].

use crate::AUTOMATION_FILENAME;
use url::Url;

/// Naming conventions a rewrite may need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conventions<'a> {
    /// Script name appended when the URL does not name one
    pub filename: &'a str,
    /// Branch used for bare GitHub repository URLs
    pub branch: &'a str,
}

impl Default for Conventions<'static> {
    fn default() -> Self {
        Self {
            filename: AUTOMATION_FILENAME,
            branch: "master",
        }
    }
}

/// A single rewrite rule: a predicate and the rewrite applied when it matches
pub struct RewriteRule {
    pub name: &'static str,
    pub matches: fn(&Url) -> bool,
    pub rewrite: fn(&Url, &Conventions<'_>) -> Result<Url, url::ParseError>,
}

/// Rewrite rules in priority order
pub const RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "github-tree",
        matches: is_github_tree,
        rewrite: rewrite_github_tree,
    },
    RewriteRule {
        name: "github-repo",
        matches: is_github_repo,
        rewrite: rewrite_github_repo,
    },
    RewriteRule {
        name: "gist",
        matches: is_gist,
        rewrite: rewrite_gist,
    },
    RewriteRule {
        name: "directory",
        matches: is_directory,
        rewrite: rewrite_directory,
    },
    RewriteRule {
        name: "passthrough",
        matches: any_url,
        rewrite: keep_url,
    },
];

/// Rewrite a remote automation URL to the URL that is actually fetched
pub fn rewrite_url(url: &Url, conventions: &Conventions<'_>) -> Result<Url, url::ParseError> {
    match matching_rule(url) {
        Some(rule) => (rule.rewrite)(url, conventions),
        None => Ok(url.clone()),
    }
}

/// Find the first rule that applies to a URL
pub fn matching_rule(url: &Url) -> Option<&'static RewriteRule> {
    RULES.iter().find(|rule| (rule.matches)(url))
}

/// Non-empty path segments
fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn has_host(url: &Url, hosts: &[&str]) -> bool {
    url.host_str()
        .is_some_and(|host| hosts.iter().any(|h| host.eq_ignore_ascii_case(h)))
}

fn is_github(url: &Url) -> bool {
    has_host(url, &["github.com", "www.github.com"])
}

fn names_script(segment: &str) -> bool {
    segment.ends_with(".rb")
}

fn has_extension(segment: &str) -> bool {
    segment.contains('.')
}

fn repo_name(segment: &str) -> &str {
    segment.strip_suffix(".git").unwrap_or(segment)
}

/// `https://github.com/{owner}/{repo}/tree/{branch}/{path..}` (or `/blob/`)
fn is_github_tree(url: &Url) -> bool {
    let segments = segments(url);
    is_github(url) && segments.len() >= 4 && matches!(segments[2], "tree" | "blob")
}

fn rewrite_github_tree(url: &Url, conventions: &Conventions<'_>) -> Result<Url, url::ParseError> {
    let segments = segments(url);
    let mut raw = format!(
        "https://raw.githubusercontent.com/{}/{}/{}",
        segments[0],
        repo_name(segments[1]),
        segments[3..].join("/")
    );
    // segments[3] is the branch, so only a path after it can name a file
    if segments.len() == 4 || !has_extension(segments[segments.len() - 1]) {
        raw.push('/');
        raw.push_str(conventions.filename);
    }
    Url::parse(&raw)
}

/// `https://github.com/{owner}/{repo}`, optionally followed by a script name
fn is_github_repo(url: &Url) -> bool {
    let segments = segments(url);
    is_github(url)
        && (segments.len() == 2 || (segments.len() == 3 && names_script(segments[2])))
}

fn rewrite_github_repo(url: &Url, conventions: &Conventions<'_>) -> Result<Url, url::ParseError> {
    let segments = segments(url);
    let filename = segments.get(2).copied().unwrap_or(conventions.filename);
    Url::parse(&format!(
        "https://raw.githubusercontent.com/{}/{}/{}/{}",
        segments[0],
        repo_name(segments[1]),
        conventions.branch,
        filename
    ))
}

/// `https://gist.github.com/{user}/{id}`, optionally followed by a script name
fn is_gist(url: &Url) -> bool {
    let segments = segments(url);
    has_host(url, &["gist.github.com"])
        && (segments.len() == 2 || (segments.len() == 3 && names_script(segments[2])))
}

fn rewrite_gist(url: &Url, conventions: &Conventions<'_>) -> Result<Url, url::ParseError> {
    let segments = segments(url);
    let filename = segments.get(2).copied().unwrap_or(conventions.filename);
    Url::parse(&format!(
        "https://gist.githubusercontent.com/{}/{}/raw/{}",
        segments[0], segments[1], filename
    ))
}

/// Path ends in `/` or its last segment has no dot-extension
fn is_directory(url: &Url) -> bool {
    match url.path_segments() {
        Some(mut segments) => segments.next_back().map_or(true, |last| !has_extension(last)),
        None => false,
    }
}

fn rewrite_directory(url: &Url, conventions: &Conventions<'_>) -> Result<Url, url::ParseError> {
    let mut url = url.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(conventions.filename);
    Ok(url)
}

fn any_url(_: &Url) -> bool {
    true
}

fn keep_url(url: &Url, _: &Conventions<'_>) -> Result<Url, url::ParseError> {
    Ok(url.clone())
}
