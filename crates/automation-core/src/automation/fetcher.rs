//! Automation fetching from remote URLs or the local filesystem
//!
//! Remote sources get exactly one HTTP GET; any transport failure or
//! non-success status is returned as a [`FetchError`]. There is no retry and
//! no fallback URL.

use super::source::AutomationSource;
use crate::product::ProductConfig;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use url::Url;

/// Errors produced while turning a location into script text
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid automation URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch automation from {url}: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch automation from {url}: HTTP {status}")]
    Status {
        url: Url,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read automation {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Automation fetcher - retrieves script text from remote or local sources
pub struct AutomationFetcher {
    client: reqwest::Client,
}

impl AutomationFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Self {
        Self::new(config.user_agent())
    }

    /// Fetch a remote automation script as text
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: response.status(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })
    }

    /// Read the script text behind an already resolved source
    pub async fn read_source(&self, source: &AutomationSource) -> Result<String, FetchError> {
        match source {
            AutomationSource::Remote(url) => self.fetch(url).await,
            AutomationSource::Local(path) => {
                fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Read {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/12345.rb")
            .with_status(200)
            .with_body("say_status :urltest, \"Works!\"\n")
            .expect(1)
            .create_async()
            .await;

        let fetcher = AutomationFetcher::new("bridgetown-tools-test");
        let url = Url::parse(&format!("{}/12345.rb", server.url())).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();

        assert!(body.contains("urltest"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing/bridgetown.automation.rb")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let fetcher = AutomationFetcher::new("bridgetown-tools-test");
        let url = Url::parse(&format!(
            "{}/missing/bridgetown.automation.rb",
            server.url()
        ))
        .unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected status error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_local_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.rb");
        std::fs::write(&path, "say \"hi\"\n").unwrap();

        let fetcher = AutomationFetcher::new("bridgetown-tools-test");
        let body = fetcher
            .read_source(&AutomationSource::Local(path))
            .await
            .unwrap();
        assert_eq!(body, "say \"hi\"\n");
    }

    #[tokio::test]
    async fn test_read_missing_local_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.rb");

        let fetcher = AutomationFetcher::new("bridgetown-tools-test");
        let err = fetcher
            .read_source(&AutomationSource::Local(path.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Read { path: p, .. } if p == path));
    }
}
