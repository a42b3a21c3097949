//! Web scraping module for page retrieval.
//!
//! Uses reqwest for fetching; URL checks are done with the url crate before
//! any request is made. HTML parsing lives in [`crate::extract`].

use crate::config::FetchConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Failed to fetch website: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("Failed to fetch website: {status} for url ({url})")]
    Status { status: StatusCode, url: String },
}

/// Raw response from a page fetch
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The final URL after redirects
    pub url: String,
    /// Response body decoded as text
    pub body: String,
}

/// Check that `candidate` is an absolute http/https URL with a host.
///
/// The authority must be written out as `scheme://host`. WHATWG parsing
/// alone would also accept forms like `http:example.com`.
pub fn is_valid_url(candidate: &str) -> bool {
    let candidate = candidate.trim();
    let Some((scheme, rest)) = candidate.split_once("://") else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return false;
    }
    if rest.is_empty() || rest.starts_with(['/', '\\']) {
        return false;
    }

    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// HTTP client for page retrieval, built once from [`FetchConfig`]
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the configured User-Agent and timeout
    pub fn new(config: &FetchConfig) -> Result<Self, ScraperError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());

        if let Some(secs) = config.timeout_secs.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the page body; non-success statuses are errors
    pub async fn fetch(&self, url: &str) -> Result<RawPage, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScraperError::Status {
                status,
                url: response.url().to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!(url = %final_url, status = %status, bytes = body.len(), "Fetched page");

        Ok(RawPage {
            url: final_url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(is_valid_url("http://example.com"));
        assert!(is_valid_url("https://example.com/path?q=1"));
        assert!(is_valid_url("https://en.wikipedia.org/wiki/Rust_(programming_language)"));
        assert!(is_valid_url("http://127.0.0.1:8080/"));
        assert!(is_valid_url("  https://example.com  "));
    }

    #[test]
    fn test_invalid_scheme() {
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("file:///etc/passwd"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("mailto:someone@example.com"));
    }

    #[test]
    fn test_missing_host_or_scheme() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("www.example.com/page"));
        assert!(!is_valid_url("http://"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("http:example.com"));
        assert!(!is_valid_url("http:/example.com"));
        assert!(!is_valid_url("http:///example.com"));
        assert!(!is_valid_url("https:\\\\example.com\\x"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert!(is_valid_url("HTTPS://example.com/page"));
        assert!(is_valid_url("Http://example.com"));
    }

    #[test]
    fn test_fetcher_builds_with_unbounded_timeout() {
        let config = FetchConfig {
            timeout_secs: Some(0),
            ..FetchConfig::default()
        };
        assert!(Fetcher::new(&config).is_ok());

        let config = FetchConfig {
            timeout_secs: None,
            ..FetchConfig::default()
        };
        assert!(Fetcher::new(&config).is_ok());
    }
}
