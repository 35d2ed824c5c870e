//! HTTP fetch of the people-search result page.
//!
//! ### Request
//! - One GET to `{base_url}/search?q=<first>+<last>+<city>`
//! - Fixed user agent, `Accept` and `Accept-Language` headers
//! - Configurable timeout, client-default redirect policy
//!
//! ### Failure mapping
//! - Client timeout: `FetchError::Timeout`
//! - Non-2xx status: `FetchError::HttpStatus`
//! - Connection or body read failure: `FetchError::Network`
//! - Body over `max_bytes`: `FetchError::TooLarge`
//!
//! No retries.

pub mod url;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, build_search_url, parse_base_url};

use merinfo_core::{AppConfig, FetchError, Query, RawResponse};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Source of raw result pages.
///
/// The orchestrator only talks to this trait, so tests can swap the network
/// out for a canned page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the result page for a query.
    async fn fetch(&self, query: &Query) -> Result<RawResponse, FetchError>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Site root (default: "https://www.merinfo.se")
    pub base_url: String,

    /// User agent string (default: "merinfo-lookup/0.1")
    pub user_agent: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
        }
    }
}

/// HTTP client for the search endpoint.
pub struct FetchClient {
    http: Client,
    base_url: ::url::Url,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let base_url = parse_base_url(&config.base_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn check_size(&self, size: usize) -> Result<(), FetchError> {
        if size > self.config.max_bytes {
            return Err(FetchError::TooLarge { size, limit: self.config.max_bytes });
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, query: &Query) -> Result<RawResponse, FetchError> {
        let start = Instant::now();
        let url = build_search_url(&self.base_url, query).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(%url, "fetching search page");

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "search request rejected");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            self.check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
        }

        let final_url = response.url().to_string();
        let bytes = response.bytes().await.map_err(classify)?;
        self.check_size(bytes.len())?;

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(RawResponse {
            query: query.clone(),
            url: final_url,
            status: status.as_u16(),
            html: String::from_utf8_lossy(&bytes).into_owned(),
            fetched_at: Utc::now(),
            fetch_ms,
        })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(err.to_string()) }
}
