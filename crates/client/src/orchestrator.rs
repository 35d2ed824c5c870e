//! Query pipeline: cache lookup, fetch, store, parse.
//!
//! The cache is an optimisation only. Lookup and store failures are logged
//! and the run carries on as if the cache were absent.

use merinfo_core::{CacheDb, FetchError, ParseError, Query, RawResponse, ResultSet};

use crate::fetch::Fetcher;
use crate::parse::PersonParser;

/// How the orchestrator uses the response cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve hits from the cache, store fresh responses.
    #[default]
    ReadWrite,
    /// Always fetch, then overwrite the cached entry.
    Refresh,
    /// Neither read nor write.
    Disabled,
}

/// Stage that failed during a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestrationCause {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A failed search, carrying the query it was for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("search for {query} failed")]
pub struct OrchestrationError {
    pub query: Query,
    #[source]
    pub cause: OrchestrationCause,
}

impl OrchestrationError {
    fn new(query: &Query, cause: impl Into<OrchestrationCause>) -> Self {
        Self { query: query.clone(), cause: cause.into() }
    }
}

/// Runs one query end to end.
pub struct Orchestrator<F> {
    fetcher: F,
    parser: PersonParser,
    cache: Option<CacheDb>,
    mode: CacheMode,
}

impl<F: Fetcher> Orchestrator<F> {
    /// Orchestrator without a cache.
    pub fn new(fetcher: F, parser: PersonParser) -> Self {
        Self { fetcher, parser, cache: None, mode: CacheMode::Disabled }
    }

    /// Attach a response cache used according to `mode`.
    pub fn with_cache(mut self, cache: CacheDb, mode: CacheMode) -> Self {
        self.cache = Some(cache);
        self.mode = mode;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Produce the result set for a query.
    ///
    /// A cached response is parsed exactly like a fresh one, so repeating a
    /// query against a warm cache yields the same records without a request.
    pub async fn run(&self, query: &Query) -> Result<ResultSet, OrchestrationError> {
        let response = match self.lookup(query).await {
            Some(cached) => cached,
            None => {
                let fresh = self
                    .fetcher
                    .fetch(query)
                    .await
                    .map_err(|e| OrchestrationError::new(query, e))?;
                self.store(query, &fresh).await;
                fresh
            }
        };

        self.parser.parse(&response.html).map_err(|e| OrchestrationError::new(query, e))
    }

    async fn lookup(&self, query: &Query) -> Option<RawResponse> {
        let cache = self.cache.as_ref()?;
        if self.mode != CacheMode::ReadWrite {
            return None;
        }

        match cache.get(query).await {
            Ok(Some(response)) => {
                tracing::debug!(%query, fetched_at = %response.fetched_at, "cache hit");
                Some(response)
            }
            Ok(None) => {
                tracing::debug!(%query, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "cache lookup failed, fetching");
                None
            }
        }
    }

    async fn store(&self, query: &Query, response: &RawResponse) {
        let Some(cache) = self.cache.as_ref() else { return };
        if self.mode == CacheMode::Disabled {
            return;
        }

        if let Err(e) = cache.put(query, response).await {
            tracing::warn!(%query, error = %e, "failed to cache response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use merinfo_core::SelectorConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    const PAGE: &str = r#"
        <div class="person-result"><a href="/person/a">Anna Svensson</a><a href="tel:0812345678">08-123 456 78</a></div>
        <div class="person-result"><a href="/person/b">Anna Maria Svensson</a></div>
    "#;

    /// Fetcher returning a fixed outcome and counting calls.
    struct CannedFetcher {
        outcome: Result<String, FetchError>,
        calls: AtomicUsize,
    }

    impl CannedFetcher {
        fn page(html: &str) -> Self {
            Self { outcome: Ok(html.to_string()), calls: AtomicUsize::new(0) }
        }

        fn failing(err: FetchError) -> Self {
            Self { outcome: Err(err), calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, query: &Query) -> Result<RawResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let html = self.outcome.clone()?;
            Ok(RawResponse {
                query: query.clone(),
                url: "https://www.merinfo.se/search?q=test".into(),
                status: 200,
                html,
                fetched_at: Utc::now(),
                fetch_ms: 5,
            })
        }
    }

    fn parser() -> PersonParser {
        PersonParser::new(SelectorConfig::default(), Url::parse("https://www.merinfo.se").unwrap())
            .with_reference_year(2025)
    }

    fn anna() -> Query {
        Query::new("Anna", "Svensson", "Stockholm").unwrap()
    }

    #[tokio::test]
    async fn test_run_without_cache() {
        let orchestrator = Orchestrator::new(CannedFetcher::page(PAGE), parser());

        let records = orchestrator.run(&anna()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phone.as_deref(), Some("08-123 456 78"));
        assert!(records[1].phone.is_none());
        assert_eq!(orchestrator.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_run_is_idempotent_with_cache() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let orchestrator =
            Orchestrator::new(CannedFetcher::page(PAGE), parser()).with_cache(cache.clone(), CacheMode::ReadWrite);

        let first = orchestrator.run(&anna()).await.unwrap();
        let second = orchestrator.run(&anna()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(orchestrator.fetcher().calls(), 1);
        assert_eq!(cache.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_cache_hit_skips_fetch() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let query = anna();
        let cached = RawResponse {
            query: query.clone(),
            url: "https://www.merinfo.se/search?q=Anna+Svensson+Stockholm".into(),
            status: 200,
            html: PAGE.into(),
            fetched_at: Utc::now(),
            fetch_ms: 42,
        };
        cache.put(&query, &cached).await.unwrap();

        let fetcher = CannedFetcher::failing(FetchError::Network("offline".into()));
        let orchestrator = Orchestrator::new(fetcher, parser()).with_cache(cache, CacheMode::ReadWrite);

        let records = orchestrator.run(&query).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(orchestrator.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn test_run_refresh_always_fetches_and_stores() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let query = anna();
        let stale = RawResponse {
            query: query.clone(),
            url: "https://www.merinfo.se/search?q=old".into(),
            status: 200,
            html: "<html></html>".into(),
            fetched_at: Utc::now(),
            fetch_ms: 1,
        };
        cache.put(&query, &stale).await.unwrap();

        let orchestrator =
            Orchestrator::new(CannedFetcher::page(PAGE), parser()).with_cache(cache.clone(), CacheMode::Refresh);

        let records = orchestrator.run(&query).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(orchestrator.fetcher().calls(), 1);

        let stored = cache.get(&query).await.unwrap().unwrap();
        assert_eq!(stored.html, PAGE);
    }

    #[tokio::test]
    async fn test_run_disabled_cache_is_untouched() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let orchestrator =
            Orchestrator::new(CannedFetcher::page(PAGE), parser()).with_cache(cache.clone(), CacheMode::Disabled);

        orchestrator.run(&anna()).await.unwrap();
        orchestrator.run(&anna()).await.unwrap();

        assert_eq!(orchestrator.fetcher().calls(), 2);
        assert_eq!(cache.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_fetch_error_propagates() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let orchestrator = Orchestrator::new(CannedFetcher::failing(FetchError::HttpStatus(404)), parser())
            .with_cache(cache.clone(), CacheMode::ReadWrite);

        let err = orchestrator.run(&anna()).await.unwrap_err();
        assert_eq!(err.query, anna());
        assert_eq!(err.cause, OrchestrationCause::Fetch(FetchError::HttpStatus(404)));
        assert_eq!(cache.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_parse_error_propagates() {
        let selectors = SelectorConfig { name_links: vec!["a[".into()], ..Default::default() };
        let parser = PersonParser::new(selectors, Url::parse("https://www.merinfo.se").unwrap());
        let orchestrator = Orchestrator::new(CannedFetcher::page(PAGE), parser);

        let err = orchestrator.run(&anna()).await.unwrap_err();
        assert!(matches!(err.cause, OrchestrationCause::Parse(ParseError::InvalidSelector { .. })));
        assert!(err.to_string().starts_with("search for Anna Svensson in Stockholm failed"));
    }

    #[tokio::test]
    async fn test_run_empty_page_is_empty_result() {
        let orchestrator = Orchestrator::new(CannedFetcher::page("<html><body></body></html>"), parser());
        let records = orchestrator.run(&anna()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_run_survives_broken_cache() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let orchestrator =
            Orchestrator::new(CannedFetcher::page(PAGE), parser()).with_cache(cache.clone(), CacheMode::ReadWrite);
        cache.close().await.unwrap();

        let records = orchestrator.run(&anna()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(orchestrator.fetcher().calls(), 1);
    }
}
