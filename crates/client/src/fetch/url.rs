//! Search URL construction.

use merinfo_core::Query;

/// Error type for search URL construction failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Path of the search endpoint, relative to the site root.
const SEARCH_PATH: &str = "/search";

/// Name of the free-text search parameter.
const SEARCH_PARAM: &str = "q";

/// Parse and check the configured site base URL.
///
/// Only http and https are accepted. Any path, query or fragment is dropped.
pub fn parse_base_url(input: &str) -> Result<url::Url, UrlError> {
    let mut parsed = url::Url::parse(input.trim()).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_path("/");
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Build the search URL for a query.
///
/// The three fields go into a single form-encoded `q` parameter separated by
/// spaces, so `Anna Svensson Stockholm` becomes `q=Anna+Svensson+Stockholm`.
/// Field case is preserved.
pub fn build_search_url(base: &url::Url, query: &Query) -> Result<url::Url, UrlError> {
    let mut url = base.join(SEARCH_PATH).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    let terms = format!("{} {} {}", query.first_name(), query.last_name(), query.city());
    url.query_pairs_mut().clear().append_pair(SEARCH_PARAM, &terms);

    Ok(url)
}
