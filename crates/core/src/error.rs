//! Unified error types for merinfo-lookup.
//!
//! Fetch and parse failures have their own enums so the orchestrator can
//! report which stage of the pipeline failed.

use tokio_rusqlite::rusqlite;

/// Why a single search request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("FETCH_TIMEOUT: request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("HTTP_ERROR: status {0}")]
    HttpStatus(u16),

    /// Connection, TLS or body read failure.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Response body exceeded the configured limit.
    #[error("FETCH_TOO_LARGE: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },

    /// The search URL could not be built.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

/// Markup extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A configured CSS selector could not be compiled.
    #[error("PARSE_ERROR: invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Unified error types for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty name).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored timestamp could not be read back.
    #[error("CACHE_ERROR: invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
