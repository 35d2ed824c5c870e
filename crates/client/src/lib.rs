//! Client code for merinfo-lookup.
//!
//! This crate provides the HTTP fetch of result pages, person extraction,
//! and the pipeline that ties both to the response cache.

pub mod fetch;
pub mod orchestrator;
pub mod parse;

#[cfg(test)]
mod test_support;

pub use fetch::{FetchClient, FetchConfig, Fetcher, build_search_url, parse_base_url};
pub use orchestrator::{CacheMode, OrchestrationCause, OrchestrationError, Orchestrator};
pub use parse::PersonParser;
