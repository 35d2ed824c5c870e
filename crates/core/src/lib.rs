//! Core types and shared functionality for merinfo-lookup.
//!
//! This crate provides:
//! - Domain model (queries, raw responses, person records)
//! - Unified error types
//! - Configuration structures
//! - Response cache with SQLite backend

pub mod cache;
pub mod config;
pub mod error;
pub mod model;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError, SelectorConfig};
pub use error::{Error, FetchError, ParseError};
pub use model::{Gender, PersonRecord, Query, RawResponse, ResultSet};
