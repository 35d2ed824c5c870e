//! SQLite-backed cache for raw search responses.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Keys derived from the normalized query using SHA-256 hashing
//! - Automatic schema migrations
//! - Write-through upserts with no automatic eviction
//! - Manual clearing

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod responses;

pub use crate::Error;

pub use connection::CacheDb;
