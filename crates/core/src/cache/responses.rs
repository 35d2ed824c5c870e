//! Raw response cache operations.
//!
//! Entries are keyed by the normalized query and replaced on every `put`.
//! Nothing expires on its own; entries stay until [`CacheDb::clear`].

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::{Error, Query, RawResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Row as stored, before conversion back into domain types.
struct StoredResponse {
    first_name: String,
    last_name: String,
    city: String,
    url: String,
    status: i64,
    html: String,
    fetched_at: String,
    fetch_ms: i64,
}

impl StoredResponse {
    fn into_response(self) -> Result<RawResponse, Error> {
        let fetched_at = DateTime::parse_from_rfc3339(&self.fetched_at)
            .map_err(|e| Error::InvalidTimestamp(format!("{}: {e}", self.fetched_at)))?
            .with_timezone(&Utc);
        let status = u16::try_from(self.status)
            .map_err(|_| Error::InvalidInput(format!("stored status out of range: {}", self.status)))?;

        Ok(RawResponse {
            query: Query::new(&self.first_name, &self.last_name, &self.city)?,
            url: self.url,
            status,
            html: self.html,
            fetched_at,
            fetch_ms: self.fetch_ms.max(0) as u64,
        })
    }
}

impl CacheDb {
    /// Look up the cached response for a query.
    ///
    /// Returns None on a miss.
    pub async fn get(&self, query: &Query) -> Result<Option<RawResponse>, Error> {
        let key_hash = compute_cache_key(query);
        let stored = self
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT first_name, last_name, city, url, status, html, fetched_at, fetch_ms
                    FROM responses WHERE key_hash = ?1",
                )?;

                let result = stmt.query_row(params![key_hash], |row| {
                    Ok(StoredResponse {
                        first_name: row.get(0)?,
                        last_name: row.get(1)?,
                        city: row.get(2)?,
                        url: row.get(3)?,
                        status: row.get(4)?,
                        html: row.get(5)?,
                        fetched_at: row.get(6)?,
                        fetch_ms: row.get(7)?,
                    })
                });

                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        stored.map(StoredResponse::into_response).transpose()
    }

    /// Store a response under the query's key, replacing any previous entry.
    pub async fn put(&self, query: &Query, response: &RawResponse) -> Result<(), Error> {
        let key_hash = compute_cache_key(query);
        let response = response.clone();
        let fetched_at = response.fetched_at.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let fetch_ms = i64::try_from(response.fetch_ms).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO responses (
                    key_hash, first_name, last_name, city, url, status, html, fetched_at, fetch_ms
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(key_hash) DO UPDATE SET
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    city = excluded.city,
                    url = excluded.url,
                    status = excluded.status,
                    html = excluded.html,
                    fetched_at = excluded.fetched_at,
                    fetch_ms = excluded.fetch_ms",
                    params![
                        key_hash,
                        response.query.first_name(),
                        response.query.last_name(),
                        response.query.city(),
                        response.url,
                        response.status,
                        response.html,
                        fetched_at,
                        fetch_ms,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every cached response.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM responses", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached responses.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
