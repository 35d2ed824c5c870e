//! Cache key generation.

use sha2::{Digest, Sha256};

use crate::Query;

/// Compute the cache key for a query from its normalized fields.
///
/// Queries differing only in case or whitespace share a key.
pub fn compute_cache_key(query: &Query) -> String {
    let [first_name, last_name, city] = query.normalized();
    let mut hasher = Sha256::new();
    hasher.update(first_name.as_bytes());
    hasher.update(b"\n");
    hasher.update(last_name.as_bytes());
    hasher.update(b"\n");
    hasher.update(city.as_bytes());
    hex::encode(hasher.finalize())
}
