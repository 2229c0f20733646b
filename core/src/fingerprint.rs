//! Cache keys derived from a request's url and parameters.
//!
//! The key is the hex SHA-256 of the url and the canonical JSON of the
//! parameters. `Params` is a `BTreeMap`, so two descriptors that differ only
//! in insertion order produce the same key. The method is not part of the key.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::types::Params;

/// Deterministic cache key for a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for `url` + `params`.
pub fn fingerprint(url: &str, params: &Params) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    // Serializing a map of scalars cannot fail.
    if let Ok(canonical) = serde_json::to_vec(params) {
        hasher.update(&canonical);
    }
    CacheKey(hex::encode(hasher.finalize()))
}
