//! In-memory response cache keyed by request fingerprint.
//!
//! Unbounded and never expiring: entries are only ever overwritten by a newer
//! successful response for the same key, and live as long as the owning
//! `Api`. Concurrent writers for one key resolve last-write-wins.

use dashmap::DashMap;

use crate::fingerprint::CacheKey;
use crate::http::HttpResponse;

#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<CacheKey, HttpResponse>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<HttpResponse> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn set(&self, key: CacheKey, response: HttpResponse) {
        self.entries.insert(key, response);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
