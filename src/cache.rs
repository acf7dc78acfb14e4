//! Response cache module
//!
//! Stores computed responses keyed by a per-target cache key, so a cached
//! target runs its pipeline at most once per key until explicitly cleared.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

/// One computed response: MIME type, optional charset, and content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub mime_type: String,
    pub charset: Option<String>,
    pub content: Bytes,
}

/// Key-value store scoped to one middleware instance.
///
/// No eviction and no expiry: entries live until explicitly cleared or the
/// process ends. Concurrent first requests for the same key each run their
/// pipeline and each store the result; the last write wins. The store does
/// not de-duplicate in-flight computations.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone out the entry for `key`, if present.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Store or replace the entry for `key`.
    pub fn put(&self, key: String, entry: CacheEntry) {
        self.entries.lock().unwrap().insert(key, entry);
    }

    /// Remove the entry for `key`. Clearing an absent key is a no-op.
    pub fn clear(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}
