//! Bounded LRU cache for resolved short links.
//!
//! Keyed by the raw short URL; values are the terminal URLs reached
//! after following redirects. Shared by every pipeline invocation, so
//! the `LruCache` sits behind a `tokio::sync::Mutex` - lookups promote
//! entries, which mutates the cache, so even reads need the lock.

use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

/// Default capacity of the short-URL cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Thread-safe bounded cache mapping short URLs to their expansions.
#[derive(Debug)]
pub struct UrlCache {
    entries: Mutex<LruCache<String, String>>,
}

impl UrlCache {
    /// Creates a cache with the given capacity (clamped to at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up a short URL, promoting the entry on hit.
    pub async fn get(&self, short_url: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let hit = entries.get(short_url).cloned();
        if hit.is_some() {
            debug!(short_url, "cache hit");
        }
        hit
    }

    /// Stores a resolved mapping, evicting the least-recently-used entry
    /// when at capacity.
    pub async fn insert(&self, short_url: String, final_url: String) {
        let mut entries = self.entries.lock().await;
        entries.put(short_url, final_url);
    }

    /// Returns the number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for UrlCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
