//! The shared content-addressed cache.
//!
//! A single in-process store shared across every session. It is not
//! required to be strongly consistent -- a stale hit within TTL is
//! acceptable. Expiry is checked lazily on read rather than swept by a
//! background task, which keeps the store a plain `RwLock<HashMap>` with
//! no extra driving task to shut down.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::DEFAULT_TTL;

struct Entry {
    value: Value,
    expires_at: Instant,
    size_bytes: usize,
}

/// Point-in-time counts returned by [`Cache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size_bytes: usize,
    pub item_count: usize,
}

/// TTL-tiered, content-addressed cache. Cheap to clone -- clones share the
/// same backing store, matching how a single instance is constructed once
/// at boundary bootstrap and handed to every session.
#[derive(Clone)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch a value if present and not expired. An expired entry is
    /// treated as a miss; it is lazily evicted on the next `set` or
    /// `clear` rather than here, since `get` only needs a read lock.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries.get(key).filter(|entry| entry.expires_at > Instant::now()).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key` with the given TTL (use
    /// [`crate::domain::CacheDomain::ttl`] to pick one, or [`DEFAULT_TTL`]
    /// for uncategorized entries).
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let size_bytes = serde_json::to_vec(&value).map(|bytes| bytes.len()).unwrap_or(0);
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
                size_bytes,
            },
        );
    }

    /// Store with the default TTL.
    pub async fn set_default(&self, key: impl Into<String>, value: Value) {
        self.set(key, value, DEFAULT_TTL).await;
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Live (non-expired) entry count and their total serialized size.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let now = Instant::now();
        let mut item_count = 0;
        let mut size_bytes = 0;
        for entry in entries.values() {
            if entry.expires_at > now {
                item_count += 1;
                size_bytes += entry.size_bytes;
            }
        }
        CacheStats { size_bytes, item_count }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_after_set_within_ttl_hits() {
        let cache = Cache::new();
        cache.set("k", json!({"a": 1}), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_get_beyond_ttl_misses() {
        let cache = Cache::new();
        cache.set("k", json!(1), Duration::from_millis(0)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = Cache::new();
        cache.set("k", json!(1), Duration::from_secs(60)).await;
        assert!(cache.delete("k").await);
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_stats_counts_only_live_entries() {
        let cache = Cache::new();
        cache.set("live", json!(1), Duration::from_secs(60)).await;
        cache.set("dead", json!(1), Duration::from_millis(0)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let stats = cache.stats().await;
        assert_eq!(stats.item_count, 1);
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let cache = Cache::new();
        cache.set("k", json!(1), Duration::from_secs(60)).await;
        cache.clear().await;
        assert_eq!(cache.stats().await.item_count, 0);
    }

    #[tokio::test]
    async fn test_clone_shares_backing_store() {
        let cache = Cache::new();
        let clone = cache.clone();
        cache.set("k", json!(1), Duration::from_secs(60)).await;
        assert_eq!(clone.get("k").await, Some(json!(1)));
    }
}
