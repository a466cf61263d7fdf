//! Advisory key/value cache with per-entry TTL.
//!
//! The cache is an optimization only: reads that fail degrade to a miss and
//! writes that fail are logged and dropped. Nothing here returns an error.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Key/value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Fetch a live entry. Misses and internal faults both return `None`.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store an entry for `ttl`. Best effort.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);

    /// Drop an entry. Best effort.
    async fn delete(&self, key: &str);

    /// Whether the backend is reachable.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Read and decode a JSON entry. Undecodable entries count as a miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = cache.get(key).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => {
            debug!("{} cache hit for {}", cache.name(), key);
            Some(value)
        }
        Err(e) => {
            warn!("Discarding undecodable {} cache entry {}: {}", cache.name(), key, e);
            None
        }
    }
}

/// Encode and store a JSON entry.
pub async fn set_json<T: Serialize>(cache: &dyn CacheStore, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_vec(value) {
        Ok(bytes) => cache.set(key, bytes, ttl).await,
        Err(e) => warn!("Skipping cache write for {}: {}", key, e),
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Volatile in-process cache.
///
/// When full, expired entries are purged first, then the entry closest to
/// expiry is evicted.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, including ones that have expired but not
    /// yet been purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn make_room(entries: &mut HashMap<String, CacheEntry>, max_entries: usize, now: DateTime<Utc>) {
        if entries.len() < max_entries {
            return;
        }

        entries.retain(|_, e| e.is_live(now));

        while entries.len() >= max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    debug!("Evicting cache entry {}", key);
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if !entry.is_live(Utc::now()) {
            debug!("Cache expired for {}", key);
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let ttl = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!("Skipping cache write for {}: bad ttl: {}", key, e);
                return;
            }
        };

        let now = Utc::now();
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            Self::make_room(&mut entries, self.max_entries, now);
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Test double that records traffic and can be switched into a failing mode.
#[cfg(test)]
pub struct MockCache {
    inner: MemoryCache,
    pub broken: std::sync::atomic::AtomicBool,
    pub gets: std::sync::atomic::AtomicUsize,
    pub sets: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::default(),
            broken: std::sync::atomic::AtomicBool::new(false),
            gets: std::sync::atomic::AtomicUsize::new(0),
            sets: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn broken() -> Self {
        let cache = Self::new();
        cache.broken.store(true, std::sync::atomic::Ordering::SeqCst);
        cache
    }

    fn is_broken(&self) -> bool {
        self.broken.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl CacheStore for MockCache {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.gets.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.is_broken() {
            return None;
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        self.sets.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.is_broken() {
            return;
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) {
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> bool {
        !self.is_broken()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::default();
        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).await;

        assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::default();
        cache.set("k", b"v".to_vec(), Duration::ZERO).await;

        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::default();
        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).await;
        cache.delete("k").await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_soonest_expiring() {
        let cache = MemoryCache::new(2);
        cache.set("short", b"1".to_vec(), Duration::from_secs(10)).await;
        cache.set("long", b"2".to_vec(), Duration::from_secs(1000)).await;
        cache.set("new", b"3".to_vec(), Duration::from_secs(100)).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("short").await, None);
        assert!(cache.get("long").await.is_some());
        assert!(cache.get("new").await.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = MemoryCache::new(2);
        cache.set("a", b"1".to_vec(), Duration::from_secs(10)).await;
        cache.set("b", b"2".to_vec(), Duration::from_secs(10)).await;
        cache.set("a", b"3".to_vec(), Duration::from_secs(10)).await;

        assert_eq!(cache.get("a").await, Some(b"3".to_vec()));
        assert!(cache.get("b").await.is_some());
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let cache = MemoryCache::default();
        set_json(&cache, "nums", &vec![1, 2, 3], Duration::from_secs(60)).await;

        let nums: Option<Vec<u32>> = get_json(&cache, "nums").await;
        assert_eq!(nums, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = MemoryCache::default();
        cache.set("bad", b"not json".to_vec(), Duration::from_secs(60)).await;

        let value: Option<Vec<u32>> = get_json(&cache, "bad").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_broken_mock_degrades_to_miss() {
        let cache = MockCache::broken();
        set_json(&cache, "k", &1u32, Duration::from_secs(60)).await;

        let value: Option<u32> = get_json(&cache, "k").await;
        assert!(value.is_none());
        assert!(!cache.health_check().await);
    }
}
