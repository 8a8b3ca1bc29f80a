//! Memory Store Module
//!
//! Default in-process expiring store: HashMap storage with LRU capacity
//! eviction and lazy policy expiration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::policy::ExpirationPolicy;
use crate::store::{ExpiringStore, LruTracker, StoreEntry, StoreStats, StoredItem};

// == Memory Store ==
/// Thread-safe expiring store kept entirely in process memory.
///
/// Expired items are dropped lazily whenever they are looked up, and in bulk
/// by [`MemoryStore::cleanup_expired`] (see [`crate::tasks::spawn_cleanup_task`]).
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    items: HashMap<String, StoredItem>,
    /// Recency of evictable keys only
    lru: LruTracker,
    stats: StoreStats,
    /// 0 = unbounded
    max_entries: usize,
}

impl MemoryStore {
    /// Creates a store holding at most `max_entries` items (0 = unbounded).
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                items: HashMap::new(),
                lru: LruTracker::new(),
                stats: StoreStats::new(),
                max_entries,
            }),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries)
    }

    // == Stats ==
    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.items.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes every expired item, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        self.inner.lock().cleanup_expired(Utc::now())
    }

    /// Drops every item without touching the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.items.clear();
        inner.lru.clear();
    }

    /// Number of items held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl StoreInner {
    /// Drops `key` if it is present and expired. Returns true if dropped.
    fn expire_if_due(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        let due = self
            .items
            .get(key)
            .is_some_and(|item| item.is_expired_at(now));

        if due {
            self.items.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            debug!(key, "Expired entry dropped on access");
        }
        due
    }

    fn cleanup_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .items
            .iter()
            .filter(|(_, item)| item.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.items.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// Makes room for one more item, if the store is bounded and full.
    fn make_room(&mut self) {
        if self.max_entries == 0 || self.items.len() < self.max_entries {
            return;
        }

        match self.lru.evict_oldest() {
            Some(victim) => {
                self.items.remove(&victim);
                self.stats.record_eviction();
                debug!(key = %victim, "Evicted least recently used entry");
            }
            None => warn!(
                max_entries = self.max_entries,
                "Store full of non-removable entries, exceeding capacity"
            ),
        }
    }
}

impl ExpiringStore for MemoryStore {
    fn contains(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        !inner.expire_if_due(key, Utc::now()) && inner.items.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<StoreEntry> {
        let now = Utc::now();
        let mut inner = self.inner.lock();

        if inner.expire_if_due(key, now) {
            inner.stats.record_miss();
            return None;
        }

        let StoreInner {
            items, lru, stats, ..
        } = &mut *inner;

        match items.get_mut(key) {
            Some(item) => {
                item.touch(now);
                if item.is_evictable() {
                    lru.touch(key);
                }
                stats.record_hit();
                Some(item.entry.clone())
            }
            None => {
                stats.record_miss();
                None
            }
        }
    }

    fn add(&self, key: &str, entry: StoreEntry, policy: ExpirationPolicy) -> bool {
        let now = Utc::now();
        let mut inner = self.inner.lock();

        inner.expire_if_due(key, now);
        if inner.items.contains_key(key) {
            return false;
        }

        inner.make_room();

        let item = StoredItem::new(entry, policy, now);
        if item.is_evictable() {
            inner.lru.touch(key);
        }
        inner.items.insert(key.to_string(), item);
        true
    }

    fn remove(&self, key: &str) -> Option<StoreEntry> {
        let mut inner = self.inner.lock();
        inner.lru.remove(key);
        inner.items.remove(key).map(|item| item.entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::CachePriority;
    use std::sync::Arc;
    use std::thread::sleep;
    use std::time::Duration;

    fn entry(value: &str) -> StoreEntry {
        Arc::new(value.to_string())
    }

    fn read(store: &MemoryStore, key: &str) -> Option<String> {
        store
            .get(key)
            .and_then(|e| e.downcast_ref::<String>().cloned())
    }

    #[test]
    fn test_store_add_and_get() {
        let store = MemoryStore::new(100);

        assert!(store.add("key1", entry("value1"), ExpirationPolicy::no_expiration()));
        assert_eq!(read(&store, "key1").as_deref(), Some("value1"));
        assert!(store.contains("key1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_add_keeps_existing() {
        let store = MemoryStore::new(100);

        assert!(store.add("key1", entry("first"), ExpirationPolicy::no_expiration()));
        assert!(!store.add("key1", entry("second"), ExpirationPolicy::no_expiration()));
        assert_eq!(read(&store, "key1").as_deref(), Some("first"));
    }

    #[test]
    fn test_store_remove() {
        let store = MemoryStore::new(100);

        store.add("key1", entry("value1"), ExpirationPolicy::no_expiration());
        assert!(store.remove("key1").is_some());
        assert!(store.remove("key1").is_none());
        assert!(!store.contains("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_absolute_expiration() {
        let store = MemoryStore::new(100);
        let past = Utc::now() - chrono::Duration::seconds(1);

        store.add("gone", entry("v"), ExpirationPolicy::absolute(past));
        assert!(!store.contains("gone"));
        assert!(store.get("gone").is_none());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_expired_key_can_be_re_added() {
        let store = MemoryStore::new(100);
        let past = Utc::now() - chrono::Duration::seconds(1);

        store.add("key", entry("old"), ExpirationPolicy::absolute(past));
        assert!(store.add("key", entry("new"), ExpirationPolicy::no_expiration()));
        assert_eq!(read(&store, "key").as_deref(), Some("new"));
    }

    #[test]
    fn test_store_sliding_expiration() {
        let store = MemoryStore::new(100);
        store.add(
            "idle",
            entry("v"),
            ExpirationPolicy::sliding(Duration::from_millis(300)),
        );

        sleep(Duration::from_millis(150));
        assert!(store.get("idle").is_some(), "Read should extend the window");
        sleep(Duration::from_millis(200));
        assert!(store.get("idle").is_some());

        sleep(Duration::from_millis(400));
        assert!(store.get("idle").is_none());
    }

    #[test]
    fn test_store_lru_eviction() {
        let store = MemoryStore::new(3);

        store.add("key1", entry("1"), ExpirationPolicy::no_expiration());
        store.add("key2", entry("2"), ExpirationPolicy::no_expiration());
        store.add("key3", entry("3"), ExpirationPolicy::no_expiration());

        // key1 becomes most recently used, key2 is now oldest
        store.get("key1");
        store.add("key4", entry("4"), ExpirationPolicy::no_expiration());

        assert_eq!(store.len(), 3);
        assert!(store.contains("key1"));
        assert!(!store.contains("key2"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_never_evicts_not_removable() {
        let store = MemoryStore::new(2);
        let pinned = ExpirationPolicy::no_expiration().with_priority(CachePriority::NotRemovable);

        store.add("pinned", entry("p"), pinned);
        store.add("a", entry("a"), ExpirationPolicy::no_expiration());
        store.add("b", entry("b"), ExpirationPolicy::no_expiration());

        assert!(store.contains("pinned"));
        assert!(!store.contains("a"));
        assert!(store.contains("b"));
    }

    #[test]
    fn test_store_unbounded() {
        let store = MemoryStore::unbounded();
        for i in 0..500 {
            store.add(&format!("k{i}"), entry("v"), ExpirationPolicy::no_expiration());
        }
        assert_eq!(store.len(), 500);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_stats() {
        let store = MemoryStore::new(100);

        store.add("key1", entry("value1"), ExpirationPolicy::no_expiration());
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = MemoryStore::new(100);
        let past = Utc::now() - chrono::Duration::seconds(1);

        store.add("stale", entry("1"), ExpirationPolicy::absolute(past));
        store.add("fresh", entry("2"), ExpirationPolicy::no_expiration());

        assert_eq!(store.len(), 2);
        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains("fresh"));
    }

    #[test]
    fn test_store_clear() {
        let store = MemoryStore::new(100);
        store.add("a", entry("1"), ExpirationPolicy::no_expiration());
        store.clear();
        assert!(store.is_empty());
    }
}
