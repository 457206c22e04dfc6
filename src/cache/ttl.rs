//! Time-to-live cache
//!
//! A key → (value, timestamp) map behind a single coarse lock. Expiry is
//! checked on every read, so a stale entry is never returned even if no
//! sweep has run; [`TtlCache::sweep`] only reclaims memory.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// A stored value with the time it was stored
#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    stored_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.stored_at > ttl
    }
}

/// Point-in-time counters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries physically present, expired or not
    pub entries: usize,
    /// Entries present but older than the TTL
    pub expired: usize,
    pub ttl_secs: i64,
}

/// Mutex-guarded cache with a fixed time-to-live
///
/// Values are shared with readers as `Arc<V>`; an entry is never mutated in
/// place, only replaced or removed.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl<V> TtlCache<V> {
    /// Creates an unbounded cache
    ///
    /// # Arguments
    ///
    /// * `ttl` - Maximum age after which an entry is treated as absent
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Duration;
    /// use site_digest::TtlCache;
    ///
    /// let cache: TtlCache<String> = TtlCache::new(Duration::minutes(15));
    /// cache.set("key", "value".to_string());
    /// assert_eq!(cache.get("key").as_deref(), Some(&"value".to_string()));
    /// ```
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: None,
        }
    }

    /// Caps the number of entries; inserting into a full cache evicts the oldest
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the value stored under `key` if it has not expired
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.get_at(key, Utc::now())
    }

    /// Lookup against an explicit clock reading
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<V>> {
        let entries = self.lock();
        let entry = entries.get(key)?;

        if entry.is_expired(self.ttl, now) {
            tracing::debug!("Cache entry '{}' expired", key);
            return None;
        }

        Some(Arc::clone(&entry.value))
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub fn set(&self, key: impl Into<String>, value: V) -> Arc<V> {
        self.insert_at(key, value, Utc::now())
    }

    /// Stores `value` with an explicit timestamp
    pub fn insert_at(&self, key: impl Into<String>, value: V, stored_at: DateTime<Utc>) -> Arc<V> {
        let key = key.into();
        let value = Arc::new(value);
        let mut entries = self.lock();

        if let Some(max) = self.max_entries {
            while entries.len() >= max && !entries.contains_key(&key) {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(oldest) => {
                        tracing::debug!("Evicting oldest cache entry '{}'", oldest);
                        entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                stored_at,
            },
        );
        value
    }

    /// Removes every expired entry, returning how many were removed
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl, now));
        before - entries.len()
    }

    /// Drops the entry for `key`, returning whether one existed
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries physically present, including expired ones
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.lock();
        CacheStats {
            entries: entries.len(),
            expired: entries
                .values()
                .filter(|entry| entry.is_expired(self.ttl, now))
                .count(),
            ttl_secs: self.ttl.num_seconds(),
        }
    }
}

impl<V: Send + Sync + 'static> TtlCache<V> {
    /// Starts a background task that sweeps the cache every `interval`
    ///
    /// The task holds only a weak reference and ends once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: std::time::Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(cache) = cache.upgrade() else {
                    break;
                };

                let removed = cache.sweep();
                if removed > 0 {
                    tracing::debug!("Swept {} expired cache entries", removed);
                }
            }
        })
    }
}
