use crate::metrics::MetricsCollector;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A cached value and the instant it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

type Slot<T> = Arc<tokio::sync::Mutex<Option<CacheEntry<T>>>>;

/// Per-key memoisation with a freshness window.
///
/// Each key owns an async slot lock held across the fetch, so concurrent
/// misses on the same key run the fetcher once and the others wait for its
/// result. Entries are only dropped by [`TtlCache::invalidate`] or
/// [`TtlCache::purge_expired`]; there is no size bound.
pub struct TtlCache<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
    metrics: Option<MetricsCollector>,
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            metrics: None,
        }
    }

    pub fn with_metrics(metrics: MetricsCollector) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            metrics: Some(metrics),
        }
    }

    fn slot(&self, key: &str) -> Slot<T> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Returns the fresh value for `key`, or runs `fetcher` and stores its result.
    ///
    /// A failed fetch leaves any stale entry in place but does not serve it.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref().filter(|e| e.is_fresh(ttl)) {
            debug!(key, "Cache hit");
            self.record(true);
            return Ok(cached.value.clone());
        }

        debug!(key, stale = entry.is_some(), "Cache miss");
        self.record(false);

        let value = fetcher().await?;
        *entry = Some(CacheEntry::new(value.clone()));
        Ok(value)
    }

    /// Fresh value for `key` without fetching
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<T> {
        let slot = self.slot(key);
        let entry = slot.lock().await;
        entry.as_ref().filter(|e| e.is_fresh(ttl)).map(|e| e.value.clone())
    }

    pub fn invalidate(&self, key: &str) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(key).is_some()
    }

    /// Drops expired and empty slots; slots with a fetch in flight are kept.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let initial_count = slots.len();

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry.as_ref().is_some_and(|e| e.is_fresh(ttl)),
            Err(_) => true,
        });

        initial_count - slots.len()
    }

    /// Number of tracked keys, expired ones included.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, hit: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_cache(hit);
        }
    }
}
