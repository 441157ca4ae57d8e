use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetrics {
    pub total_requests: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub retries: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub requests: HashMap<String, RequestMetrics>,
    pub cache: CacheMetrics,
}

#[derive(Debug, Default)]
struct Inner {
    requests: HashMap<String, RequestMetrics>,
    cache: CacheMetrics,
}

/// In-process counters for API traffic and cache effectiveness.
///
/// Cheap to clone; clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<RwLock<Inner>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner(&self, f: impl FnOnce(&mut Inner)) {
        // A poisoned lock only means a panicking writer; counters stay usable.
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut inner);
    }

    pub fn record_request(&self, path: &str, succeeded: bool) {
        self.with_inner(|inner| {
            let metrics = inner.requests.entry(path.to_string()).or_default();
            metrics.total_requests += 1;
            if succeeded {
                metrics.succeeded += 1;
            } else {
                metrics.failed += 1;
            }
        });
    }

    pub fn record_retry(&self, path: &str) {
        self.with_inner(|inner| {
            inner.requests.entry(path.to_string()).or_default().retries += 1;
        });
    }

    pub fn record_cache(&self, hit: bool) {
        self.with_inner(|inner| {
            if hit {
                inner.cache.hits += 1;
            } else {
                inner.cache.misses += 1;
            }
        });
    }

    pub fn get_path_metrics(&self, path: &str) -> Option<RequestMetrics> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.requests.get(path).cloned()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        MetricsSnapshot {
            requests: inner.requests.clone(),
            cache: inner.cache.clone(),
        }
    }

    pub fn reset(&self) {
        self.with_inner(|inner| *inner = Inner::default());
    }
}
