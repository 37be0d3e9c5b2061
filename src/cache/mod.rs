//! In-memory TTL cache for remote query results.
//!
//! Backs the cached-query layer so dashboard widgets don't refetch the same
//! tables on every render. Entries expire lazily on read (no sweeper task)
//! and the cache is capacity-bounded: inserting at capacity evicts the
//! oldest-inserted entry. Eviction is deliberately insertion-ordered rather
//! than least-recently-used; call sites depend on that exact policy.

pub mod query;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;
use regex::Regex;
use serde::Serialize;

/// Capacity and expiry knobs for a [`TtlCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of live entries before insertion evicts the oldest.
    pub max_entries: usize,
    /// Expiry applied by [`TtlCache::set`] when no per-entry TTL is given.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            default_ttl: Duration::from_secs(300),
        }
    }
}

struct CacheEntry<T> {
    data: T,
    stored_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }
}

struct CacheInner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    /// Keys in insertion order. May contain keys already removed from
    /// `entries` (by expiry or invalidation); eviction skips those.
    insertion_order: VecDeque<String>,
}

impl<T> CacheInner<T> {
    fn evict_oldest(&mut self) {
        while let Some(candidate) = self.insertion_order.pop_front() {
            if self.entries.remove(&candidate).is_some() {
                debug!("cache evicted oldest entry '{candidate}'");
                return;
            }
        }
    }
}

/// Diagnostic snapshot of a cache, classified against the current time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
    pub hit_rate_estimate: f64,
}

/// Generic key→value store with per-entry expiry and capacity-bounded
/// insertion-order eviction.
///
/// Interior-locked: a single instance is shared by reference across the
/// application. None of the operations fail.
pub struct TtlCache<T> {
    inner: Mutex<CacheInner<T>>,
    config: CacheConfig,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            config,
        }
    }

    /// Store `data` under `key` with the configured default TTL.
    pub fn set(&self, key: &str, data: T) {
        self.set_with_ttl(key, data, self.config.default_ttl);
    }

    /// Store `data` under `key` with an explicit TTL.
    ///
    /// At capacity the single oldest-inserted entry is evicted first.
    /// Overwriting an existing key keeps its original insertion position.
    pub fn set_with_ttl(&self, key: &str, data: T, ttl: Duration) {
        let mut inner = self.inner.lock().unwrap();

        if inner.entries.len() >= self.config.max_entries {
            inner.evict_oldest();
        }

        if !inner.entries.contains_key(key) {
            inner.insertion_order.push_back(key.to_string());
        }
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Return the stored value if present and not expired. Expired entries
    /// are removed as a side effect of the read.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return None,
        };

        if expired {
            inner.entries.remove(key);
            return None;
        }

        inner.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Delete every key that contains `pattern` as a substring.
    pub fn invalidate(&self, pattern: &str) {
        self.invalidate_where(|key| key.contains(pattern));
    }

    /// Delete every key that matches the regular expression.
    pub fn invalidate_matching(&self, pattern: &Regex) {
        self.invalidate_where(|key| pattern.is_match(key));
    }

    /// Delete every key the predicate accepts.
    pub fn invalidate_where(&self, predicate: impl Fn(&str) -> bool) {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !predicate(key));
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!("cache invalidated {removed} entries");
        }
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.insertion_order.clear();
    }

    /// Current entry count, including expired-but-not-yet-swept entries.
    pub fn size(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Scan all entries and classify each against the current time.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();

        let total = inner.entries.len();
        let expired = inner
            .entries
            .values()
            .filter(|entry| entry.is_expired())
            .count();
        let valid = total - expired;
        let hit_rate_estimate = if total == 0 {
            0.0
        } else {
            valid as f64 / total as f64
        };

        CacheStats {
            total,
            valid,
            expired,
            hit_rate_estimate,
        }
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
