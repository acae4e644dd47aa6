//! Word verdict cache with TTL expiry and LRU eviction.
//!
//! Entries older than the TTL are treated as absent. When the cache is full
//! the least recently used entry makes room for a new one.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_CAPACITY: usize = 500;
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub word: String,
    pub is_valid: bool,
    pub created_at: Instant,
    last_used: u64,
}

impl CacheEntry {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.created_at) >= ttl
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub expirations: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    // 使用順序：tick -> word，最小的 tick 最久沒用
    recency: BTreeMap<u64, String>,
    tick: u64,
    stats: CacheStats,
}

impl CacheInner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, word: &str) {
        let tick = self.next_tick();
        if let Some(entry) = self.entries.get_mut(word) {
            self.recency.remove(&entry.last_used);
            entry.last_used = tick;
            self.recency.insert(tick, word.to_string());
        }
    }

    fn remove(&mut self, word: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(word)?;
        self.recency.remove(&entry.last_used);
        Some(entry)
    }

    fn evict_lru(&mut self) -> bool {
        match self.recency.pop_first() {
            Some((_, word)) => {
                self.entries.remove(&word);
                self.stats.evictions += 1;
                tracing::debug!("Evicted '{}' from validation cache", word);
                true
            }
            None => false,
        }
    }
}

pub struct ValidationCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    ttl: Duration,
}

impl ValidationCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached verdict, or `None` when absent or expired.
    pub fn get(&self, word: &str) -> Option<bool> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let lookup = inner
            .entries
            .get(word)
            .map(|entry| (entry.is_valid, entry.is_expired(now, self.ttl)));

        let verdict = match lookup {
            Some((_, true)) => {
                inner.remove(word);
                inner.stats.expirations += 1;
                None
            }
            Some((is_valid, false)) => Some(is_valid),
            None => None,
        };

        match verdict {
            Some(_) => {
                inner.touch(word);
                inner.stats.hits += 1;
            }
            None => inner.stats.misses += 1,
        }
        verdict
    }

    /// Like `get`, but leaves recency and statistics untouched.
    pub fn peek(&self, word: &str) -> Option<bool> {
        let now = Instant::now();
        self.inner
            .lock()
            .entries
            .get(word)
            .filter(|entry| !entry.is_expired(now, self.ttl))
            .map(|entry| entry.is_valid)
    }

    /// Stores a verdict unless a fresh entry for the word is already present.
    /// Returns whether the verdict was written.
    pub fn insert_if_absent_or_stale(&self, word: &str, is_valid: bool) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        match inner.entries.get(word).map(|e| e.is_expired(now, self.ttl)) {
            Some(false) => return false,
            Some(true) => {
                inner.remove(word);
                inner.stats.expirations += 1;
            }
            None => {}
        }

        while inner.entries.len() >= self.capacity && inner.evict_lru() {}

        let tick = inner.next_tick();
        inner.entries.insert(
            word.to_string(),
            CacheEntry {
                word: word.to_string(),
                is_valid,
                created_at: now,
                last_used: tick,
            },
        );
        inner.recency.insert(tick, word.to_string());
        inner.stats.insertions += 1;
        true
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let expired: Vec<String> = inner
            .entries
            .values()
            .filter(|entry| entry.is_expired(now, self.ttl))
            .map(|entry| entry.word.clone())
            .collect();

        for word in &expired {
            inner.remove(word);
        }
        inner.stats.expirations += expired.len() as u64;
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
