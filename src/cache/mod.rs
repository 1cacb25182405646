//! Caller-owned analysis cache.
//!
//! A bounded LRU side table keyed by a CRC32 fingerprint of the input and
//! the options it was analyzed with. Entries keep the full input and are
//! compared on lookup, so a fingerprint collision is a miss, never a wrong
//! answer. Dropping or clearing the cache only costs latency.

use std::collections::HashMap;

use crc32fast::Hasher;
use tracing::debug;

use crate::analyzer::AnalysisResult;

/// Default number of cached analyses
pub const DEFAULT_CAPACITY: usize = 128;

#[derive(Debug, Clone)]
struct Entry {
    input: String,
    options: u32,
    result: AnalysisResult,
    last_used: u64,
}

/// LRU cache of [`AnalysisResult`]s
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    entries: HashMap<u32, Entry>,
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// CRC32 of content and options fingerprint
pub fn fingerprint(input: &str, options: u32) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(input.as_bytes());
    hasher.update(&options.to_le_bytes());
    hasher.finalize()
}

impl AnalysisCache {
    /// Create a cache holding at most `capacity` results (0 disables it)
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached result for `input` analyzed under `options`
    pub fn get(&mut self, input: &str, options: u32) -> Option<AnalysisResult> {
        self.tick += 1;
        let tick = self.tick;
        let key = fingerprint(input, options);
        match self.entries.get_mut(&key) {
            Some(entry) if entry.input == input && entry.options == options => {
                entry.last_used = tick;
                self.hits += 1;
                debug!(key, "analysis cache hit");
                Some(entry.result.clone())
            },
            _ => {
                self.misses += 1;
                None
            },
        }
    }

    /// Store a result, evicting the least recently used entry when full
    pub fn insert(&mut self, input: &str, options: u32, result: AnalysisResult) {
        if self.capacity == 0 {
            return;
        }
        self.tick += 1;
        let key = fingerprint(input, options);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| *k)
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            Entry {
                input: input.to_string(),
                options,
                result,
                last_used: self.tick,
            },
        );
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of results
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that fell through
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;

    fn result_for(input: &str) -> AnalysisResult {
        Analyzer::default().detect(input).unwrap()
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = AnalysisCache::new(4);
        assert!(cache.get("SGk=", 1).is_none());
        cache.insert("SGk=", 1, result_for("SGk="));
        assert!(cache.get("SGk=", 1).is_some());
        // Same content under other options is a different entry
        assert!(cache.get("SGk=", 2).is_none());
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = AnalysisCache::new(2);
        let result = result_for("abc");
        cache.insert("a", 0, result.clone());
        cache.insert("b", 0, result.clone());
        // Touch "a" so "b" is the eviction victim
        assert!(cache.get("a", 0).is_some());
        cache.insert("c", 0, result);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a", 0).is_some());
        assert!(cache.get("b", 0).is_none());
        assert!(cache.get("c", 0).is_some());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = AnalysisCache::new(0);
        cache.insert("a", 0, result_for("a"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fingerprint_depends_on_options() {
        assert_ne!(fingerprint("x", 1), fingerprint("x", 2));
        assert_eq!(fingerprint("x", 1), fingerprint("x", 1));
    }
}
