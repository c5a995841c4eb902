//! Route resolution caching
//!
//! Remembers which route index a path resolved to (or that it matched
//! nothing), so repeated pushes of the same path skip the linear walk over
//! earlier patterns. Entries are evicted least-recently-used first.

use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memo of `path -> route index`, `None` meaning "no route matched"
#[derive(Debug)]
pub struct RouteCache {
    entries: LruCache<String, Option<usize>>,
    stats: CacheStats,
}

impl RouteCache {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(Self::DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up a path
    ///
    /// The outer `Option` is the cache hit, the inner one the route index.
    pub fn get(&mut self, path: &str) -> Option<Option<usize>> {
        if let Some(index) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Route cache hit for '{}': {:?}", path, index);
            Some(*index)
        } else {
            self.stats.misses += 1;
            trace_log!("Route cache miss for '{}'", path);
            None
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, index: Option<usize>) {
        self.entries.put(path.into(), index);
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> RouteCache {
        RouteCache::with_capacity(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_cache_creation() {
        let cache = RouteCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), RouteCache::DEFAULT_CAPACITY);
        assert_eq!(*cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = cache(4);

        assert_eq!(cache.get("/home"), None);
        cache.insert("/home", Some(2));
        assert_eq!(cache.get("/home"), Some(Some(2)));

        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
        assert!((cache.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_results_are_cached() {
        let mut cache = cache(4);
        cache.insert("/missing", None);
        assert_eq!(cache.get("/missing"), Some(None));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = cache(2);
        cache.insert("/a", Some(0));
        cache.insert("/b", Some(1));
        // Touch /a so /b becomes least recently used
        assert!(cache.get("/a").is_some());
        cache.insert("/c", Some(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("/b").is_none());
        assert!(cache.get("/a").is_some());
        assert!(cache.get("/c").is_some());
    }

    #[test]
    fn test_reinsert_overwrites_entry() {
        let mut cache = cache(4);
        cache.insert("/a", None);
        cache.insert("/a", Some(3));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("/a"), Some(Some(3)));
    }
}
