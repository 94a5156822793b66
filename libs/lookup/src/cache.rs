//! Bounded LRU lookup cache
//!
//! `get` never populates the cache: population is the caller's job after a
//! successful catalog or store lookup, which keeps the cache agnostic of where
//! values come from. Keys are plain strings so one cache can front several
//! lookup kinds when callers namespace them (`drug:warfarin`, `patient:id:42`).

use crate::error::{Error, Result};
use crate::metrics::{CacheRecorder, CacheStats};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct LookupCache<V> {
    // A hit reorders recency, so reads need exclusive access too.
    inner: Mutex<LruCache<String, V>>,
    capacity: NonZeroUsize,
    metrics: CacheRecorder,
}

impl<V: Clone> LookupCache<V> {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::InvalidCapacity)?;
        Ok(Self {
            inner: Mutex::new(LruCache::new(capacity)),
            capacity,
            metrics: CacheRecorder::default(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Look up `key`, returning the value and whether it was a hit.
    pub fn get(&self, key: &str) -> (Option<V>, bool) {
        let value = self.lock().get(key).cloned();
        let hit = value.is_some();
        if hit {
            self.metrics.hits.incr();
        } else {
            self.metrics.misses.incr();
        }
        tracing::trace!(key, hit, "Lookup cache get");
        (value, hit)
    }

    /// Insert or refresh `key`. At capacity the least recently used entry is evicted first.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let displaced = self.lock().push(key.clone(), value);

        // `push` also hands back the old value when `key` was already present.
        if let Some((evicted, _)) = displaced {
            if evicted != key {
                self.metrics.evictions.incr();
                tracing::trace!(evicted = %evicted, "Lookup cache eviction");
            }
        }
    }

    /// Insert `key` only if `still_valid` holds while the cache lock is held.
    ///
    /// Invalidation takes the same lock, so a value whose source was replaced
    /// before the check is never stored, and one replaced after it is dropped
    /// by the invalidation that follows.
    pub fn put_if(
        &self,
        key: impl Into<String>,
        value: V,
        still_valid: impl FnOnce() -> bool,
    ) -> bool {
        let key = key.into();
        let mut cache = self.lock();
        if !still_valid() {
            tracing::trace!(key = %key, "Lookup cache put skipped for stale value");
            return false;
        }
        if let Some((evicted, _)) = cache.push(key.clone(), value) {
            if evicted != key {
                self.metrics.evictions.incr();
                tracing::trace!(evicted = %evicted, "Lookup cache eviction");
            }
        }
        true
    }

    /// Drop every entry whose key starts with `prefix`, returning how many were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut cache = self.lock();
        let stale: Vec<String> = cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            cache.pop(key.as_str());
        }
        stale.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::new(&self.metrics, self.len(), self.capacity())
    }
}

impl<V> std::fmt::Debug for LookupCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let err = LookupCache::<u32>::new(0).unwrap_err();
        assert!(matches!(err, Error::InvalidCapacity));
        assert!(err.is_validation());
    }

    #[test]
    fn test_miss_does_not_populate() {
        let cache = LookupCache::<u32>::new(4).unwrap();
        assert_eq!(cache.get("drug:aspirin"), (None, false));
        assert!(cache.is_empty());
        assert_eq!(cache.get("drug:aspirin"), (None, false));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_hit_rate_for_fixed_trace() {
        let cache = LookupCache::new(8).unwrap();
        // get a (miss), put a, get a (hit), get b (miss), put b, get b (hit), get a (hit)
        cache.get("a");
        cache.put("a", 1);
        cache.get("a");
        cache.get("b");
        cache.put("b", 2);
        cache.get("b");
        cache.get("a");

        let stats = cache.stats();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 2);
        assert!((stats.hit_rate - 0.6).abs() < 1e-12);
        assert_eq!(stats.size, 2);
        assert_eq!(stats.capacity, 8);
    }

    #[test]
    fn test_lru_eviction_follows_access_recency() {
        let cache = LookupCache::new(2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), (Some(1), true));

        cache.put("c", 3);
        assert_eq!(cache.get("b"), (None, false));
        assert_eq!(cache.get("a"), (Some(1), true));
        assert_eq!(cache.get("c"), (Some(3), true));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_is_not_an_eviction() {
        let cache = LookupCache::new(2).unwrap();
        cache.put("a", 1);
        cache.put("a", 10);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get("a"), (Some(10), true));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_if_skips_stale_values() {
        let cache = LookupCache::new(2).unwrap();
        assert!(!cache.put_if("drug:a", 1, || false));
        assert_eq!(cache.get("drug:a"), (None, false));

        assert!(cache.put_if("drug:a", 2, || true));
        assert_eq!(cache.get("drug:a"), (Some(2), true));
    }

    #[test]
    fn test_keys_by_recency_and_invalidate_prefix() {
        let cache = LookupCache::new(4).unwrap();
        cache.put("drug:a", 1);
        cache.put("code:x", 2);
        cache.put("drug:b", 3);
        cache.get("drug:a");

        assert_eq!(cache.keys_by_recency(), vec!["drug:a", "drug:b", "code:x"]);
        assert_eq!(cache.invalidate_prefix("drug:"), 2);
        assert_eq!(cache.keys_by_recency(), vec!["code:x"]);
    }
}
