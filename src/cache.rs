//! Bounded in-memory caches for analysis results.
//!
//! The caches are a service owned by the analyzer rather than ambient
//! process state, so tests get isolation and capacity is explicit. Eviction
//! is size-bound in insertion order; entries otherwise live for the process
//! lifetime.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use crate::types::{Explanation, RepoAnalysis, RepoMeta};

pub const DEFAULT_ANALYSIS_CAPACITY: usize = 64;
pub const DEFAULT_FILE_CAPACITY: usize = 1024;

/// Everything `analyze` learned about one repository, reused by the other
/// operations to avoid re-fetching the tree.
#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub result: RepoAnalysis,
    pub file_paths: Vec<String>,
    pub readme: String,
    pub meta: RepoMeta,
}

struct CacheInner<V> {
    map: HashMap<String, V>,
    order: VecDeque<String>,
}

/// A string-keyed map that drops its oldest entry once full.
///
/// The lock is only held for point reads and writes, never across an await,
/// so concurrent requests cannot observe a mid-update state.
pub struct BoundedCache<V> {
    capacity: usize,
    inner: RwLock<CacheInner<V>>,
}

impl<V: Clone> BoundedCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.read().map.get(key).cloned()
    }

    pub fn insert(&self, key: String, value: V) {
        let mut inner = self.inner.write();
        if inner.map.insert(key.clone(), value).is_none() {
            inner.order.push_back(key);
            while inner.order.len() > self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.map.remove(&oldest);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two caches the analyzer works against: full analyses keyed by
/// `owner/repo`, file explanations keyed by `owner/repo:path`.
pub struct AnalysisCaches {
    pub analyses: BoundedCache<CachedAnalysis>,
    pub file_explanations: BoundedCache<Explanation>,
}

impl AnalysisCaches {
    pub fn new(analysis_capacity: usize, file_capacity: usize) -> Self {
        Self {
            analyses: BoundedCache::new(analysis_capacity),
            file_explanations: BoundedCache::new(file_capacity),
        }
    }
}

impl Default for AnalysisCaches {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_CAPACITY, DEFAULT_FILE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_inserted_value() {
        let cache = BoundedCache::new(4);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn evicts_oldest_entry_at_capacity() {
        let cache = BoundedCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn overwriting_a_key_does_not_grow_the_cache() {
        let cache = BoundedCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("a".to_string(), 2);
        cache.insert("b".to_string(), 3);
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.get("b"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let cache = BoundedCache::new(0);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.len(), 1);
    }
}
