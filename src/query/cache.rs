//! FIFO result cache.

use super::options::{QueryOptions, QueryResult};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    job_id: String,
    fingerprint: String,
}

impl CacheKey {
    /// Keyed on the job plus filters, combinator, sort, limit and offset.
    pub fn new(job_id: &str, options: &QueryOptions) -> Self {
        let fingerprint = serde_json::to_string(options).unwrap_or_else(|_| format!("{:?}", options));
        Self {
            job_id: job_id.to_string(),
            fingerprint,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Insertion-ordered map; once full, the oldest insertion is evicted.
/// Reads do not refresh an entry's position.
#[derive(Debug)]
pub struct ResultCache {
    entries: IndexMap<CacheKey, QueryResult>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity.min(1024)),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<&QueryResult> {
        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                Some(result)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// A capacity of zero stores nothing.
    pub fn insert(&mut self, key: CacheKey, result: QueryResult) {
        if self.capacity == 0 {
            return;
        }
        self.entries.insert(key, result);
        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }

    pub fn invalidate_job(&mut self, job_id: &str) {
        self.entries.retain(|key, _| key.job_id != job_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryCondition;
    use crate::query::Operator;

    fn result(total: usize) -> QueryResult {
        QueryResult {
            items: Vec::new(),
            total,
            limit: None,
            offset: 0,
        }
    }

    fn key(job: &str, contig: &str) -> CacheKey {
        CacheKey::new(job, &QueryOptions::new().filter(QueryCondition::new("contig", Operator::Eq, contig)))
    }

    #[test]
    fn test_fifo_eviction() {
        let mut cache = ResultCache::new(2);
        cache.insert(key("j", "a"), result(1));
        cache.insert(key("j", "b"), result(2));
        assert!(cache.get(&key("j", "a")).is_some());

        cache.insert(key("j", "c"), result(3));
        assert_eq!(cache.len(), 2);
        // Reading "a" did not protect it.
        assert!(cache.get(&key("j", "a")).is_none());
        assert_eq!(cache.get(&key("j", "c")).map(|r| r.total), Some(3));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[test]
    fn test_keys_distinguish_page() {
        let base = QueryOptions::new().limit(10);
        assert_ne!(CacheKey::new("j", &base), CacheKey::new("j", &base.clone().offset(10)));
        assert_ne!(CacheKey::new("j", &base), CacheKey::new("k", &base));
        assert_eq!(CacheKey::new("j", &base), CacheKey::new("j", &base.clone()));
    }

    #[test]
    fn test_zero_capacity_and_invalidation() {
        let mut disabled = ResultCache::new(0);
        disabled.insert(key("j", "a"), result(1));
        assert!(disabled.is_empty());

        let mut cache = ResultCache::new(4);
        cache.insert(key("j", "a"), result(1));
        cache.insert(key("k", "a"), result(1));
        cache.invalidate_job("j");
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("k", "a")).is_some());
    }
}
