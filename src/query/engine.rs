//! Query engine: filtering, sorting, paging and range lookups over a
//! repository, with an optional FIFO result cache.
//!
//! The engine is synchronous and holds its cache by value. Methods that may
//! touch the cache take `&mut self`; a host that shares one engine across
//! threads must wrap it in its own lock (e.g. `parking_lot::Mutex`).

use super::cache::{CacheKey, CacheStats, ResultCache};
use super::condition::{ConditionSet, Field, Operator, QueryCondition};
use super::options::{QueryOptions, QueryResult, SortSpec};
use crate::bio::Annotation;
use crate::config::QueryConfig;
use crate::storage::AnnotationRepository;
use crate::{BaktaError, Result};
use tracing::debug;

pub struct QueryEngine<R> {
    repository: R,
    cache: Option<ResultCache>,
    default_limit: Option<usize>,
}

impl<R: AnnotationRepository> QueryEngine<R> {
    /// Engine with the default query configuration (cache enabled).
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, &QueryConfig::default())
    }

    pub fn with_config(repository: R, config: &QueryConfig) -> Self {
        Self {
            repository,
            cache: config.enable_cache.then(|| ResultCache::new(config.cache_size)),
            default_limit: config.default_limit,
        }
    }

    pub fn without_cache(repository: R) -> Self {
        Self {
            repository,
            cache: None,
            default_limit: None,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResultCache::stats)
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    /// Drops cached pages for one job, e.g. after importing more records.
    pub fn invalidate_job(&mut self, job_id: &str) {
        if let Some(cache) = self.cache.as_mut() {
            cache.invalidate_job(job_id);
        }
    }

    /// One page of matching annotations plus the unpaged total.
    ///
    /// Cached pages are returned as stored; writes made to the repository
    /// after a page was cached are not seen until the entry is evicted or
    /// invalidated.
    pub fn get_annotations(&mut self, job_id: &str, options: &QueryOptions) -> Result<QueryResult> {
        let mut options = options.clone();
        if options.limit.is_none() {
            options.limit = self.default_limit;
        }

        options.filter.compile()?;
        if let Some(sort) = &options.sort {
            Field::resolve(&sort.field, false)?;
        }

        let key = self.cache.as_ref().map(|_| CacheKey::new(job_id, &options));
        if let (Some(cache), Some(key)) = (self.cache.as_mut(), key.as_ref()) {
            if let Some(hit) = cache.get(key) {
                debug!(job_id, "Query cache hit");
                return Ok(hit.clone());
            }
            debug!(job_id, "Query cache miss");
        }

        let items = self
            .repository
            .query_annotations(job_id, &options.filter, options.sort.as_ref(), options.limit, options.offset)
            .map_err(|e| BaktaError::query_failed(job_id, "query_annotations", e))?;
        let total = self
            .repository
            .count_annotations(job_id, &options.filter)
            .map_err(|e| BaktaError::query_failed(job_id, "count_annotations", e))?;

        let result = QueryResult {
            items,
            total,
            limit: options.limit,
            offset: options.offset,
        };

        if let (Some(cache), Some(key)) = (self.cache.as_mut(), key) {
            cache.insert(key, result.clone());
        }

        Ok(result)
    }

    /// Annotations on `contig` overlapping the closed window `[start, end]`,
    /// sorted by start. Not paged.
    pub fn get_annotations_in_range(
        &self,
        job_id: &str,
        contig: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Annotation>> {
        let filter = range_conditions(contig, start, end);
        let sort = SortSpec::ascending("start");

        self.repository
            .query_annotations(job_id, &filter, Some(&sort), None, 0)
            .map_err(|e| BaktaError::query_failed(job_id, "query_annotations", e))
    }

    pub fn get_feature_types(&self, job_id: &str) -> Result<Vec<String>> {
        self.repository
            .get_feature_types(job_id)
            .map_err(|e| BaktaError::query_failed(job_id, "get_feature_types", e))
    }

    /// Uncached count, optionally restricted to one feature type.
    pub fn count_annotations(&self, job_id: &str, feature_type: Option<&str>) -> Result<usize> {
        let mut filter = ConditionSet::default();
        if let Some(feature_type) = feature_type {
            filter.push(QueryCondition::new("feature_type", Operator::Eq, feature_type));
        }
        self.repository
            .count_annotations(job_id, &filter)
            .map_err(|e| BaktaError::query_failed(job_id, "count_annotations", e))
    }
}

/// `contig == C AND start <= E AND end >= S`.
pub fn range_conditions(contig: &str, start: i64, end: i64) -> ConditionSet {
    ConditionSet::all(vec![
        QueryCondition::new("contig", Operator::Eq, contig),
        QueryCondition::new("start", Operator::Le, end),
        QueryCondition::new("end", Operator::Ge, start),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::Strand;
    use crate::storage::InMemoryRepository;

    fn engine() -> QueryEngine<InMemoryRepository> {
        let repo = InMemoryRepository::new();
        let annotations: Vec<Annotation> = (1..=5)
            .map(|i| Annotation::new("job", format!("f{}", i), "CDS", "c1", i * 100, i * 100 + 50, Strand::Forward))
            .collect();
        repo.save_annotations("job", &annotations).unwrap();
        QueryEngine::new(repo)
    }

    #[test]
    fn test_page_and_total() {
        let mut engine = engine();
        let result = engine
            .get_annotations("job", &QueryOptions::new().sort(SortSpec::descending("start")).limit(2).offset(1))
            .unwrap();
        assert_eq!(result.total, 5);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].feature_id, "f4");
        assert!(result.has_more());
    }

    #[test]
    fn test_cached_result_is_returned() {
        let mut engine = engine();
        let options = QueryOptions::new().limit(3);
        let first = engine.get_annotations("job", &options).unwrap();
        let second = engine.get_annotations("job", &options).unwrap();
        assert_eq!(first, second);

        let stats = engine.cache_stats().unwrap();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_usage_error_is_not_query_failure() {
        let mut engine = engine();
        let options = QueryOptions::new().filter(QueryCondition::new("start", Operator::Contains, "1"));
        assert!(matches!(
            engine.get_annotations("job", &options),
            Err(BaktaError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_range() {
        let engine = engine();
        let items = engine.get_annotations_in_range("job", "c1", 250, 300).unwrap();
        let ids: Vec<&str> = items.iter().map(|a| a.feature_id.as_str()).collect();
        assert_eq!(ids, vec!["f2", "f3"]);
        assert!(engine.get_annotations_in_range("job", "c2", 0, 1000).unwrap().is_empty());
    }

    #[test]
    fn test_counts_and_types() {
        let engine = engine();
        assert_eq!(engine.count_annotations("job", None).unwrap(), 5);
        assert_eq!(engine.count_annotations("job", Some("tRNA")).unwrap(), 0);
        assert_eq!(engine.get_feature_types("job").unwrap(), vec!["CDS"]);
    }
}
