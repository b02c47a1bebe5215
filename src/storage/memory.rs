//! In-process repository backed by `parking_lot` locks.

use super::traits::AnnotationRepository;
use crate::bio::{Annotation, Sequence};
use crate::query::{paginate, sort_annotations, ConditionSet, SortSpec};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default)]
struct JobRecords {
    annotations: Vec<Annotation>,
    sequences: Vec<Sequence>,
}

/// Evaluates the query algebra directly over stored records. Unknown jobs
/// behave as empty.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    jobs: RwLock<HashMap<String, JobRecords>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<String> {
        let mut jobs: Vec<String> = self.jobs.read().keys().cloned().collect();
        jobs.sort();
        jobs
    }

    pub fn sequences(&self, job_id: &str) -> Vec<Sequence> {
        self.jobs
            .read()
            .get(job_id)
            .map(|records| records.sequences.clone())
            .unwrap_or_default()
    }

    pub fn annotation_count(&self, job_id: &str) -> usize {
        self.jobs
            .read()
            .get(job_id)
            .map(|records| records.annotations.len())
            .unwrap_or(0)
    }

    fn matching(&self, job_id: &str, filter: &ConditionSet) -> Result<Vec<Annotation>> {
        let compiled = filter.compile()?;
        let jobs = self.jobs.read();
        Ok(jobs
            .get(job_id)
            .map(|records| {
                records
                    .annotations
                    .iter()
                    .filter(|a| compiled.matches(a))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl AnnotationRepository for InMemoryRepository {
    fn query_annotations(
        &self,
        job_id: &str,
        filter: &ConditionSet,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Annotation>> {
        let mut items = self.matching(job_id, filter)?;
        if let Some(spec) = sort {
            sort_annotations(&mut items, spec)?;
        }
        Ok(paginate(items, limit, offset))
    }

    fn count_annotations(&self, job_id: &str, filter: &ConditionSet) -> Result<usize> {
        if filter.is_empty() {
            return Ok(self.annotation_count(job_id));
        }
        Ok(self.matching(job_id, filter)?.len())
    }

    fn get_feature_types(&self, job_id: &str) -> Result<Vec<String>> {
        let jobs = self.jobs.read();
        let types: BTreeSet<&str> = jobs
            .get(job_id)
            .map(|records| records.annotations.iter().map(|a| a.feature_type.as_str()).collect())
            .unwrap_or_default();
        Ok(types.into_iter().map(str::to_string).collect())
    }

    fn save_annotations(&self, job_id: &str, annotations: &[Annotation]) -> Result<()> {
        self.jobs
            .write()
            .entry(job_id.to_string())
            .or_default()
            .annotations
            .extend_from_slice(annotations);
        Ok(())
    }

    fn save_sequences(&self, job_id: &str, sequences: &[Sequence]) -> Result<()> {
        self.jobs
            .write()
            .entry(job_id.to_string())
            .or_default()
            .sequences
            .extend_from_slice(sequences);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::Strand;
    use crate::query::{Operator, QueryCondition};

    fn sample() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let annotations = vec![
            Annotation::new("job", "g1", "gene", "c1", 300, 400, Strand::Forward),
            Annotation::new("job", "t1", "tRNA", "c1", 100, 150, Strand::Reverse),
            Annotation::new("job", "g2", "gene", "c2", 10, 90, Strand::Forward),
        ];
        repo.save_annotations("job", &annotations).unwrap();
        repo
    }

    #[test]
    fn test_query_sort_and_page() {
        let repo = sample();
        let filter = ConditionSet::all(vec![QueryCondition::new("feature_type", Operator::Eq, "gene")]);
        let items = repo
            .query_annotations("job", &filter, Some(&SortSpec::ascending("start")), Some(1), 0)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].feature_id, "g2");
        assert_eq!(repo.count_annotations("job", &filter).unwrap(), 2);
    }

    #[test]
    fn test_feature_types_sorted_distinct() {
        let repo = sample();
        assert_eq!(repo.get_feature_types("job").unwrap(), vec!["gene", "tRNA"]);
        assert!(repo.get_feature_types("other").unwrap().is_empty());
    }

    #[test]
    fn test_saves_are_additive() {
        let repo = sample();
        let again = repo.query_annotations("job", &ConditionSet::default(), None, None, 0).unwrap();
        repo.save_annotations("job", &again).unwrap();
        assert_eq!(repo.count_annotations("job", &ConditionSet::default()).unwrap(), 6);
        assert_eq!(repo.jobs(), vec!["job"]);
    }

    #[test]
    fn test_invalid_filter_is_error() {
        let repo = sample();
        let filter = ConditionSet::all(vec![QueryCondition::new("nope", Operator::Eq, "x")]);
        assert!(repo.count_annotations("job", &filter).is_err());
    }
}
