/// Storage adapter contract for annotation records.
///
/// Any backend (relational, document store, in-memory) that can filter,
/// sort and page annotations by job satisfies it. Failures are reported as
/// `anyhow::Error`; the query engine wraps them into a single query-failure
/// error carrying the job and operation.
use crate::bio::{Annotation, Sequence};
use crate::query::{ConditionSet, SortSpec};
use anyhow::Result;
use std::sync::Arc;

pub trait AnnotationRepository: Send + Sync {
    /// Matching annotations for `job_id`, sorted by `sort` (insertion order
    /// when `None`), then `offset`/`limit` applied.
    fn query_annotations(
        &self,
        job_id: &str,
        filter: &ConditionSet,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Annotation>>;

    /// Number of annotations matching `filter`, ignoring any page.
    fn count_annotations(&self, job_id: &str, filter: &ConditionSet) -> Result<usize>;

    /// Distinct feature types stored for `job_id`, sorted.
    fn get_feature_types(&self, job_id: &str) -> Result<Vec<String>>;

    /// Appends records; saving the same records twice stores them twice.
    fn save_annotations(&self, job_id: &str, annotations: &[Annotation]) -> Result<()>;

    fn save_sequences(&self, job_id: &str, sequences: &[Sequence]) -> Result<()>;
}

impl<T: AnnotationRepository + ?Sized> AnnotationRepository for &T {
    fn query_annotations(
        &self,
        job_id: &str,
        filter: &ConditionSet,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Annotation>> {
        (**self).query_annotations(job_id, filter, sort, limit, offset)
    }

    fn count_annotations(&self, job_id: &str, filter: &ConditionSet) -> Result<usize> {
        (**self).count_annotations(job_id, filter)
    }

    fn get_feature_types(&self, job_id: &str) -> Result<Vec<String>> {
        (**self).get_feature_types(job_id)
    }

    fn save_annotations(&self, job_id: &str, annotations: &[Annotation]) -> Result<()> {
        (**self).save_annotations(job_id, annotations)
    }

    fn save_sequences(&self, job_id: &str, sequences: &[Sequence]) -> Result<()> {
        (**self).save_sequences(job_id, sequences)
    }
}

impl<T: AnnotationRepository + ?Sized> AnnotationRepository for Arc<T> {
    fn query_annotations(
        &self,
        job_id: &str,
        filter: &ConditionSet,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Annotation>> {
        (**self).query_annotations(job_id, filter, sort, limit, offset)
    }

    fn count_annotations(&self, job_id: &str, filter: &ConditionSet) -> Result<usize> {
        (**self).count_annotations(job_id, filter)
    }

    fn get_feature_types(&self, job_id: &str) -> Result<Vec<String>> {
        (**self).get_feature_types(job_id)
    }

    fn save_annotations(&self, job_id: &str, annotations: &[Annotation]) -> Result<()> {
        (**self).save_annotations(job_id, annotations)
    }

    fn save_sequences(&self, job_id: &str, sequences: &[Sequence]) -> Result<()> {
        (**self).save_sequences(job_id, sequences)
    }
}
