use super::{mismatch, Records, Transform};
use crate::bio::Annotation;
use crate::formats::{Document, FileFormat, FlatFileFeature};
use crate::Result;

/// Qualifiers tried, in order, for the feature id.
const ID_QUALIFIERS: &[&str] = &["locus_tag", "gene", "product"];

/// Shared EMBL / GenBank transformer. Contig names come from each record's
/// header, strand from the location's `complement(...)` wrapper.
#[derive(Debug, Clone)]
pub struct FlatFileTransformer {
    job_id: String,
    format: FileFormat,
}

impl FlatFileTransformer {
    pub fn embl(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            format: FileFormat::Embl,
        }
    }

    pub fn genbank(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            format: FileFormat::GenBank,
        }
    }

    fn feature_id(feature: &FlatFileFeature, ordinal: usize) -> String {
        ID_QUALIFIERS
            .iter()
            .find_map(|key| feature.qualifiers.get_str(key))
            .map(str::to_string)
            .unwrap_or_else(|| format!("feature_{}", ordinal))
    }
}

impl Transform for FlatFileTransformer {
    fn format(&self) -> FileFormat {
        self.format
    }

    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn transform(&self, document: &Document) -> Result<Records> {
        let doc = match (self.format, document) {
            (FileFormat::Embl, Document::Embl(doc)) | (FileFormat::GenBank, Document::GenBank(doc)) => doc,
            _ => return Err(mismatch(self.format, document)),
        };

        let annotations = doc
            .features()
            .enumerate()
            .map(|(i, (record, feature))| {
                Annotation::new(
                    self.job_id.clone(),
                    Self::feature_id(feature, i + 1),
                    feature.feature_type.clone(),
                    record.contig.clone(),
                    feature.start,
                    feature.end,
                    feature.strand,
                )
                .with_attributes(feature.qualifiers.clone())
            })
            .collect();

        Ok(Records::Annotations(annotations))
    }
}
