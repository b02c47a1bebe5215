use super::{mismatch, synthetic_id, Records, Transform};
use crate::bio::{Annotation, Strand};
use crate::formats::{Document, FileFormat, Gff3Feature};
use crate::Result;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Gff3Transformer {
    job_id: String,
}

impl Gff3Transformer {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into() }
    }

    fn annotation(&self, feature: &Gff3Feature) -> Annotation {
        let feature_id = feature
            .attributes
            .get_str("ID")
            .map(str::to_string)
            .unwrap_or_else(|| synthetic_id(&feature.seqid, feature.start, feature.end));

        Annotation::new(
            self.job_id.clone(),
            feature_id,
            feature.feature_type.clone(),
            feature.seqid.clone(),
            feature.start,
            feature.end,
            Strand::from_symbol(&feature.strand),
        )
        .with_attributes(feature.attributes.clone())
    }
}

impl Transform for Gff3Transformer {
    fn format(&self) -> FileFormat {
        FileFormat::Gff3
    }

    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn transform(&self, document: &Document) -> Result<Records> {
        let Document::Gff3(doc) = document else {
            return Err(mismatch(FileFormat::Gff3, document));
        };

        let mut annotations = Vec::with_capacity(doc.features.len());
        let mut skipped = 0usize;
        for feature in &doc.features {
            if feature.attributes.is_empty() {
                skipped += 1;
                continue;
            }
            annotations.push(self.annotation(feature));
        }

        if skipped > 0 {
            warn!(skipped, "Skipped GFF3 features without attributes");
        }

        Ok(Records::Annotations(annotations))
    }
}
