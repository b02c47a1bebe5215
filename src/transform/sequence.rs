use super::{mismatch, Records, Transform};
use crate::bio::Sequence;
use crate::formats::{Document, FileFormat};
use crate::Result;

/// FASTA entries to [`Sequence`] records. Length is always recomputed.
#[derive(Debug, Clone)]
pub struct SequenceTransformer {
    job_id: String,
}

impl SequenceTransformer {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into() }
    }
}

impl Transform for SequenceTransformer {
    fn format(&self) -> FileFormat {
        FileFormat::Fasta
    }

    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn transform(&self, document: &Document) -> Result<Records> {
        let Document::Fasta(doc) = document else {
            return Err(mismatch(FileFormat::Fasta, document));
        };

        Ok(Records::Sequences(
            doc.entries
                .iter()
                .map(|entry| Sequence::new(self.job_id.clone(), entry.header.clone(), entry.sequence.clone()))
                .collect(),
        ))
    }
}
