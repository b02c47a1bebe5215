//! Document-to-record transformers.
//!
//! A transformer is bound to a job id and turns one parsed [`Document`] into
//! canonical [`Annotation`] or [`Sequence`] records. Transformers are pure;
//! they hold no state besides the job id.

use crate::bio::{Annotation, Sequence};
use crate::formats::{Document, FileFormat};
use crate::{BaktaError, Result};

pub mod flatfile;
pub mod gff3;
pub mod json;
pub mod sequence;
pub mod tsv;

pub use flatfile::FlatFileTransformer;
pub use gff3::Gff3Transformer;
pub use json::JsonTransformer;
pub use sequence::SequenceTransformer;
pub use tsv::TsvTransformer;

/// Output of a transformer: FASTA yields sequences, every other format annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Annotations(Vec<Annotation>),
    Sequences(Vec<Sequence>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Annotations(items) => items.len(),
            Records::Sequences(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_annotations(self) -> Vec<Annotation> {
        match self {
            Records::Annotations(items) => items,
            Records::Sequences(_) => Vec::new(),
        }
    }

    pub fn into_sequences(self) -> Vec<Sequence> {
        match self {
            Records::Sequences(items) => items,
            Records::Annotations(_) => Vec::new(),
        }
    }
}

pub trait Transform: Send + Sync {
    fn format(&self) -> FileFormat;

    fn job_id(&self) -> &str;

    /// Fails with a transform error when `document` is not of this
    /// transformer's format or lacks required keys.
    fn transform(&self, document: &Document) -> Result<Records>;
}

pub(crate) fn mismatch(expected: FileFormat, document: &Document) -> BaktaError {
    BaktaError::transform(
        expected,
        format!("expected a {} document, got {}", expected, document.format()),
    )
}

/// Transformer lookup by format.
pub fn transformer_for(format: FileFormat, job_id: impl Into<String>) -> Box<dyn Transform> {
    let job_id = job_id.into();
    match format {
        FileFormat::Gff3 => Box::new(Gff3Transformer::new(job_id)),
        FileFormat::Tsv => Box::new(TsvTransformer::new(job_id)),
        FileFormat::Json => Box::new(JsonTransformer::new(job_id)),
        FileFormat::Embl => Box::new(FlatFileTransformer::embl(job_id)),
        FileFormat::GenBank => Box::new(FlatFileTransformer::genbank(job_id)),
        FileFormat::Fasta => Box::new(SequenceTransformer::new(job_id)),
    }
}

/// Transformer lookup by format name or file-type label (`gbff`, `faa`, ...).
pub fn transformer_for_format(format_name: &str, job_id: impl Into<String>) -> Result<Box<dyn Transform>> {
    let format = FileFormat::from_name(format_name)?;
    Ok(transformer_for(format, job_id))
}

/// `{contig}_{start}_{end}`, used when a feature carries no identifier.
pub(crate) fn synthetic_id(contig: &str, start: i64, end: i64) -> String {
    format!("{}_{}_{}", contig, start, end)
}
