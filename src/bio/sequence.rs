use serde::Serialize;

/// Raw nucleotide or protein record from a FASTA result file.
///
/// `length` is derived from `sequence` at construction and cannot be set
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Sequence {
    pub job_id: String,
    pub header: String,
    sequence: String,
    length: usize,
}

impl Sequence {
    pub fn new(job_id: impl Into<String>, header: impl Into<String>, sequence: impl Into<String>) -> Self {
        let sequence = sequence.into();
        Self {
            job_id: job_id.into(),
            header: header.into(),
            length: sequence.len(),
            sequence,
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// First whitespace-delimited token of the header.
    pub fn id(&self) -> &str {
        self.header.split_whitespace().next().unwrap_or("")
    }
}
