pub mod bio;
pub mod cli;
pub mod config;
pub mod export;
pub mod formats;
pub mod import;
pub mod query;
pub mod storage;
pub mod transform;

pub use crate::bio::{Annotation, AttributeValue, Attributes, Sequence, Strand};
pub use crate::formats::{parse_file, parser_for_format, Document, FileFormat, Parse, Source};
pub use crate::import::{ImportReport, Importer};
pub use crate::query::{
    ConditionSet, LogicalOperator, Operator, QueryCondition, QueryEngine, QueryOptions,
    QueryResult, QueryValue, SortOrder, SortSpec,
};
pub use crate::storage::{AnnotationRepository, InMemoryRepository};
pub use crate::transform::{transformer_for_format, Records, Transform};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaktaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Failed to parse {format} input: {message}")]
    Parse { format: String, message: String },

    #[error("Failed to transform {format} document: {message}")]
    Transform { format: String, message: String },

    #[error("Query failed for job '{job_id}' during {operation}: {message}")]
    QueryFailed {
        job_id: String,
        operation: String,
        message: String,
    },

    #[error("Unsupported format '{requested}' (valid options: {valid})")]
    UnsupportedFormat { requested: String, valid: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BaktaError {
    pub fn parse(format: impl ToString, message: impl ToString) -> Self {
        BaktaError::Parse {
            format: format.to_string(),
            message: message.to_string(),
        }
    }

    pub fn transform(format: impl ToString, message: impl ToString) -> Self {
        BaktaError::Transform {
            format: format.to_string(),
            message: message.to_string(),
        }
    }

    /// Wraps a repository failure, keeping the original message.
    pub fn query_failed(job_id: &str, operation: &str, cause: anyhow::Error) -> Self {
        BaktaError::QueryFailed {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
            message: format!("{:#}", cause),
        }
    }
}

pub type Result<T> = std::result::Result<T, BaktaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BaktaError::parse("json", "expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "Failed to parse json input: expected value at line 1 column 1"
        );

        let err = BaktaError::UnsupportedFormat {
            requested: "xyz".to_string(),
            valid: ".gff, .gff3".to_string(),
        };
        assert!(err.to_string().contains("valid options: .gff, .gff3"));
    }

    #[test]
    fn test_query_failed_keeps_cause() {
        let cause = anyhow::anyhow!("connection refused");
        let err = BaktaError::query_failed("job-1", "count_annotations", cause);

        match &err {
            BaktaError::QueryFailed {
                job_id,
                operation,
                message,
            } => {
                assert_eq!(job_id, "job-1");
                assert_eq!(operation, "count_annotations");
                assert_eq!(message, "connection refused");
            }
            _ => panic!("Expected QueryFailed variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.gff3");
        let err: BaktaError = io_err.into();
        assert!(matches!(err, BaktaError::Io(_)));
    }
}
