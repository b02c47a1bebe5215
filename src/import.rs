//! Result file → parser → transformer → repository.

use crate::config::ImportConfig;
use crate::formats::{parser_for_format, FileFormat, Source};
use crate::storage::AnnotationRepository;
use crate::transform::{transformer_for, Records};
use crate::{BaktaError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub files: usize,
    pub annotations: usize,
    pub sequences: usize,
}

impl AddAssign for ImportReport {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.annotations += other.annotations;
        self.sequences += other.sequences;
    }
}

/// Parses and transforms one input without touching storage.
pub fn load_records(job_id: &str, format: FileFormat, source: Source) -> Result<Records> {
    let parser = parser_for_format(format, source);
    let document = parser.parse()?;
    debug!(format = %format, entries = document.entry_count(), "Parsed document");
    transformer_for(format, job_id).transform(document)
}

pub struct Importer<'a, R: ?Sized> {
    repository: &'a R,
    config: ImportConfig,
}

impl<'a, R: AnnotationRepository + ?Sized> Importer<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self::with_config(repository, ImportConfig::default())
    }

    pub fn with_config(repository: &'a R, config: ImportConfig) -> Self {
        Self { repository, config }
    }

    /// Format is taken from the file extension (`.gz` allowed).
    pub fn import_file<P: AsRef<Path>>(&self, job_id: &str, path: P) -> Result<ImportReport> {
        let path = path.as_ref();
        let records = Self::load_path(job_id, path)?;
        let report = self.save(job_id, records)?;
        info!(
            file = %path.display(),
            annotations = report.annotations,
            sequences = report.sequences,
            "Imported result file"
        );
        Ok(report)
    }

    pub fn import_content(&self, job_id: &str, format_name: &str, content: impl Into<String>) -> Result<ImportReport> {
        let format = FileFormat::from_name(format_name)?;
        let records = load_records(job_id, format, Source::Content(content.into()))?;
        self.save(job_id, records)
    }

    /// Loads all files (in parallel when configured) and saves them in
    /// input order. Nothing is saved if any file fails to load.
    pub fn import_files<P: AsRef<Path> + Sync>(&self, job_id: &str, paths: &[P]) -> Result<ImportReport> {
        let loaded: Vec<Records> = if self.config.parallel {
            paths
                .par_iter()
                .map(|path| Self::load_path(job_id, path.as_ref()))
                .collect::<Result<Vec<_>>>()?
        } else {
            paths
                .iter()
                .map(|path| Self::load_path(job_id, path.as_ref()))
                .collect::<Result<Vec<_>>>()?
        };

        let mut report = ImportReport::default();
        for records in loaded {
            report += self.save(job_id, records)?;
        }

        info!(
            job_id,
            files = report.files,
            annotations = report.annotations,
            sequences = report.sequences,
            "Import complete"
        );
        Ok(report)
    }

    fn load_path(job_id: &str, path: &Path) -> Result<Records> {
        let format = FileFormat::from_path(path)?;
        load_records(job_id, format, Source::Path(PathBuf::from(path)))
    }

    fn save(&self, job_id: &str, records: Records) -> Result<ImportReport> {
        let storage_error = |e: anyhow::Error| BaktaError::Storage(format!("{:#}", e));
        let mut report = ImportReport {
            files: 1,
            ..ImportReport::default()
        };

        match records {
            Records::Annotations(annotations) => {
                for batch in annotations.chunks(self.config.batch_size.max(1)) {
                    self.repository.save_annotations(job_id, batch).map_err(storage_error)?;
                }
                report.annotations = annotations.len();
            }
            Records::Sequences(sequences) => {
                self.repository.save_sequences(job_id, &sequences).map_err(storage_error)?;
                report.sequences = sequences.len();
            }
        }
        Ok(report)
    }
}
