pub mod formats;
pub mod parse;
pub mod query;
pub mod range;
pub mod summary;

use crate::config::Config;
use crate::import::{ImportReport, Importer};
use crate::query::QueryEngine;
use crate::storage::InMemoryRepository;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

/// Result files shared by the query-style commands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Bakta result files (format taken from the extension, `.gz` allowed)
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Job identifier to import under (random UUID if omitted)
    #[arg(long)]
    pub job: Option<String>,
}

/// Imported inputs ready to be queried.
pub struct Loaded {
    pub job_id: String,
    pub report: ImportReport,
    pub engine: QueryEngine<Arc<InMemoryRepository>>,
}

impl InputArgs {
    pub fn job_id(&self) -> String {
        self.job
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    /// Imports every file into a fresh in-memory repository.
    pub fn load(&self, config: &Config, show_progress: bool) -> anyhow::Result<Loaded> {
        let job_id = self.job_id();
        let repository = Arc::new(InMemoryRepository::new());

        let spinner = if show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")?,
        );
        spinner.set_message(format!("Importing {} file(s)...", self.files.len()));

        let report = Importer::with_config(&*repository, config.import.clone())
            .import_files(&job_id, &self.files);

        let report = match report {
            Ok(report) => report,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e.into());
            }
        };
        spinner.finish_with_message(format!(
            "Imported {} annotations and {} sequences",
            crate::cli::output::format_number(report.annotations),
            crate::cli::output::format_number(report.sequences),
        ));

        Ok(Loaded {
            engine: QueryEngine::with_config(repository, &config.query),
            job_id,
            report,
        })
    }
}
