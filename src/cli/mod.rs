pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bakta-query",
    version,
    about = "Parse, normalize and query Bakta annotation results",
    long_about = "bakta-query reads Bakta result files (GFF3, TSV, JSON, EMBL, GenBank, FASTA), \
                  normalizes their features into one annotation model and answers filtered, \
                  sorted, paginated and range queries over them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (defaults to ~/.bakta-query/config.toml if present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported result formats and their file extensions
    Formats(commands::formats::FormatsArgs),

    /// Parse one result file and print the intermediate document
    Parse(commands::parse::ParseArgs),

    /// Filter, sort and page annotations from result files
    Query(commands::query::QueryArgs),

    /// Annotations overlapping a contig window
    Range(commands::range::RangeArgs),

    /// Feature type counts for result files
    Summary(commands::summary::SummaryArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["bakta-query", "-vv", "-j", "4", "formats"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, 4);
        assert!(matches!(cli.command, Commands::Formats(_)));
    }
}
