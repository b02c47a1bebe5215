use super::InputArgs;
use crate::cli::output::*;
use crate::config::Config;
use crate::export::{write_json, write_tsv};
use crate::query::QueryResult;
use clap::Args;
use std::io;

#[derive(Args)]
pub struct RangeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Contig (sequence) identifier
    #[arg(short, long)]
    pub contig: String,

    /// Window start (inclusive)
    #[arg(long)]
    pub start: i64,

    /// Window end (inclusive)
    #[arg(long)]
    pub end: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub fn run(args: RangeArgs, config: &Config) -> anyhow::Result<()> {
    if args.start > args.end {
        warning(&format!(
            "Window start {} is after end {}; nothing can overlap it",
            args.start, args.end
        ));
    }

    let loaded = args.input.load(config, args.output == OutputFormat::Text)?;
    let items = loaded
        .engine
        .get_annotations_in_range(&loaded.job_id, &args.contig, args.start, args.end)?;

    match args.output {
        OutputFormat::Json => {
            let result = QueryResult {
                total: items.len(),
                items,
                limit: None,
                offset: 0,
            };
            write_json(io::stdout().lock(), &result)?;
        }
        OutputFormat::Tsv => write_tsv(io::stdout().lock(), &items)?,
        OutputFormat::Text => {
            section_header_with_line(&format!("{}:{}-{}", args.contig, args.start, args.end));
            if items.is_empty() {
                empty("No annotations overlap this window");
            } else {
                println!("{}", annotation_table(&items));
                success(&format!("{} overlapping annotations", format_number(items.len())));
            }
        }
    }
    Ok(())
}
