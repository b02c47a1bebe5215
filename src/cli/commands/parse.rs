use crate::cli::output::*;
use crate::formats::{parser_for_format, FileFormat, Source};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ParseArgs {
    /// Result file to parse
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Format name or label (gff3, tsv, json, embl, gbff, faa, ...); default from extension
    #[arg(short, long)]
    pub format: Option<String>,

    /// Only print a summary of the parsed document
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let format = match &args.format {
        Some(name) => FileFormat::from_name(name)?,
        None => FileFormat::from_path(&args.input)?,
    };

    let parser = parser_for_format(format, Source::Path(args.input.clone()));
    let document = parser.parse()?;

    if !args.summary {
        println!("{}", serde_json::to_string_pretty(document)?);
        return Ok(());
    }

    section_header_with_line("Parsed Document");
    tree_item(false, "File", Some(&args.input.display().to_string()));
    tree_item(false, "Format", Some(format.name()));
    let label = if format.produces_sequences() { "Sequences" } else { "Features" };
    tree_item(true, label, Some(&format_number(document.entry_count())));

    if document.entry_count() == 0 {
        empty("Document contains no entries");
    }
    Ok(())
}
