use super::InputArgs;
use crate::cli::output::*;
use crate::config::Config;
use crate::export::{write_json, write_tsv};
use crate::query::{parse_condition, LogicalOperator, QueryOptions, QueryResult, SortSpec};
use clap::Args;
use std::io;

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Filter condition, e.g. `feature_type == CDS` or `attributes.product ~ kinase` (repeatable)
    #[arg(short = 'w', long = "where", value_name = "EXPR")]
    pub conditions: Vec<String>,

    /// Match any condition instead of all of them
    #[arg(long)]
    pub any: bool,

    /// Sort field (feature_id, feature_type, contig, start, end, strand or attributes.KEY)
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort in descending order
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of matching results to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl QueryArgs {
    pub fn options(&self) -> crate::Result<QueryOptions> {
        let mut options = QueryOptions::new().offset(self.offset);
        for text in &self.conditions {
            options = options.filter(parse_condition(text)?);
        }
        if self.any {
            options = options.combine(LogicalOperator::Or);
        }
        if let Some(field) = &self.sort {
            options = options.sort(if self.desc {
                SortSpec::descending(field.clone())
            } else {
                SortSpec::ascending(field.clone())
            });
        }
        if let Some(limit) = self.limit {
            options = options.limit(limit);
        }
        Ok(options)
    }
}

pub fn run(args: QueryArgs, config: &Config) -> anyhow::Result<()> {
    let options = args.options()?;
    let mut loaded = args.input.load(config, args.output == OutputFormat::Text)?;

    let result = loaded.engine.get_annotations(&loaded.job_id, &options)?;
    tracing::debug!(job_id = %loaded.job_id, total = result.total, "Query finished");

    match args.output {
        OutputFormat::Json => write_json(io::stdout().lock(), &result)?,
        OutputFormat::Tsv => write_tsv(io::stdout().lock(), &result.items)?,
        OutputFormat::Text => print_page(&options, &result),
    }
    Ok(())
}

fn print_page(options: &QueryOptions, result: &QueryResult) {
    section_header_with_line("Query Results");
    if !options.filter.is_empty() {
        info(&format!("Filter: {}", options.filter));
    }

    if result.items.is_empty() {
        empty("No annotations matched");
        if result.total > 0 {
            info(&format!(
                "{} matches, offset {} is past the end",
                format_number(result.total),
                result.offset
            ));
        }
        return;
    }

    println!("{}", annotation_table(&result.items));
    success(&format!(
        "Showing {}-{} of {} matches",
        format_number(result.offset + 1),
        format_number(result.offset + result.items.len()),
        format_number(result.total)
    ));
    if result.has_more() {
        info("More results available; raise --limit or --offset to see them");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::query::{Operator, QueryValue};
    use clap::Parser;

    fn parse(args: &[&str]) -> QueryArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Query(args) => args,
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_options_from_flags() {
        let args = parse(&[
            "bakta-query", "query", "a.gff3", "-w", "feature_type == CDS", "-w", "start >= 100",
            "--any", "--sort", "end", "--desc", "--limit", "5", "--offset", "10",
        ]);
        let options = args.options().unwrap();

        assert_eq!(options.filter.len(), 2);
        assert_eq!(options.filter.operator, LogicalOperator::Or);
        assert_eq!(options.filter.conditions[1].operator, Operator::Ge);
        assert_eq!(options.filter.conditions[1].value, QueryValue::from("100"));
        assert_eq!(options.sort, Some(SortSpec::descending("end")));
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.offset, 10);
    }

    #[test]
    fn test_bad_condition() {
        let args = parse(&["bakta-query", "query", "a.gff3", "-w", "start"]);
        assert!(args.options().is_err());
    }
}
