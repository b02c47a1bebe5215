use super::InputArgs;
use crate::cli::output::*;
use crate::config::Config;
use clap::Args;
use comfy_table::{Cell, CellAlignment};

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print counts as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SummaryArgs, config: &Config) -> anyhow::Result<()> {
    let loaded = args.input.load(config, !args.json)?;
    let engine = &loaded.engine;
    let job_id = loaded.job_id.as_str();

    let mut counts = Vec::new();
    for feature_type in engine.get_feature_types(job_id)? {
        let count = engine.count_annotations(job_id, Some(&feature_type))?;
        counts.push((feature_type, count));
    }
    let total = engine.count_annotations(job_id, None)?;
    let sequences = engine.repository().sequences(job_id);

    if args.json {
        let by_type: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(feature_type, count)| (feature_type.clone(), serde_json::Value::from(*count)))
            .collect();
        let summary = serde_json::json!({
            "job_id": job_id,
            "import": loaded.report,
            "annotations": total,
            "feature_types": by_type,
            "sequences": sequences.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    section_header_with_line("Annotation Summary");
    tree_item(false, "Job", Some(job_id));
    tree_item(false, "Files", Some(&format_number(loaded.report.files)));
    tree_section(
        "Records",
        vec![
            ("Annotations", format_number(total)),
            ("Sequences", format_number(sequences.len())),
            (
                "Sequence length",
                format_number(sequences.iter().map(|s| s.length()).sum()),
            ),
        ],
        true,
    );

    if counts.is_empty() {
        empty("No annotations imported");
        return Ok(());
    }

    subsection_header("Feature Types");
    let mut table = create_standard_table();
    table.set_header(vec![header_cell("Type"), header_cell("Count"), header_cell("Share")]);
    for (feature_type, count) in &counts {
        let share = *count as f64 / total.max(1) as f64 * 100.0;
        table.add_row(vec![
            Cell::new(feature_type),
            Cell::new(format_number(*count)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", share)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
    Ok(())
}
