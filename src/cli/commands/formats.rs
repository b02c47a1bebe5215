use crate::cli::output::*;
use crate::formats::FileFormat;
use clap::Args;

#[derive(Args)]
pub struct FormatsArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: FormatsArgs) -> anyhow::Result<()> {
    if args.json {
        let listing: Vec<serde_json::Value> = FileFormat::ALL
            .iter()
            .map(|format| {
                serde_json::json!({
                    "name": format.name(),
                    "extensions": format.extensions(),
                    "records": records_label(*format),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    section_header_with_line("Supported Formats");

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Format"),
        header_cell("Extensions"),
        header_cell("Produces"),
    ]);
    for format in FileFormat::ALL {
        let extensions = format
            .extensions()
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![format.name().to_string(), extensions, records_label(format).to_string()]);
    }
    println!("{}", table);
    info("Compressed inputs (.gz) are decompressed transparently");
    Ok(())
}

fn records_label(format: FileFormat) -> &'static str {
    if format.produces_sequences() {
        "sequences"
    } else {
        "annotations"
    }
}
