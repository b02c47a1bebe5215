/// Standard output utilities for consistent command formatting
use crate::bio::Annotation;
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

/// How query results are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Tsv,
}

/// Longest attribute summary shown in a table cell
const ATTRIBUTE_PREVIEW: usize = 60;

/// Display a section header with underline
pub fn section_header_with_line(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Display an info message
pub fn info(message: &str) {
    println!("{} {}", "●".blue(), message);
}

/// Display a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Display an empty/none indicator
pub fn empty(message: &str) {
    println!("{} {}", "◌".dimmed(), message);
}

/// Tree structure item
pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    let prefix = if is_last { "└─" } else { "├─" };
    if let Some(val) = value {
        println!("{} {}: {}", prefix.dimmed(), label, val);
    } else {
        println!("{} {}", prefix.dimmed(), label);
    }
}

/// Tree section with nested items
pub fn tree_section(title: &str, items: Vec<(&str, String)>, is_last: bool) {
    tree_item(is_last, title, None);
    let continuation = if is_last { "   " } else { "│  " };

    for (i, (label, value)) in items.iter().enumerate() {
        let prefix = if i == items.len() - 1 { "└─" } else { "├─" };
        println!("{}{} {}: {}", continuation.dimmed(), prefix.dimmed(), label, value);
    }
}

/// Create a standard table with our preferred styling
pub fn create_standard_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a standard header cell
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)
}

fn number_cell(n: i64) -> Cell {
    Cell::new(n).set_alignment(CellAlignment::Right)
}

/// Format a number with thousands separator
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Display a subsection header
pub fn subsection_header(title: &str) {
    println!("\n{} {}", "◆".cyan(), title.bold());
}

fn preview(text: &str) -> String {
    if text.chars().count() <= ATTRIBUTE_PREVIEW {
        return text.to_string();
    }
    let cut: String = text.chars().take(ATTRIBUTE_PREVIEW - 1).collect();
    format!("{}…", cut)
}

/// Annotation table: one row per feature, attributes abbreviated
pub fn annotation_table(annotations: &[Annotation]) -> Table {
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Feature ID"),
        header_cell("Type"),
        header_cell("Contig"),
        header_cell("Start"),
        header_cell("End"),
        header_cell("Strand"),
        header_cell("Attributes"),
    ]);

    for a in annotations {
        table.add_row(vec![
            Cell::new(&a.feature_id),
            Cell::new(&a.feature_type),
            Cell::new(&a.contig),
            number_cell(a.start),
            number_cell(a.end),
            Cell::new(a.strand.as_str()).set_alignment(CellAlignment::Center),
            Cell::new(preview(&a.attributes.to_string())),
        ]);
    }
    table
}
