//! Writing query results as TSV or JSON.

use crate::bio::Annotation;
use crate::query::QueryResult;
use crate::Result;
use std::io::Write;

pub const TSV_COLUMNS: [&str; 7] = ["feature_id", "feature_type", "contig", "start", "end", "strand", "attributes"];

/// One row per annotation; attributes as `key=value;key=value`.
pub fn write_tsv<W: Write>(writer: W, annotations: &[Annotation]) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    tsv.write_record(TSV_COLUMNS).map_err(csv_error)?;
    for a in annotations {
        let (start, end, attributes) = (a.start.to_string(), a.end.to_string(), a.attributes.to_string());
        tsv.write_record([
            a.feature_id.as_str(),
            a.feature_type.as_str(),
            a.contig.as_str(),
            start.as_str(),
            end.as_str(),
            a.strand.as_str(),
            attributes.as_str(),
        ])
        .map_err(csv_error)?;
    }
    tsv.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, result: &QueryResult) -> Result<()> {
    serde_json::to_writer_pretty(writer, result).map_err(|e| crate::BaktaError::Io(e.into()))
}

fn csv_error(e: csv::Error) -> crate::BaktaError {
    crate::BaktaError::Io(e.into())
}
