//! Tab-separated feature tables.

use crate::formats::{Document, FileFormat};
use crate::{BaktaError, Result};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TsvDocument {
    pub headers: Vec<String>,
    /// One map per data row, keyed by header. Short rows are padded with "".
    pub rows: Vec<IndexMap<String, String>>,
}

impl TsvDocument {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

lazy_parser!(TsvParser, FileFormat::Tsv, TsvDocument, Document::Tsv, parse_str);

pub fn parse_str(text: &str) -> Result<TsvDocument> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = loop {
        match records.next() {
            None => return Err(BaktaError::parse(FileFormat::Tsv, "no header row found")),
            Some(record) => {
                let record = record.map_err(|e| BaktaError::parse(FileFormat::Tsv, e))?;
                if is_blank(&record) {
                    continue;
                }
                break record.iter().map(|h| h.trim().to_string()).collect();
            }
        }
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| BaktaError::parse(FileFormat::Tsv, e))?;
        if is_blank(&record) {
            continue;
        }

        let row: IndexMap<String, String> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    Ok(TsvDocument { headers, rows })
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}
