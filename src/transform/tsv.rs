use super::{mismatch, Records, Transform};
use crate::bio::{Annotation, Attributes, Strand};
use crate::formats::{Document, FileFormat, TsvDocument};
use crate::{BaktaError, Result};
use indexmap::IndexMap;

const ID_ALIASES: &[&str] = &["locus_tag", "Locus Tag", "locus tag", "LocusTag", "Locus_Tag", "ID", "id", "feature_id"];
const TYPE_ALIASES: &[&str] = &["type", "Type", "feature_type", "Feature Type"];
const START_ALIASES: &[&str] = &["start", "Start"];
const END_ALIASES: &[&str] = &["end", "End", "stop", "Stop"];
const STRAND_ALIASES: &[&str] = &["strand", "Strand"];
const CONTIG_ALIASES: &[&str] = &["contig", "Contig", "sequence_id", "Sequence Id", "seqid", "Sequence"];

const UNKNOWN_CONTIG: &str = "unknown";

/// Header names resolved for one document.
#[derive(Debug)]
struct Columns<'a> {
    id: &'a str,
    feature_type: &'a str,
    start: &'a str,
    end: &'a str,
    strand: &'a str,
    contig: Option<&'a str>,
}

impl<'a> Columns<'a> {
    fn resolve(doc: &'a TsvDocument) -> Result<Self> {
        let required = |role: &str, aliases: &[&str]| {
            find_column(doc, aliases).ok_or_else(|| {
                BaktaError::transform(
                    FileFormat::Tsv,
                    format!("no {} column (tried {})", role, aliases.join(", ")),
                )
            })
        };

        Ok(Self {
            id: required("feature id", ID_ALIASES)?,
            feature_type: required("type", TYPE_ALIASES)?,
            start: required("start", START_ALIASES)?,
            end: required("end", END_ALIASES)?,
            strand: required("strand", STRAND_ALIASES)?,
            contig: find_column(doc, CONTIG_ALIASES),
        })
    }

    fn is_core(&self, header: &str) -> bool {
        [self.id, self.feature_type, self.start, self.end, self.strand].contains(&header)
            || self.contig == Some(header)
    }
}

fn find_column<'a>(doc: &'a TsvDocument, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|alias| doc.headers.iter().find(|h| h.as_str() == *alias))
        .map(String::as_str)
}

fn coordinate(row: &IndexMap<String, String>, column: &str, row_no: usize) -> Result<i64> {
    let raw = row.get(column).map(|v| v.trim()).unwrap_or("");
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i64>().map_err(|_| {
        BaktaError::transform(
            FileFormat::Tsv,
            format!("row {}: {} value '{}' is not an integer", row_no, column, raw),
        )
    })
}

#[derive(Debug, Clone)]
pub struct TsvTransformer {
    job_id: String,
}

impl TsvTransformer {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into() }
    }
}

impl Transform for TsvTransformer {
    fn format(&self) -> FileFormat {
        FileFormat::Tsv
    }

    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn transform(&self, document: &Document) -> Result<Records> {
        let Document::Tsv(doc) = document else {
            return Err(mismatch(FileFormat::Tsv, document));
        };
        let columns = Columns::resolve(doc)?;

        let mut annotations = Vec::with_capacity(doc.rows.len());
        for (i, row) in doc.rows.iter().enumerate() {
            let text = |column: &str| row.get(column).cloned().unwrap_or_default();

            let contig = columns
                .contig
                .map(text)
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_CONTIG.to_string());

            let attributes: Attributes = row
                .iter()
                .filter(|(header, _)| !columns.is_core(header))
                .map(|(header, value)| (header.clone(), value.clone()))
                .collect();

            annotations.push(
                Annotation::new(
                    self.job_id.clone(),
                    text(columns.id),
                    text(columns.feature_type),
                    contig,
                    coordinate(row, columns.start, i + 1)?,
                    coordinate(row, columns.end, i + 1)?,
                    Strand::from_symbol(&text(columns.strand)),
                )
                .with_attributes(attributes),
            );
        }

        Ok(Records::Annotations(annotations))
    }
}
