//! GFF3 parser.
//!
//! Reads the feature section of a GFF3 file line by line. Pragmas populate
//! document metadata, a `##FASTA` line ends the feature section, and lines
//! that do not split into nine tab-separated columns with numeric
//! coordinates are skipped.

use crate::bio::{AttributeValue, Attributes};
use crate::formats::{Document, FileFormat};
use crate::{BaktaError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

const FASTA_DIRECTIVE: &str = "##FASTA";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Gff3Document {
    pub version: Option<String>,
    /// seqid -> length, from `##sequence-region` pragmas.
    pub sequence_regions: IndexMap<String, i64>,
    /// Remaining `##` pragmas, verbatim.
    pub pragmas: Vec<String>,
    pub features: Vec<Gff3Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gff3Feature {
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub start: i64,
    pub end: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub strand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<u8>,
    pub attributes: Attributes,
}

lazy_parser!(Gff3Parser, FileFormat::Gff3, Gff3Document, Document::Gff3, parse_str);

pub fn parse_str(text: &str) -> Result<Gff3Document> {
    let mut document = Gff3Document::default();
    let mut readable_lines = 0usize;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        readable_lines += 1;

        if line.trim_end() == FASTA_DIRECTIVE {
            break;
        }

        if let Some(pragma) = line.strip_prefix("##") {
            read_pragma(&mut document, line, pragma);
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        match parse_feature_line(line) {
            Some(feature) => document.features.push(feature),
            None => debug!(line = line_no + 1, "Skipping malformed GFF3 line"),
        }
    }

    if readable_lines == 0 {
        return Err(BaktaError::parse(FileFormat::Gff3, "input contains no readable lines"));
    }

    Ok(document)
}

fn read_pragma(document: &mut Gff3Document, line: &str, pragma: &str) {
    let mut parts = pragma.split_whitespace();
    match parts.next() {
        Some("gff-version") => {
            document.version = parts.next().map(str::to_string);
        }
        Some("sequence-region") => {
            let seqid = parts.next();
            let start = parts.next().and_then(|s| s.parse::<i64>().ok());
            let end = parts.next().and_then(|s| s.parse::<i64>().ok());
            match (seqid, start, end) {
                (Some(seqid), Some(start), Some(end)) => {
                    document
                        .sequence_regions
                        .insert(seqid.to_string(), end - start + 1);
                }
                _ => debug!(pragma = line, "Ignoring incomplete sequence-region pragma"),
            }
        }
        _ => document.pragmas.push(line.to_string()),
    }
}

fn parse_feature_line(line: &str) -> Option<Gff3Feature> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 9 {
        return None;
    }

    let start = columns[3].trim().parse::<i64>().ok()?;
    let end = columns[4].trim().parse::<i64>().ok()?;
    let score = match columns[5].trim() {
        "." => None,
        value => Some(value.parse::<f64>().ok()?),
    };
    let phase = match columns[7].trim() {
        "." => None,
        value => Some(value.parse::<u8>().ok()?),
    };

    Some(Gff3Feature {
        seqid: columns[0].to_string(),
        source: columns[1].to_string(),
        feature_type: columns[2].to_string(),
        start,
        end,
        score,
        strand: columns[6].trim().to_string(),
        phase,
        attributes: parse_attributes(columns[8]),
    })
}

/// Splits a column-9 attribute block into `key=value` pairs; keys without a
/// value become `Flag(true)`. Values are percent-decoded.
pub fn parse_attributes(field: &str) -> Attributes {
    let mut attributes = Attributes::new();
    let field = field.trim();
    if field == "." {
        return attributes;
    }

    for pair in field.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => {
                attributes.insert(
                    percent_decode(key.trim()).into_owned(),
                    AttributeValue::Text(percent_decode(value.trim()).into_owned()),
                );
            }
            None => {
                attributes.insert(percent_decode(pair).into_owned(), AttributeValue::Flag(true));
            }
        }
    }

    attributes
}

/// Decodes `%XX` escapes. Malformed escapes are kept as written.
fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(byte) = hex {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    match String::from_utf8(decoded) {
        Ok(text) => Cow::Owned(text),
        Err(_) => Cow::Borrowed(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "##gff-version 3\n\
##sequence-region contig1 1 5000\n\
##species https://www.ncbi.nlm.nih.gov/Taxonomy/Browser/wwwtax.cgi?id=562\n\
contig1\tBakta\tCDS\t100\t300\t.\t+\t0\tID=cds1;product=hypothetical protein\n\
contig1\tBakta\tgene\t400\t900\t12.5\t-\t.\tID=gene1;Name=dnaA\n\
contig1\tbroken line with too few columns\n\
contig1\tBakta\ttRNA\t950\t1020\t.\t+\t.\tID=trna1;pseudo\n\
##FASTA\n\
>contig1\n\
ACGT\n";

    #[test]
    fn test_parse_pragmas_and_features() {
        let doc = parse_str(SAMPLE).unwrap();
        assert_eq!(doc.version.as_deref(), Some("3"));
        assert_eq!(doc.sequence_regions.get("contig1"), Some(&5000));
        assert_eq!(doc.pragmas.len(), 1);
        assert_eq!(doc.features.len(), 3);

        let cds = &doc.features[0];
        assert_eq!(cds.seqid, "contig1");
        assert_eq!(cds.feature_type, "CDS");
        assert_eq!((cds.start, cds.end), (100, 300));
        assert_eq!(cds.score, None);
        assert_eq!(cds.phase, Some(0));
        assert_eq!(cds.attributes.get_str("product"), Some("hypothetical protein"));

        assert_eq!(doc.features[1].score, Some(12.5));
        assert_eq!(doc.features[1].phase, None);
    }

    #[test]
    fn test_flag_attribute() {
        let doc = parse_str(SAMPLE).unwrap();
        let trna = &doc.features[2];
        assert_eq!(trna.attributes.get("pseudo"), Some(&AttributeValue::Flag(true)));
    }

    #[test]
    fn test_fasta_section_not_parsed() {
        let doc = parse_str(SAMPLE).unwrap();
        assert!(doc.features.iter().all(|f| f.seqid == "contig1"));
        assert!(!doc.features.iter().any(|f| f.seqid.starts_with('>')));
    }

    #[test]
    fn test_non_numeric_coordinates_skipped() {
        let doc = parse_str("c1\tsrc\tgene\tabc\t10\t.\t+\t.\tID=x\n").unwrap();
        assert!(doc.features.is_empty());
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(parse_str("\n\n  \n"), Err(BaktaError::Parse { .. })));
    }

    #[test]
    fn test_percent_decoding() {
        let attrs = parse_attributes("ID=x;product=alpha%2Cbeta%3B gamma;note=100%25;bad=%zz");
        assert_eq!(attrs.get_str("product"), Some("alpha,beta; gamma"));
        assert_eq!(attrs.get_str("note"), Some("100%"));
        assert_eq!(attrs.get_str("bad"), Some("%zz"));
    }

    #[test]
    fn test_empty_attribute_column() {
        assert!(parse_attributes(".").is_empty());
        assert!(parse_attributes("").is_empty());
    }
}
