//! EMBL flat files.
//!
//! Every line starts with a two-letter code; feature table lines (`FT`) put
//! the feature key in column 6 and qualifiers in column 22.

use crate::formats::flatfile::{self, head, tail, Dialect, FlatFileDocument, LineKind, Section};
use crate::formats::{Document, FileFormat};
use crate::Result;

const CODE_WIDTH: usize = 2;
const BODY_COLUMN: usize = 5;

pub struct Embl;

impl Dialect for Embl {
    const FORMAT: FileFormat = FileFormat::Embl;

    fn classify<'a>(line: &'a str, section: Section) -> LineKind<'a> {
        if line.starts_with("//") {
            return LineKind::RecordEnd;
        }
        if section == Section::Sequence && line.starts_with(' ') {
            return LineKind::SequenceLine(line);
        }

        let code = head(line, CODE_WIDTH);
        let body = tail(line, BODY_COLUMN);
        match code {
            "ID" => {
                let value = body.trim();
                let contig = value
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .trim_end_matches(';');
                LineKind::RecordStart {
                    contig,
                    key: "ID",
                    value,
                }
            }
            "XX" | "FH" => LineKind::Ignore,
            "SQ" => LineKind::SequenceStart,
            "FT" => {
                if body.starts_with(|c: char| !c.is_whitespace()) {
                    let (key, location) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
                    LineKind::Feature {
                        key,
                        location: location.trim(),
                    }
                } else {
                    let text = body.trim();
                    if text.starts_with('/') {
                        LineKind::Qualifier(text)
                    } else {
                        LineKind::FeatureContinuation(text)
                    }
                }
            }
            code if code.trim().len() == CODE_WIDTH => LineKind::Metadata {
                key: code,
                value: body.trim(),
            },
            _ => LineKind::Ignore,
        }
    }
}

lazy_parser!(EmblParser, FileFormat::Embl, FlatFileDocument, Document::Embl, parse_str);

pub fn parse_str(text: &str) -> Result<FlatFileDocument> {
    flatfile::parse::<Embl>(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::Strand;

    const SAMPLE: &str = "\
ID   contig_1; SV 1; linear; genomic DNA; STD; PRO; 1200 BP.
XX
AC   contig_1;
XX
DE   Escherichia coli strain K-12
DE   contig_1.
XX
OS   Escherichia coli
FH   Key             Location/Qualifiers
FH
FT   source          1..1200
FT                   /mol_type=\"genomic DNA\"
FT   CDS             complement(join(400..600,
FT                   700..900))
FT                   /locus_tag=\"ECO_0002\"
FT                   /product=\"chromosomal replication initiator
FT                   protein DnaA\"
FT                   /translation=\"MSLSLWQQCL
FT                   ARLQDELPA\"
XX
SQ   Sequence 30 BP; 8 A; 8 C; 6 G; 8 T; 0 other;
     gatcctccat atacaacggt atctccacct        30
//
";

    #[test]
    fn test_record() {
        let doc = parse_str(SAMPLE).unwrap();
        assert_eq!(doc.records.len(), 1);

        let record = &doc.records[0];
        assert_eq!(record.contig, "contig_1");
        assert_eq!(
            record.metadata.get("DE").map(String::as_str),
            Some("Escherichia coli strain K-12 contig_1.")
        );
        assert_eq!(record.metadata.get("OS").map(String::as_str), Some("Escherichia coli"));
        assert_eq!(record.sequence, "GATCCTCCATATACAACGGTATCTCCACCT");
    }

    #[test]
    fn test_features() {
        let doc = parse_str(SAMPLE).unwrap();
        let features = &doc.records[0].features;
        assert_eq!(features.len(), 2);

        let cds = &features[1];
        assert_eq!(cds.location, "complement(join(400..600,700..900))");
        assert_eq!(cds.strand, Strand::Reverse);
        assert_eq!((cds.start, cds.end), (400, 900));
        assert_eq!(
            cds.qualifiers.get_str("product"),
            Some("chromosomal replication initiator protein DnaA")
        );
        assert_eq!(cds.qualifiers.get_str("translation"), Some("MSLSLWQQCLARLQDELPA"));
    }
}
