//! GenBank flat files (`.gb`, `.gbk`, `.gbff`).
//!
//! Header keywords occupy columns 1-12, feature keys start in column 6 and
//! locations/qualifiers in column 22.

use crate::formats::flatfile::{self, head, tail, Dialect, FlatFileDocument, LineKind, Section};
use crate::formats::{Document, FileFormat};
use crate::Result;

const KEYWORD_WIDTH: usize = 12;
const FEATURE_KEY_COLUMN: usize = 5;

pub struct GenBank;

impl Dialect for GenBank {
    const FORMAT: FileFormat = FileFormat::GenBank;

    fn classify<'a>(line: &'a str, section: Section) -> LineKind<'a> {
        if line.starts_with("//") {
            return LineKind::RecordEnd;
        }
        if line.starts_with("LOCUS") {
            let value = tail(line, "LOCUS".len()).trim();
            let contig = value.split_whitespace().next().unwrap_or("");
            return LineKind::RecordStart {
                contig,
                key: "LOCUS",
                value,
            };
        }
        if line.starts_with("FEATURES") {
            return LineKind::FeaturesStart;
        }
        if line.starts_with("ORIGIN") {
            return LineKind::SequenceStart;
        }

        match section {
            Section::Sequence => LineKind::SequenceLine(line),
            Section::Features if line.starts_with(' ') => {
                let body = line.trim_start();
                let indent = line.len() - body.len();
                if indent == FEATURE_KEY_COLUMN {
                    let (key, location) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
                    LineKind::Feature {
                        key,
                        location: location.trim(),
                    }
                } else if body.starts_with('/') {
                    LineKind::Qualifier(body)
                } else {
                    LineKind::FeatureContinuation(body)
                }
            }
            _ => {
                let keyword = head(line, KEYWORD_WIDTH).trim();
                let value = tail(line, KEYWORD_WIDTH).trim();
                if keyword.is_empty() {
                    LineKind::MetadataContinuation(value)
                } else if keyword.contains(char::is_whitespace) {
                    // Keywords longer than the column, e.g. `BASE COUNT`.
                    LineKind::Ignore
                } else {
                    LineKind::Metadata { key: keyword, value }
                }
            }
        }
    }
}

lazy_parser!(GenBankParser, FileFormat::GenBank, FlatFileDocument, Document::GenBank, parse_str);

pub fn parse_str(text: &str) -> Result<FlatFileDocument> {
    flatfile::parse::<GenBank>(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::{AttributeValue, Strand};
    use crate::BaktaError;

    const SAMPLE: &str = "\
LOCUS       contig_1                1200 bp    DNA     linear   BCT 01-JAN-2024
DEFINITION  Escherichia coli strain K-12 contig_1, whole genome shotgun
            sequence.
ACCESSION   contig_1
VERSION     contig_1.1
SOURCE      Escherichia coli
  ORGANISM  Escherichia coli
            Bacteria; Pseudomonadota.
FEATURES             Location/Qualifiers
     source          1..1200
                     /mol_type=\"genomic DNA\"
     gene            100..300
                     /locus_tag=\"ECO_0001\"
                     /gene=\"dnaA\"
     CDS             complement(400..900)
                     /locus_tag=\"ECO_0002\"
                     /product=\"chromosomal replication initiator
                     protein DnaA\"
                     /pseudo
ORIGIN
        1 gatcctccat atacaacggt
       21 atctccacct
//
LOCUS       plasmid_1                 50 bp    DNA     circular BCT 01-JAN-2024
FEATURES             Location/Qualifiers
     gene            5..45
                     /product=\"replication protein\"
//
";

    #[test]
    fn test_records_and_metadata() {
        let doc = parse_str(SAMPLE).unwrap();
        assert_eq!(doc.records.len(), 2);

        let first = &doc.records[0];
        assert_eq!(first.contig, "contig_1");
        assert_eq!(
            first.metadata.get("DEFINITION").map(String::as_str),
            Some("Escherichia coli strain K-12 contig_1, whole genome shotgun sequence.")
        );
        assert_eq!(first.metadata.get("VERSION").map(String::as_str), Some("contig_1.1"));
        assert_eq!(
            first.metadata.get("ORGANISM").map(String::as_str),
            Some("Escherichia coli Bacteria; Pseudomonadota.")
        );
        assert_eq!(first.sequence, "GATCCTCCATATACAACGGTATCTCCACCT");

        assert_eq!(doc.records[1].contig, "plasmid_1");
        assert_eq!(doc.feature_count(), 4);
    }

    #[test]
    fn test_features() {
        let doc = parse_str(SAMPLE).unwrap();
        let features = &doc.records[0].features;
        assert_eq!(features.len(), 3);

        let cds = &features[2];
        assert_eq!(cds.feature_type, "CDS");
        assert_eq!(cds.strand, Strand::Reverse);
        assert_eq!((cds.start, cds.end), (400, 900));
        assert_eq!(
            cds.qualifiers.get_str("product"),
            Some("chromosomal replication initiator protein DnaA")
        );
        assert_eq!(cds.qualifiers.get("pseudo"), Some(&AttributeValue::Flag(true)));
        assert_eq!(features[1].strand, Strand::Forward);
    }

    #[test]
    fn test_no_records() {
        assert!(matches!(parse_str("\n\n"), Err(BaktaError::Parse { .. })));
    }
}
