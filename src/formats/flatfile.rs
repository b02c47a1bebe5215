//! Line-classifying reader shared by the EMBL and GenBank parsers.
//!
//! Each dialect maps a raw line to a [`LineKind`] given the current
//! [`Section`]; the reader below owns all state (current record, current
//! feature, last qualifier) and is identical for both formats.

use crate::bio::{AttributeValue, Attributes, Strand};
use crate::formats::FileFormat;
use crate::{BaktaError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Qualifiers whose wrapped lines are joined without a separating space.
const UNSPACED_QUALIFIERS: [&str; 1] = ["translation"];

/// Separator used when a feature repeats a qualifier key.
const REPEATED_QUALIFIER_SEPARATOR: &str = ";";

const UNKNOWN_CONTIG: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatFileDocument {
    pub records: Vec<FlatFileRecord>,
}

impl FlatFileDocument {
    pub fn feature_count(&self) -> usize {
        self.records.iter().map(|r| r.features.len()).sum()
    }

    pub fn features(&self) -> impl Iterator<Item = (&FlatFileRecord, &FlatFileFeature)> {
        self.records
            .iter()
            .flat_map(|record| record.features.iter().map(move |feature| (record, feature)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatFileRecord {
    pub contig: String,
    pub metadata: IndexMap<String, String>,
    pub features: Vec<FlatFileFeature>,
    /// Uppercased residues with numbering and whitespace removed.
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatFileFeature {
    pub feature_type: String,
    pub location: String,
    pub strand: Strand,
    pub start: i64,
    pub end: i64,
    pub qualifiers: Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Header,
    Features,
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// First line of a record (`LOCUS`, `ID`). Also recorded as metadata.
    RecordStart {
        contig: &'a str,
        key: &'a str,
        value: &'a str,
    },
    Metadata {
        key: &'a str,
        value: &'a str,
    },
    MetadataContinuation(&'a str),
    FeaturesStart,
    Feature {
        key: &'a str,
        location: &'a str,
    },
    /// Qualifier text including the leading `/`.
    Qualifier(&'a str),
    FeatureContinuation(&'a str),
    SequenceStart,
    SequenceLine(&'a str),
    RecordEnd,
    Ignore,
}

pub(crate) trait Dialect {
    const FORMAT: FileFormat;

    fn classify<'a>(line: &'a str, section: Section) -> LineKind<'a>;
}

/// Byte-safe slice from `start` to the end of the line, or "".
pub(crate) fn tail(line: &str, start: usize) -> &str {
    line.get(start..).unwrap_or("")
}

/// Byte-safe prefix of at most `len` bytes.
pub(crate) fn head(line: &str, len: usize) -> &str {
    line.get(..len.min(line.len())).unwrap_or(line)
}

pub(crate) fn parse<D: Dialect>(text: &str) -> Result<FlatFileDocument> {
    let mut reader = Reader::default();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match D::classify(line, reader.section) {
            LineKind::RecordStart { contig, key, value } => {
                reader.finish_record();
                let record = reader.record_mut();
                record.contig = contig.to_string();
                record.metadata.insert(key.to_string(), value.to_string());
                reader.last_metadata_key = Some(key.to_string());
            }
            LineKind::Metadata { key, value } => reader.push_metadata(key, value),
            LineKind::MetadataContinuation(text) => {
                if let Some(key) = reader.last_metadata_key.clone() {
                    reader.push_metadata(&key, text);
                }
            }
            LineKind::FeaturesStart => {
                reader.record_mut();
                reader.section = Section::Features;
            }
            LineKind::Feature { key, location } => {
                reader.finish_feature();
                reader.record_mut();
                reader.section = Section::Features;
                reader.feature = Some(FeatureBuilder::new(key, location));
            }
            LineKind::Qualifier(text) => match reader.feature.as_mut() {
                Some(feature) => feature.push_qualifier(text),
                None => debug!(line = line_no + 1, "Qualifier outside of a feature"),
            },
            LineKind::FeatureContinuation(text) => match reader.feature.as_mut() {
                Some(feature) => feature.push_continuation(text),
                None => debug!(line = line_no + 1, "Continuation outside of a feature"),
            },
            LineKind::SequenceStart => {
                reader.finish_feature();
                reader.record_mut();
                reader.section = Section::Sequence;
            }
            LineKind::SequenceLine(text) => {
                let residues = text
                    .chars()
                    .filter(|c| !c.is_ascii_digit() && !c.is_whitespace())
                    .map(|c| c.to_ascii_uppercase());
                reader.record_mut().sequence.extend(residues);
            }
            LineKind::RecordEnd => reader.finish_record(),
            LineKind::Ignore => {}
        }
    }

    reader.finish_record();

    if reader.records.is_empty() {
        return Err(BaktaError::parse(D::FORMAT, "no records found"));
    }

    Ok(FlatFileDocument {
        records: reader.records,
    })
}

#[derive(Debug)]
struct Reader {
    section: Section,
    current: Option<FlatFileRecord>,
    feature: Option<FeatureBuilder>,
    last_metadata_key: Option<String>,
    records: Vec<FlatFileRecord>,
}

impl Default for Reader {
    fn default() -> Self {
        Self {
            section: Section::Header,
            current: None,
            feature: None,
            last_metadata_key: None,
            records: Vec::new(),
        }
    }
}

impl Reader {
    fn record_mut(&mut self) -> &mut FlatFileRecord {
        self.current.get_or_insert_with(|| FlatFileRecord {
            contig: UNKNOWN_CONTIG.to_string(),
            ..FlatFileRecord::default()
        })
    }

    fn push_metadata(&mut self, key: &str, value: &str) {
        let value = value.trim();
        let metadata = &mut self.record_mut().metadata;
        match metadata.get_mut(key) {
            Some(existing) if !value.is_empty() => {
                if !existing.is_empty() {
                    existing.push(' ');
                }
                existing.push_str(value);
            }
            Some(_) => {}
            None => {
                metadata.insert(key.to_string(), value.to_string());
            }
        }
        self.last_metadata_key = Some(key.to_string());
    }

    fn finish_feature(&mut self) {
        if let Some(builder) = self.feature.take() {
            let feature = builder.build();
            self.record_mut().features.push(feature);
        }
    }

    fn finish_record(&mut self) {
        self.finish_feature();
        if let Some(record) = self.current.take() {
            self.records.push(record);
        }
        self.section = Section::Header;
        self.last_metadata_key = None;
    }
}

#[derive(Debug)]
struct FeatureBuilder {
    feature_type: String,
    location: String,
    qualifiers: Attributes,
    last_qualifier: Option<String>,
}

impl FeatureBuilder {
    fn new(key: &str, location: &str) -> Self {
        Self {
            feature_type: key.to_string(),
            location: location.trim().to_string(),
            qualifiers: Attributes::new(),
            last_qualifier: None,
        }
    }

    fn push_qualifier(&mut self, text: &str) {
        let body = text.trim().trim_start_matches('/');
        let (key, value) = match body.split_once('=') {
            Some((key, raw)) => (key.trim(), AttributeValue::Text(strip_quotes(raw).to_string())),
            None => (body.trim(), AttributeValue::Flag(true)),
        };
        if key.is_empty() {
            return;
        }

        if let Some(existing) = self.qualifiers.get_mut(key) {
            if let (AttributeValue::Text(existing), AttributeValue::Text(more)) = (existing, &value) {
                existing.push_str(REPEATED_QUALIFIER_SEPARATOR);
                existing.push_str(more);
            }
        } else {
            self.qualifiers.insert(key, value);
        }
        self.last_qualifier = Some(key.to_string());
    }

    fn push_continuation(&mut self, text: &str) {
        let text = text.trim();
        let Some(key) = self.last_qualifier.as_deref() else {
            self.location.push_str(text);
            return;
        };

        let spaced = !UNSPACED_QUALIFIERS.contains(&key);
        if let Some(AttributeValue::Text(existing)) = self.qualifiers.get_mut(key) {
            let more = strip_quotes(text);
            if more.is_empty() {
                return;
            }
            if spaced && !existing.is_empty() {
                existing.push(' ');
            }
            existing.push_str(more);
        }
    }

    fn build(self) -> FlatFileFeature {
        let (start, end) = location_bounds(&self.location);
        FlatFileFeature {
            strand: Strand::from_location(&self.location),
            feature_type: self.feature_type,
            location: self.location,
            start,
            end,
            qualifiers: self.qualifiers,
        }
    }
}

fn strip_quotes(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.strip_prefix('"').unwrap_or(raw);
    raw.strip_suffix('"').unwrap_or(raw)
}

/// Smallest and largest coordinate mentioned in a location string such as
/// `complement(join(<1..200,300..>450))`. `(0, 0)` when there are none.
pub fn location_bounds(location: &str) -> (i64, i64) {
    let mut bounds: Option<(i64, i64)> = None;
    for number in location
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
    {
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(number), hi.max(number)),
            None => (number, number),
        });
    }
    bounds.unwrap_or((0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_bounds() {
        assert_eq!(location_bounds("100..300"), (100, 300));
        assert_eq!(location_bounds("complement(300..100)"), (100, 300));
        assert_eq!(location_bounds("join(<1..200,300..>450)"), (1, 450));
        assert_eq!(location_bounds("order(5,9)"), (5, 9));
        assert_eq!(location_bounds("unknown"), (0, 0));
    }

    #[test]
    fn test_qualifier_forms() {
        let mut feature = FeatureBuilder::new("CDS", "1..90");
        feature.push_qualifier("/locus_tag=\"ABC_0001\"");
        feature.push_qualifier("/codon_start=1");
        feature.push_qualifier("/pseudo");
        feature.push_qualifier("/db_xref=\"GO:0003677\"");
        feature.push_qualifier("/db_xref=\"UniRef:UniRef90_P0A7B8\"");

        let built = feature.build();
        assert_eq!(built.qualifiers.get_str("locus_tag"), Some("ABC_0001"));
        assert_eq!(built.qualifiers.get_str("codon_start"), Some("1"));
        assert_eq!(built.qualifiers.get("pseudo"), Some(&AttributeValue::Flag(true)));
        assert_eq!(
            built.qualifiers.get_str("db_xref"),
            Some("GO:0003677;UniRef:UniRef90_P0A7B8")
        );
    }

    #[test]
    fn test_continuations() {
        let mut feature = FeatureBuilder::new("CDS", "join(1..90,");
        feature.push_continuation("120..300)");
        feature.push_qualifier("/product=\"DNA-directed RNA");
        feature.push_continuation("polymerase subunit beta\"");
        feature.push_qualifier("/translation=\"MKV");
        feature.push_continuation("LLA\"");
        feature.push_qualifier("/pseudo");
        feature.push_continuation("ignored text");

        let built = feature.build();
        assert_eq!(built.location, "join(1..90,120..300)");
        assert_eq!((built.start, built.end), (1, 300));
        assert_eq!(
            built.qualifiers.get_str("product"),
            Some("DNA-directed RNA polymerase subunit beta")
        );
        assert_eq!(built.qualifiers.get_str("translation"), Some("MKVLLA"));
        assert_eq!(built.qualifiers.get("pseudo"), Some(&AttributeValue::Flag(true)));
    }

    #[test]
    fn test_strand_from_location() {
        let feature = FeatureBuilder::new("gene", "complement(<5..>90)").build();
        assert_eq!(feature.strand, Strand::Reverse);
        assert!(feature.start <= feature.end);
    }
}
