/// Transformer integration tests: every annotation format normalizes the
/// same features to the same records.
mod common;

use bakta_query::bio::{AttributeValue, Attributes, Strand};
use bakta_query::formats::{parse_content, FileFormat};
use bakta_query::import::load_records;
use bakta_query::transform::{transformer_for_format, Records};
use bakta_query::{Annotation, BaktaError, Source};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn annotations(format_name: &str, content: &str) -> Vec<Annotation> {
    let document = parse_content(format_name, content).unwrap();
    transformer_for_format(format_name, "job-1")
        .unwrap()
        .transform(&document)
        .unwrap()
        .into_annotations()
}

#[test]
fn test_gff3_single_line() {
    let annotations = annotations(
        "gff3",
        "contig1\tBakta\tCDS\t100\t300\t.\t+\t0\tID=cds1;product=hypothetical protein\n",
    );

    assert_eq!(annotations.len(), 1);
    let a = &annotations[0];
    assert_eq!(a.job_id, "job-1");
    assert_eq!(a.feature_id, "cds1");
    assert_eq!(a.feature_type, "CDS");
    assert_eq!(a.contig, "contig1");
    assert_eq!((a.start, a.end), (100, 300));
    assert_eq!(a.strand, Strand::Forward);
    assert_eq!(
        a.attributes,
        Attributes::new()
            .with("ID", "cds1")
            .with("product", "hypothetical protein")
    );
}

#[test]
fn test_tsv_alias_columns() {
    let annotations = annotations(
        "tsv",
        "Locus Tag\tType\tStart\tEnd\tStrand\tProduct\ntest_1\tgene\t100\t300\t+\tHypothetical protein\n",
    );

    assert_eq!(annotations.len(), 1);
    let a = &annotations[0];
    assert_eq!(a.feature_id, "test_1");
    assert_eq!(a.feature_type, "gene");
    assert_eq!((a.start, a.end), (100, 300));
    assert_eq!(a.attributes, Attributes::new().with("Product", "Hypothetical protein"));
}

#[rstest]
#[case("gff3", common::GFF3)]
#[case("tsv", common::TSV)]
#[case("json", common::JSON)]
#[case("embl", common::EMBL)]
#[case("genbank", common::GENBANK)]
fn test_formats_agree_on_core_fields(#[case] format_name: &str, #[case] content: &str) {
    let annotations = annotations(format_name, content);

    let core: Vec<(&str, &str, i64, i64, Strand)> = annotations
        .iter()
        .map(|a| (a.feature_id.as_str(), a.contig.as_str(), a.start, a.end, a.strand))
        .collect();

    assert_eq!(
        core,
        vec![
            ("ECO_0001", "contig_1", 100, 300, Strand::Forward),
            ("ECO_0002", "contig_1", 400, 900, Strand::Reverse),
            ("ECO_0003", "contig_1", 1000, 1075, Strand::Forward),
        ]
    );
    assert!(annotations.iter().all(|a| a.job_id == "job-1"));
    assert!(annotations.iter().all(|a| a.has_ordered_coordinates()));
}

#[rstest]
#[case("gff3", common::GFF3, "product")]
#[case("tsv", common::TSV, "Product")]
#[case("json", common::JSON, "product")]
#[case("embl", common::EMBL, "product")]
#[case("genbank", common::GENBANK, "product")]
fn test_product_attribute(#[case] format_name: &str, #[case] content: &str, #[case] key: &str) {
    let annotations = annotations(format_name, content);
    assert_eq!(
        annotations[1].attributes.get_str(key),
        Some("chromosomal replication initiator protein, DnaA")
    );
}

#[test]
fn test_json_attributes() {
    let annotations = annotations("json", common::JSON);

    let cds = &annotations[1];
    assert_eq!(cds.feature_type, "cds");
    assert_eq!(cds.attributes.get_str("db_xrefs"), Some("[\"GO:0005524\"]"));
    assert!(!cds.attributes.contains_key("stop"));
    assert!(!cds.attributes.contains_key("format"));
    assert_eq!(annotations[2].attributes.get_str("amino_acid"), Some("Met"));
}

#[test]
fn test_json_without_tag_is_rejected() {
    use bakta_query::formats::json::JsonDocument;
    use bakta_query::formats::Document;

    let document = Document::Json(JsonDocument {
        value: serde_json::json!({"features": []}),
    });
    let err = transformer_for_format("json", "job-1")
        .unwrap()
        .transform(&document)
        .unwrap_err();
    assert!(matches!(err, BaktaError::Transform { .. }));
}

#[test]
fn test_flat_file_flags() {
    let content = "\
LOCUS       chr
FEATURES             Location/Qualifiers
     CDS             <1..>210
                     /locus_tag=\"P_1\"
                     /pseudo
//
";
    let annotations = annotations("genbank", content);
    assert_eq!((annotations[0].start, annotations[0].end), (1, 210));
    assert_eq!(annotations[0].attributes.get("pseudo"), Some(&AttributeValue::Flag(true)));
}

#[test]
fn test_fasta_sequences() {
    let records = load_records("job-1", FileFormat::Fasta, Source::Content(common::FASTA.to_string())).unwrap();
    assert!(matches!(records, Records::Sequences(_)));

    let sequences = records.into_sequences();
    assert_eq!(sequences.len(), 2);
    assert_eq!(sequences[0].id(), "contig_1");
    assert_eq!(sequences[0].length(), 16);
    assert_eq!(sequences[1].header, "plasmid_1");
    assert!(sequences.iter().all(|s| s.length() == s.sequence().len()));
}
