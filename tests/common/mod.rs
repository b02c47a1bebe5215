//! Shared fixtures for integration tests.
//!
//! Every annotation fixture describes the same three features on
//! `contig_1` so results can be compared across formats:
//! gene ECO_0001 (100..300, +), CDS ECO_0002 (400..900, -) and
//! tRNA ECO_0003 (1000..1075, +).
#![allow(dead_code)]

use bakta_query::bio::{Annotation, Attributes, Strand};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GFF3: &str = "##gff-version 3
##sequence-region contig_1 1 1200
contig_1\tBakta\tgene\t100\t300\t.\t+\t.\tID=ECO_0001;Name=dnaA;locus_tag=ECO_0001
contig_1\tBakta\tCDS\t400\t900\t.\t-\t0\tID=ECO_0002;product=chromosomal replication initiator protein%2C DnaA;locus_tag=ECO_0002
contig_1\tBakta\ttRNA\t1000\t1075\t.\t+\t.\tID=ECO_0003;product=tRNA-Met;locus_tag=ECO_0003
##FASTA
>contig_1
ACGT
";

pub const TSV: &str = "# Annotated with Bakta
# Software: v1.9.1
Sequence Id\tType\tStart\tStop\tStrand\tLocus Tag\tGene\tProduct\tDbXrefs
contig_1\tgene\t100\t300\t+\tECO_0001\tdnaA\t\t
contig_1\tcds\t400\t900\t-\tECO_0002\t\tchromosomal replication initiator protein, DnaA\tGO:0005524
contig_1\ttRNA\t1000\t1075\t+\tECO_0003\t\ttRNA-Met\t
";

pub const JSON: &str = r#"{
  "genome": {"genus": "Escherichia", "species": "coli"},
  "features": [
    {"id": "ECO_0001", "type": "gene", "contig": "contig_1", "start": 100, "stop": 300, "strand": "+", "gene": "dnaA"},
    {"id": "ECO_0002", "type": "cds", "contig": "contig_1", "start": 400, "stop": 900, "strand": "-",
     "product": "chromosomal replication initiator protein, DnaA", "db_xrefs": ["GO:0005524"]},
    {"id": "ECO_0003", "type": "tRNA", "contig": "contig_1", "start": 1000, "stop": 1075, "strand": "+",
     "product": "tRNA-Met", "amino_acid": "Met"}
  ]
}"#;

pub const GENBANK: &str = "\
LOCUS       contig_1                1200 bp    DNA     linear   BCT 01-JAN-2024
DEFINITION  Escherichia coli contig_1.
ACCESSION   contig_1
FEATURES             Location/Qualifiers
     gene            100..300
                     /locus_tag=\"ECO_0001\"
                     /gene=\"dnaA\"
     CDS             complement(400..900)
                     /locus_tag=\"ECO_0002\"
                     /product=\"chromosomal replication initiator
                     protein, DnaA\"
     tRNA            1000..1075
                     /locus_tag=\"ECO_0003\"
                     /product=\"tRNA-Met\"
ORIGIN
        1 acgtacgtac
//
";

pub const EMBL: &str = "\
ID   contig_1; SV 1; linear; genomic DNA; STD; PRO; 1200 BP.
XX
DE   Escherichia coli contig_1.
XX
FH   Key             Location/Qualifiers
FH
FT   gene            100..300
FT                   /locus_tag=\"ECO_0001\"
FT                   /gene=\"dnaA\"
FT   CDS             complement(400..900)
FT                   /locus_tag=\"ECO_0002\"
FT                   /product=\"chromosomal replication initiator
FT                   protein, DnaA\"
FT   tRNA            1000..1075
FT                   /locus_tag=\"ECO_0003\"
FT                   /product=\"tRNA-Met\"
XX
SQ   Sequence 10 BP;
     acgtacgtac                                                         10
//
";

pub const FASTA: &str = ">contig_1 [organism=Escherichia coli] [completeness=complete]
ACGTACGTAC
GTACGT
>plasmid_1
TTGACA
";

pub const EXPECTED_IDS: [&str; 3] = ["ECO_0001", "ECO_0002", "ECO_0003"];

pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `content` to `name` inside the fixture directory.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// Writes gzip-compressed `content` to `name`.
    pub fn write_gz(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        let file = std::fs::File::create(&path).expect("Failed to create fixture");
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).expect("Failed to compress fixture");
        encoder.finish().expect("Failed to finish gzip stream");
        path
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Deterministic annotation set spread over two contigs.
pub fn annotations(job_id: &str, count: usize) -> Vec<Annotation> {
    (0..count)
        .map(|i| {
            let start = (i as i64) * 100 + 1;
            let contig = if i % 2 == 0 { "contig_1" } else { "contig_2" };
            let (feature_type, strand) = match i % 3 {
                0 => ("gene", Strand::Forward),
                1 => ("CDS", Strand::Reverse),
                _ => ("tRNA", Strand::Unknown),
            };
            let attributes = Attributes::new()
                .with("product", format!("protein {}", i))
                .with("score", (i * 7 % 10).to_string());
            Annotation::new(job_id, format!("feat_{:03}", i), feature_type, contig, start, start + 80, strand)
                .with_attributes(attributes)
        })
        .collect()
}
