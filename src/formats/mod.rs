//! Result-file parsers.
//!
//! Every parser is built from either a path or in-memory content and exposes
//! [`Parse::parse`], which reads and parses the input on first call and hands
//! back the memoized [`Document`] afterwards. Parsers are looked up by
//! [`FileFormat`] through [`parser_for_format`].

use crate::{BaktaError, Result};
use flate2::read::GzDecoder;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Gff3,
    Tsv,
    Json,
    Embl,
    GenBank,
    Fasta,
}

impl FileFormat {
    pub const ALL: [FileFormat; 6] = [
        FileFormat::Gff3,
        FileFormat::Tsv,
        FileFormat::Json,
        FileFormat::Embl,
        FileFormat::GenBank,
        FileFormat::Fasta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Gff3 => "gff3",
            FileFormat::Tsv => "tsv",
            FileFormat::Json => "json",
            FileFormat::Embl => "embl",
            FileFormat::GenBank => "genbank",
            FileFormat::Fasta => "fasta",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Gff3 => &["gff", "gff3"],
            FileFormat::Tsv => &["tsv"],
            FileFormat::Json => &["json"],
            FileFormat::Embl => &["embl"],
            FileFormat::GenBank => &["gb", "gbk", "gbff"],
            FileFormat::Fasta => &["fa", "fasta", "faa", "ffn", "fna"],
        }
    }

    /// Resolves a format name or a result-file label (`gbff`, `faa`, ...).
    pub fn from_name(name: &str) -> Result<Self> {
        let lowered = name.trim().trim_start_matches('.').to_ascii_lowercase();
        if lowered == "genbank" {
            return Ok(FileFormat::GenBank);
        }
        Self::ALL
            .into_iter()
            .find(|format| format.name() == lowered || format.extensions().contains(&lowered.as_str()))
            .ok_or_else(|| BaktaError::UnsupportedFormat {
                requested: name.to_string(),
                valid: Self::valid_names(),
            })
    }

    /// Resolves the format from the file extension, ignoring a trailing `.gz`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let unsupported = || BaktaError::UnsupportedFormat {
            requested: path.display().to_string(),
            valid: Self::valid_extensions(),
        };

        let mut extension = path.extension().and_then(|e| e.to_str());
        if extension.map(|e| e.eq_ignore_ascii_case("gz")).unwrap_or(false) {
            extension = path
                .file_stem()
                .map(Path::new)
                .and_then(|stem| stem.extension())
                .and_then(|e| e.to_str());
        }

        let extension = extension.ok_or_else(unsupported)?.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&extension.as_str()))
            .ok_or_else(unsupported)
    }

    pub fn produces_sequences(&self) -> bool {
        matches!(self, FileFormat::Fasta)
    }

    fn valid_extensions() -> String {
        Self::ALL
            .iter()
            .flat_map(|format| format.extensions().iter())
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn valid_names() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|format| format.name()).collect();
        for format in Self::ALL {
            for ext in format.extensions() {
                if !names.contains(ext) {
                    names.push(ext);
                }
            }
        }
        names.join(", ")
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileFormat {
    type Err = BaktaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Parser input: exactly one of a path or in-memory content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Content(String),
}

impl Source {
    pub fn new(path: Option<PathBuf>, content: Option<String>) -> Result<Self> {
        match (path, content) {
            (Some(path), None) => Ok(Source::Path(path)),
            (None, Some(content)) => Ok(Source::Content(content)),
            (Some(_), Some(_)) => Err(BaktaError::Construction(
                "either a file path or content must be given, not both".to_string(),
            )),
            (None, None) => Err(BaktaError::Construction(
                "either a file path or content must be given".to_string(),
            )),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::Path(path) => Some(path),
            Source::Content(_) => None,
        }
    }

    /// Reads the whole input as text. Unreadable files surface as parse
    /// errors for `format`; `.gz` paths are decompressed.
    pub fn read_text(&self, format: FileFormat) -> Result<Cow<'_, str>> {
        match self {
            Source::Content(content) => Ok(Cow::Borrowed(content)),
            Source::Path(path) => read_path(path)
                .map(Cow::Owned)
                .map_err(|e| BaktaError::parse(format, format!("cannot read {}: {}", path.display(), e))),
        }
    }
}

fn read_path(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut buffer = String::new();
    let gzipped = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    if gzipped {
        GzDecoder::new(BufReader::new(file)).read_to_string(&mut buffer)?;
    } else {
        BufReader::new(file).read_to_string(&mut buffer)?;
    }
    Ok(buffer)
}

/// Parsed intermediate document, one variant per source format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "document", rename_all = "lowercase")]
pub enum Document {
    Gff3(Gff3Document),
    Tsv(TsvDocument),
    Json(JsonDocument),
    Embl(FlatFileDocument),
    GenBank(FlatFileDocument),
    Fasta(FastaDocument),
}

impl Document {
    pub fn format(&self) -> FileFormat {
        match self {
            Document::Gff3(_) => FileFormat::Gff3,
            Document::Tsv(_) => FileFormat::Tsv,
            Document::Json(_) => FileFormat::Json,
            Document::Embl(_) => FileFormat::Embl,
            Document::GenBank(_) => FileFormat::GenBank,
            Document::Fasta(_) => FileFormat::Fasta,
        }
    }

    /// Number of feature rows (or sequence entries for FASTA).
    pub fn entry_count(&self) -> usize {
        match self {
            Document::Gff3(doc) => doc.features.len(),
            Document::Tsv(doc) => doc.rows.len(),
            Document::Json(doc) => doc.feature_count(),
            Document::Embl(doc) | Document::GenBank(doc) => doc.feature_count(),
            Document::Fasta(doc) => doc.entries.len(),
        }
    }
}

/// Capability shared by all format parsers.
pub trait Parse: Send + Sync {
    fn format(&self) -> FileFormat;

    fn source(&self) -> &Source;

    /// Parses on first call; later calls return the memoized document.
    fn parse(&self) -> Result<&Document>;
}

/// Source plus the memoized parse result, shared by every parser type.
#[derive(Debug)]
pub(crate) struct LazyDocument {
    source: Source,
    parsed: OnceCell<Document>,
}

impl LazyDocument {
    pub(crate) fn new(source: Source) -> Self {
        Self {
            source,
            parsed: OnceCell::new(),
        }
    }

    pub(crate) fn source(&self) -> &Source {
        &self.source
    }

    pub(crate) fn get_or_parse<F>(&self, format: FileFormat, parse: F) -> Result<&Document>
    where
        F: FnOnce(&str) -> Result<Document>,
    {
        self.parsed.get_or_try_init(|| {
            let text = self.source.read_text(format)?;
            parse(&text)
        })
    }
}

/// Generates the constructors, typed accessor and [`Parse`] impl for a
/// parser type backed by [`LazyDocument`].
macro_rules! lazy_parser {
    ($parser:ident, $format:expr, $doc:ty, $variant:path, $parse_fn:path) => {
        #[derive(Debug)]
        pub struct $parser {
            inner: $crate::formats::LazyDocument,
        }

        impl $parser {
            /// Fails with a construction error unless exactly one input is given.
            pub fn new(
                path: Option<std::path::PathBuf>,
                content: Option<String>,
            ) -> $crate::Result<Self> {
                Ok(Self::from_source($crate::formats::Source::new(path, content)?))
            }

            pub fn from_source(source: $crate::formats::Source) -> Self {
                Self {
                    inner: $crate::formats::LazyDocument::new(source),
                }
            }

            pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
                Self::from_source($crate::formats::Source::Path(path.into()))
            }

            pub fn from_content(content: impl Into<String>) -> Self {
                Self::from_source($crate::formats::Source::Content(content.into()))
            }

            /// Typed view of [`Parse::parse`].
            pub fn document(&self) -> $crate::Result<&$doc> {
                match $crate::formats::Parse::parse(self)? {
                    $variant(doc) => Ok(doc),
                    other => Err($crate::BaktaError::parse(
                        $format,
                        format!("parser produced a {} document", other.format()),
                    )),
                }
            }
        }

        impl $crate::formats::Parse for $parser {
            fn format(&self) -> $crate::formats::FileFormat {
                $format
            }

            fn source(&self) -> &$crate::formats::Source {
                self.inner.source()
            }

            fn parse(&self) -> $crate::Result<&$crate::formats::Document> {
                self.inner
                    .get_or_parse($format, |text| $parse_fn(text).map($variant))
            }
        }
    };
}

// Declared after `lazy_parser!` so the submodules can invoke it.
pub mod embl;
pub mod fasta;
pub mod flatfile;
pub mod genbank;
pub mod gff3;
pub mod json;
pub mod tsv;

pub use embl::EmblParser;
pub use fasta::{FastaDocument, FastaEntry, FastaParser};
pub use flatfile::{FlatFileDocument, FlatFileFeature, FlatFileRecord};
pub use genbank::GenBankParser;
pub use gff3::{Gff3Document, Gff3Feature, Gff3Parser};
pub use json::{JsonDocument, JsonParser};
pub use tsv::{TsvDocument, TsvParser};

/// Parser lookup table keyed by format.
pub fn parser_for_format(format: FileFormat, source: Source) -> Box<dyn Parse> {
    match format {
        FileFormat::Gff3 => Box::new(Gff3Parser::from_source(source)),
        FileFormat::Tsv => Box::new(TsvParser::from_source(source)),
        FileFormat::Json => Box::new(JsonParser::from_source(source)),
        FileFormat::Embl => Box::new(EmblParser::from_source(source)),
        FileFormat::GenBank => Box::new(GenBankParser::from_source(source)),
        FileFormat::Fasta => Box::new(FastaParser::from_source(source)),
    }
}

/// Resolves the parser from the file extension and parses the file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let parser = parser_for_format(format, Source::Path(path.to_path_buf()));
    parser.parse().cloned()
}

/// Parses in-memory content with an explicitly named format.
pub fn parse_content(format_name: &str, content: impl Into<String>) -> Result<Document> {
    let format = FileFormat::from_name(format_name)?;
    let parser = parser_for_format(format, Source::Content(content.into()));
    parser.parse().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("out/x.gff3")).unwrap(), FileFormat::Gff3);
        assert_eq!(FileFormat::from_path(Path::new("x.GBFF")).unwrap(), FileFormat::GenBank);
        assert_eq!(FileFormat::from_path(Path::new("x.ffn")).unwrap(), FileFormat::Fasta);
        assert_eq!(FileFormat::from_path(Path::new("x.embl.gz")).unwrap(), FileFormat::Embl);
    }

    #[test]
    fn test_unsupported_extension_lists_valid_set() {
        let err = FileFormat::from_path(Path::new("x.bam")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(".gff3"));
        assert!(message.contains(".gbff"));
        assert!(message.contains(".fna"));

        assert!(FileFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_format_from_name_labels() {
        assert_eq!(FileFormat::from_name("gbff").unwrap(), FileFormat::GenBank);
        assert_eq!(FileFormat::from_name("GenBank").unwrap(), FileFormat::GenBank);
        assert_eq!(FileFormat::from_name("faa").unwrap(), FileFormat::Fasta);
        assert_eq!(FileFormat::from_name("gff").unwrap(), FileFormat::Gff3);
        assert!(matches!(
            FileFormat::from_name("sam"),
            Err(BaktaError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_source_requires_exactly_one_input() {
        assert!(matches!(Source::new(None, None), Err(BaktaError::Construction(_))));
        assert!(matches!(
            Source::new(Some(PathBuf::from("a.gff3")), Some(String::new())),
            Err(BaktaError::Construction(_))
        ));
        assert_eq!(
            Source::new(None, Some("x".to_string())).unwrap(),
            Source::Content("x".to_string())
        );
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let parser = parser_for_format(FileFormat::Tsv, Source::Path(PathBuf::from("/nonexistent/x.tsv")));
        match parser.parse() {
            Err(BaktaError::Parse { format, .. }) => assert_eq!(format, "tsv"),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_is_memoized() {
        let parser = Gff3Parser::from_content("chr1\tsrc\tgene\t1\t10\t.\t+\t.\tID=g1\n");
        let first = parser.parse().unwrap() as *const Document;
        let second = parser.parse().unwrap() as *const Document;
        assert_eq!(first, second);
    }
}
