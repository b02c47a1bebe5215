//! FASTA (`.fa`, `.fasta`, `.faa`, `.ffn`, `.fna`).

use crate::formats::{Document, FileFormat};
use crate::{BaktaError, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::line_ending,
    combinator::opt,
    sequence::{preceded, terminated},
    IResult,
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FastaDocument {
    pub entries: Vec<FastaEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastaEntry {
    /// Everything after `>` on the header line.
    pub header: String,
    pub sequence: String,
}

lazy_parser!(FastaParser, FileFormat::Fasta, FastaDocument, Document::Fasta, parse_str);

/// Parse one line, consuming its terminator if present. A lone `\r` also
/// ends a line.
fn parse_line(input: &str) -> IResult<&str, &str> {
    terminated(
        take_till(|c: char| c == '\n' || c == '\r'),
        opt(alt((line_ending, tag("\r")))),
    )(input)
}

/// Parse a FASTA header line
fn parse_header(input: &str) -> IResult<&str, &str> {
    let (input, header) = preceded(tag(">"), parse_line)(input)?;
    Ok((input, header.trim()))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &str) -> IResult<&str, String> {
    let mut sequence = String::new();
    let mut remaining = input;

    while !remaining.is_empty() && !remaining.starts_with('>') {
        let (rest, line) = parse_line(remaining)?;
        sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &str) -> IResult<&str, FastaEntry> {
    let (input, header) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;
    Ok((
        input,
        FastaEntry {
            header: header.to_string(),
            sequence,
        },
    ))
}

pub fn parse_str(text: &str) -> Result<FastaDocument> {
    let mut entries = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if !remaining.starts_with('>') {
            // Anything before the first header is not part of a record.
            let (rest, _) = parse_line(remaining)
                .map_err(|e| BaktaError::parse(FileFormat::Fasta, format!("{:?}", e)))?;
            remaining = rest;
            continue;
        }

        let (rest, entry) = parse_record(remaining)
            .map_err(|e| BaktaError::parse(FileFormat::Fasta, format!("{:?}", e)))?;

        if entry.sequence.is_empty() {
            warn!(header = %entry.header, "Dropping FASTA entry without sequence");
        } else {
            entries.push(entry);
        }
        remaining = rest;
    }

    Ok(FastaDocument { entries })
}
