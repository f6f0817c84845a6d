use crate::sequence::SequenceRecord;
use flate2::read::GzDecoder;
use mitoclass_core::{MitoclassError, MitoclassResult};
use nom::{
    bytes::complete::{tag, take_till, take_while1},
    character::complete::{line_ending, not_line_ending},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        take_while1(|c: u8| c == b' ' || c == b'\t'),
        map(not_line_ending, |s: &[u8]| {
            std::str::from_utf8(s).unwrap_or("").trim_end()
        }),
    ))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, (id, description)))
}

/// Accumulate sequence lines until the next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        // A bare '\r' with no following '\n' matches neither branch above.
        if rest.len() == remaining.len() {
            remaining = &rest[1..];
            continue;
        }

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase());
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

fn parse_records(input: &[u8], path: &str) -> MitoclassResult<Vec<SequenceRecord>> {
    let mut remaining: &[u8] = trim_leading_whitespace(input);

    if remaining.is_empty() {
        return Err(MitoclassError::Parse {
            path: path.to_string(),
            detail: "file contains no FASTA records".to_string(),
        });
    }
    if remaining[0] != b'>' {
        return Err(MitoclassError::Parse {
            path: path.to_string(),
            detail: "first record is missing its '>' header line".to_string(),
        });
    }

    let mut records = Vec::new();
    while !remaining.is_empty() {
        let (rest, (id, description)) =
            parse_header(remaining).map_err(|e| MitoclassError::Parse {
                path: path.to_string(),
                detail: format!("malformed header for record {}: {}", records.len() + 1, e),
            })?;
        let (rest, sequence) = parse_sequence(rest).map_err(|e| MitoclassError::Parse {
            path: path.to_string(),
            detail: format!("malformed sequence block for '{}': {}", id, e),
        })?;

        if sequence.is_empty() {
            return Err(MitoclassError::Parse {
                path: path.to_string(),
                detail: format!(
                    "record {} ('{}') has an empty sequence block",
                    records.len() + 1,
                    id
                ),
            });
        }

        let mut record = SequenceRecord::new(id.to_string(), sequence);
        if let Some(desc) = description {
            if !desc.is_empty() {
                record = record.with_description(desc.to_string());
            }
        }
        records.push(record);
        remaining = rest;
    }

    tracing::debug!(path, records = records.len(), "parsed FASTA file");
    Ok(records)
}

fn trim_leading_whitespace(input: &[u8]) -> &[u8] {
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(input.len());
    &input[start..]
}

/// Parse a FASTA file into records, preserving file order.
///
/// Gzip-compressed pools are detected by magic bytes and decompressed
/// transparently.
pub fn parse_fasta(path: &Path) -> MitoclassResult<Vec<SequenceRecord>> {
    let mut file = File::open(path)?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)?;

    let content = if raw.starts_with(&[0x1f, 0x8b]) {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        decompressed
    } else {
        raw
    };

    parse_records(&content, &path.display().to_string())
}

/// Parse FASTA text already held in memory (used by tests and fixtures).
pub fn parse_fasta_str(content: &str) -> MitoclassResult<Vec<SequenceRecord>> {
    parse_records(content.as_bytes(), "<memory>")
}

/// Write records as FASTA, wrapping sequence lines at 70 columns.
pub fn write_fasta(path: &Path, records: &[SequenceRecord]) -> MitoclassResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writeln!(writer, "{}", record.header())?;
        for chunk in record.sequence.chunks(70) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }

    writer.flush()?;
    Ok(())
}
