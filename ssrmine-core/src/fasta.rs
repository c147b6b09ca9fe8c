//! FASTA/FASTQ sequence loading
//!
//! Fast parsing of FASTA and FASTQ files using the needletail library,
//! with transparent gzip support for `.gz` paths. Sequence content is
//! normalized on load: bytes are uppercased and everything outside the
//! A/C/G/T alphabet is stripped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Result;
use flate2::read::GzDecoder;
use needletail::{parse_fastx_file, parse_fastx_reader};
use thiserror::Error;

use crate::types::Sequence;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty file or no sequences found")]
    EmptyFile,
    #[error("No A/C/G/T content left after cleaning")]
    NoUsableContent,
}

/// Loader for assembly sequence files.
pub struct FastaLoader;

impl FastaLoader {
    /// Load every sequence from a FASTA/FASTQ file, cleaned to the
    /// A/C/G/T alphabet. Sequences with no usable content are dropped
    /// with a warning; a file with nothing usable is an error.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
        let path_str = path.as_ref().to_string_lossy();

        if path_str.ends_with(".gz") {
            Self::load_gzipped_file(path)
        } else {
            Self::load_uncompressed_file(path)
        }
    }

    fn load_uncompressed_file<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
        let mut sequences = Vec::new();
        let mut records_seen = 0usize;
        let mut reader = parse_fastx_file(&path).map_err(|e| FastaError::Parse(e.to_string()))?;

        while let Some(record) = reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            records_seen += 1;
            push_cleaned(&mut sequences, record.id(), &record.seq());
        }

        finalize(sequences, records_seen)
    }

    fn load_gzipped_file<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
        let file = File::open(&path)?;
        let decoder = GzDecoder::new(file);
        let buf_reader = BufReader::new(decoder);

        Self::load_reader(buf_reader)
    }

    /// Load sequences from any readable source.
    pub fn load_reader<R: std::io::Read + Send>(reader: R) -> Result<Vec<Sequence>> {
        let mut sequences = Vec::new();
        let mut records_seen = 0usize;
        let mut fastx_reader =
            parse_fastx_reader(reader).map_err(|e| FastaError::Parse(e.to_string()))?;

        while let Some(record) = fastx_reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            records_seen += 1;
            push_cleaned(&mut sequences, record.id(), &record.seq());
        }

        finalize(sequences, records_seen)
    }

    /// Total cleaned length across all sequences in a file.
    pub fn total_length<P: AsRef<Path>>(path: P) -> Result<u64> {
        let sequences = Self::load_file(path)?;
        Ok(sequences.iter().map(|s| s.len() as u64).sum())
    }
}

/// Uppercase and keep only A/C/G/T. Ambiguity codes, gaps and
/// whitespace all disappear, so downstream coordinates refer to the
/// cleaned sequence.
pub fn clean_sequence(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .filter_map(|&b| match b.to_ascii_uppercase() {
            c @ (b'A' | b'C' | b'G' | b'T') => Some(c),
            _ => None,
        })
        .collect()
}

fn push_cleaned(sequences: &mut Vec<Sequence>, id_bytes: &[u8], raw: &[u8]) {
    let id = String::from_utf8_lossy(id_bytes)
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();
    let data = clean_sequence(raw);
    if data.is_empty() {
        log::warn!("sequence '{}' has no A/C/G/T content, skipping", id);
        return;
    }
    sequences.push(Sequence::new(id, data));
}

fn finalize(sequences: Vec<Sequence>, records_seen: usize) -> Result<Vec<Sequence>> {
    if !sequences.is_empty() {
        Ok(sequences)
    } else if records_seen == 0 {
        Err(FastaError::EmptyFile.into())
    } else {
        Err(FastaError::NoUsableContent.into())
    }
}
