use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::core::types::FragmentId;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Invalid fragment id '{0}' (expected speaker_book_segment)")]
    InvalidFragmentId(String),

    #[error("Invalid similarity on line {line}: '{value}'")]
    InvalidSimilarity { line: usize, value: String },
}

/// One `filename<TAB>text` line of a transcripts file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRecord {
    pub filename: String,
    pub text: String,
}

impl FragmentRecord {
    /// Parse the `speaker_book_segment` identifier from the filename.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFragmentId` if the filename does not have three parts.
    pub fn id(&self) -> Result<FragmentId, ParseError> {
        FragmentId::parse(&self.filename)
            .ok_or_else(|| ParseError::InvalidFragmentId(self.filename.clone()))
    }
}

/// Records of a transcripts file, sorted by filename
#[derive(Debug, Clone, Default)]
pub struct TranscriptBatch {
    pub records: Vec<FragmentRecord>,
    /// Lines skipped because they were not `filename<TAB>text`
    pub malformed: usize,
    /// Lines dropped because a later line used the same filename
    pub duplicates: usize,
}

/// Parse a single `filename<TAB>text` line.
///
/// `line_num` is 1-based and only used for error messages.
///
/// # Errors
///
/// Returns `ParseError::MalformedRecord` unless the line has exactly two
/// tab-separated fields and a non-empty filename.
pub fn parse_fragment_line(line: &str, line_num: usize) -> Result<FragmentRecord, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 2 {
        return Err(ParseError::MalformedRecord {
            line: line_num,
            reason: format!("expected 2 tab-separated fields, found {}", fields.len()),
        });
    }

    let filename = fields[0].trim();
    if filename.is_empty() {
        return Err(ParseError::MalformedRecord {
            line: line_num,
            reason: "empty filename".to_string(),
        });
    }

    Ok(FragmentRecord {
        filename: filename.to_string(),
        text: fields[1].trim().to_string(),
    })
}

/// Parse transcripts text.
///
/// Blank lines are ignored and malformed lines are logged and skipped.
/// When a filename repeats, the last line wins.
#[must_use]
pub fn parse_transcripts_text(text: &str) -> TranscriptBatch {
    let mut by_filename = BTreeMap::new();
    let mut malformed = 0;
    let mut duplicates = 0;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_fragment_line(line, i + 1) {
            Ok(record) => {
                if by_filename.insert(record.filename.clone(), record).is_some() {
                    duplicates += 1;
                }
            }
            Err(e) => {
                warn!("Skipping record: {e}");
                malformed += 1;
            }
        }
    }

    TranscriptBatch {
        records: by_filename.into_values().collect(),
        malformed,
        duplicates,
    }
}

/// Read and parse a transcripts file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read.
pub fn parse_transcripts_file(path: &Path) -> Result<TranscriptBatch, ParseError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_transcripts_text(&content))
}
