use std::path::Path;

use crate::matching::engine::MatchResult;
use crate::parsing::transcripts::{FragmentRecord, ParseError};

/// Field separator of output lines
pub const OUTPUT_DELIMITER: char = '|';

/// One `filename|original_text|matched_text|similarity` line
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub filename: String,
    pub original_text: String,
    /// Empty when no span was found
    pub matched_text: String,
    pub similarity: f64,
}

impl OutputRecord {
    #[must_use]
    pub fn from_match(record: &FragmentRecord, result: &MatchResult) -> Self {
        Self {
            filename: record.filename.clone(),
            original_text: record.text.clone(),
            matched_text: result.matched_text.clone().unwrap_or_default(),
            similarity: result.similarity,
        }
    }

    /// Render as an output line, without the trailing newline.
    ///
    /// Delimiters and line breaks inside fields become spaces so every
    /// record stays on one line with exactly four fields. The similarity
    /// uses the shortest representation that parses back to the same value.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{:?}",
            sanitize(&self.filename),
            sanitize(&self.original_text),
            sanitize(&self.matched_text),
            self.similarity
        )
    }
}

fn sanitize(field: &str) -> String {
    field.replace([OUTPUT_DELIMITER, '\n', '\r'], " ")
}

/// Parse one output line.
///
/// # Errors
///
/// Returns `ParseError::MalformedRecord` unless the line has exactly four
/// fields, or `ParseError::InvalidSimilarity` if the last field is not a
/// number in `[0, 1]`.
pub fn parse_output_line(line: &str, line_num: usize) -> Result<OutputRecord, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split(OUTPUT_DELIMITER).collect();

    let [filename, original_text, matched_text, similarity] = fields.as_slice() else {
        return Err(ParseError::MalformedRecord {
            line: line_num,
            reason: format!("expected 4 '|'-separated fields, found {}", fields.len()),
        });
    };

    let similarity: f64 = similarity
        .trim()
        .parse()
        .ok()
        .filter(|s| (0.0..=1.0).contains(s))
        .ok_or_else(|| ParseError::InvalidSimilarity {
            line: line_num,
            value: (*similarity).to_string(),
        })?;

    Ok(OutputRecord {
        filename: (*filename).to_string(),
        original_text: (*original_text).to_string(),
        matched_text: (*matched_text).to_string(),
        similarity,
    })
}

/// Parse every non-blank line of an output file.
///
/// # Errors
///
/// Returns the first `ParseError` encountered.
pub fn parse_output_text(text: &str) -> Result<Vec<OutputRecord>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_output_line(line, i + 1))
        .collect()
}

/// Read and parse an output file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the first line error.
pub fn parse_output_file(path: &Path) -> Result<Vec<OutputRecord>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_output_text(&content)
}

/// Number of non-blank lines in a file
///
/// # Errors
///
/// Returns the IO error if the file cannot be read.
pub fn count_records(path: &Path) -> Result<usize, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().filter(|l| !l.trim().is_empty()).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(matched: &str, similarity: f64) -> OutputRecord {
        OutputRecord {
            filename: "s_1_1".to_string(),
            original_text: "ola mundo".to_string(),
            matched_text: matched.to_string(),
            similarity,
        }
    }

    #[test]
    fn test_to_line() {
        assert_eq!(
            record("Olá, mundo!", 1.0).to_line(),
            "s_1_1|ola mundo|Olá, mundo!|1.0"
        );
        assert_eq!(record("", 0.0).to_line(), "s_1_1|ola mundo||0.0");
        assert_eq!(
            record("a", 0.9523809523809523).to_line(),
            "s_1_1|ola mundo|a|0.9523809523809523"
        );
    }

    #[test]
    fn test_fields_are_sanitized() {
        let line = record("um | dois\ntrês", 0.5).to_line();
        assert_eq!(line, "s_1_1|ola mundo|um   dois três|0.5");
        assert_eq!(parse_output_line(&line, 1).unwrap().matched_text, "um   dois três");
    }

    #[test]
    fn test_parse_output_line() {
        let parsed = parse_output_line("s_1_1|ola mundo|Olá, mundo!|0.875\n", 1).unwrap();
        assert_eq!(parsed, record("Olá, mundo!", 0.875));
        assert_eq!(parsed.to_line(), "s_1_1|ola mundo|Olá, mundo!|0.875");
    }

    #[test]
    fn test_parse_output_errors() {
        assert!(matches!(
            parse_output_line("a|b|c", 3),
            Err(ParseError::MalformedRecord { line: 3, .. })
        ));
        assert!(matches!(
            parse_output_line("a|b|c|high", 2),
            Err(ParseError::InvalidSimilarity { line: 2, .. })
        ));
        assert!(parse_output_line("a|b|c|1.5", 1).is_err());
    }

    #[test]
    fn test_parse_output_text_skips_blank_lines() {
        let records = parse_output_text("a_b_c|x|X|1.0\n\nd_e_f|y||0.0\n").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].matched_text.is_empty());
    }

    #[test]
    fn test_count_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        std::fs::write(&path, "a|b|c|1.0\n\nd|e|f|0.5\n").unwrap();
        assert_eq!(count_records(&path).unwrap(), 2);
    }
}
