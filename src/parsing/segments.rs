use std::path::Path;

use crate::core::segment::{Segment, SegmentList};
use crate::parsing::transcripts::ParseError;

/// Parse `filename<TAB>link<TAB>begin<TAB>end` lines into a segment list.
///
/// Times are in seconds. Blank lines and `#` comments are ignored.
///
/// # Errors
///
/// Returns `ParseError::MalformedRecord` for lines without four fields,
/// unparseable times, or segments that end before they begin.
pub fn parse_segments_text(text: &str) -> Result<SegmentList, ParseError> {
    let mut segments = SegmentList::default();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let [id, source, begin, end] = fields.as_slice() else {
            return Err(ParseError::MalformedRecord {
                line: line_num,
                reason: format!("expected 4 tab-separated fields, found {}", fields.len()),
            });
        };

        let time = |value: &str| -> Result<f64, ParseError> {
            value
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or_else(|| ParseError::MalformedRecord {
                    line: line_num,
                    reason: format!("invalid time '{value}'"),
                })
        };
        let (begin, end) = (time(*begin)?, time(*end)?);

        if end < begin {
            return Err(ParseError::MalformedRecord {
                line: line_num,
                reason: format!("segment ends at {end} before it begins at {begin}"),
            });
        }

        segments.push(Segment {
            id: (*id).to_string(),
            source: (*source).to_string(),
            begin,
            end,
        });
    }

    Ok(segments)
}

/// Read and parse a segments file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the first line error.
pub fn parse_segments_file(path: &Path) -> Result<SegmentList, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_segments_text(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let text = "# id\tlink\tbegin\tend\n\
                    s_1_1\thttp://a/1.mp3\t0.0\t2.5\n\
                    s_1_2\thttp://a/1.mp3\t2.7\t5.0\n";
        let list = parse_segments_text(text).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.segments()[1].source, "http://a/1.mp3");
        assert!((list.gap(0).unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_segments_errors() {
        assert!(matches!(
            parse_segments_text("s_1_1\tlink\t0.0\n"),
            Err(ParseError::MalformedRecord { line: 1, .. })
        ));
        assert!(parse_segments_text("s_1_1\tlink\tzero\t1.0\n").is_err());
        assert!(parse_segments_text("s_1_1\tlink\t3.0\t1.0\n").is_err());
        assert!(parse_segments_text("s_1_1\tlink\t-1\t1.0\n").is_err());
    }
}
