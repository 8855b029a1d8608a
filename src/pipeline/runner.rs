use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::catalog::store::CatalogError;
use crate::matching::engine::AlignmentEngine;
use crate::parsing::output::{count_records, parse_output_line, OutputRecord};
use crate::parsing::transcripts::parse_transcripts_file;
use crate::parsing::ParseError;
use crate::pipeline::{PipelineError, References, RunSummary};

/// A line of an earlier run
#[derive(Debug)]
struct PreviousLine {
    similarity: f64,
    matched: bool,
    line: String,
}

/// Whether `output` already holds one line per record of `input`.
///
/// # Errors
///
/// Returns `PipelineError::Parse` if either file cannot be read.
pub fn is_complete(input: &Path, output: &Path) -> Result<bool, PipelineError> {
    if !output.is_file() {
        return Ok(false);
    }
    let batch = parse_transcripts_file(input)?;
    Ok(output_is_complete(batch.records.len(), output)?)
}

fn output_is_complete(expected: usize, output: &Path) -> Result<bool, ParseError> {
    if expected == 0 || !output.is_file() {
        return Ok(false);
    }
    Ok(count_records(output)? == expected)
}

/// Earlier output lines keyed by filename.
///
/// `None` if any line cannot be parsed, in which case every record is aligned again.
fn load_previous(output: &Path) -> Result<Option<HashMap<String, PreviousLine>>, ParseError> {
    let content = std::fs::read_to_string(output)?;
    let mut previous = HashMap::new();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_output_line(line, i + 1) {
            Ok(record) => {
                previous.insert(
                    record.filename,
                    PreviousLine {
                        similarity: record.similarity,
                        matched: !record.matched_text.is_empty(),
                        line: line.to_string(),
                    },
                );
            }
            Err(e) => {
                warn!(output = %output.display(), "Cannot re-score earlier output: {e}");
                return Ok(None);
            }
        }
    }

    Ok(Some(previous))
}

/// Output lines written to a temporary file beside the destination
struct OutputWriter {
    file: BufWriter<NamedTempFile>,
    path: PathBuf,
}

impl OutputWriter {
    fn create(path: &Path) -> Result<Self, PipelineError> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = NamedTempFile::new_in(dir).map_err(|source| write_error(path, source))?;
        Ok(Self {
            file: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Write one line and flush it.
    fn write_line(&mut self, line: &str) -> Result<(), PipelineError> {
        writeln!(self.file, "{line}")
            .and_then(|()| self.file.flush())
            .map_err(|source| write_error(&self.path, source))
    }

    /// Replace the destination with everything written so far.
    fn persist(self) -> Result<(), PipelineError> {
        let path = self.path;
        let file = self
            .file
            .into_inner()
            .map_err(|e| write_error(&path, e.into_error()))?;
        file.persist(&path)
            .map_err(|e| write_error(&path, e.error))?;
        Ok(())
    }
}

fn write_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Align every record of `input` and write the results to `output`.
///
/// Records are processed in filename order. In sequenced mode the search
/// cursor carries over between consecutive records of the same book and
/// restarts at zero when the book changes. Records of books without a
/// reference text are skipped and reported in the summary.
///
/// # Errors
///
/// Returns `PipelineError` if the input cannot be read, a reference book
/// cannot be read, or the output cannot be written.
pub fn run_batch(
    engine: &mut AlignmentEngine,
    references: &References<'_>,
    input: &Path,
    output: &Path,
) -> Result<RunSummary, PipelineError> {
    let started = Instant::now();
    let batch = parse_transcripts_file(input)?;
    let mut summary = RunSummary {
        malformed: batch.malformed,
        duplicates: batch.duplicates,
        ..RunSummary::default()
    };

    let previous = if output_is_complete(batch.records.len(), output)? {
        info!(output = %output.display(), "Output is complete, re-scoring low-similarity records");
        load_previous(output)?
    } else {
        None
    };
    let rescore_threshold = engine.config().rescore_threshold;
    let sequenced = engine.config().sequenced && previous.is_none();

    let mut writer = OutputWriter::create(output)?;
    let mut cursor = 0;
    let mut current_book: Option<String> = None;

    for record in &batch.records {
        if let Some(line) = previous.as_ref().and_then(|p| p.get(&record.filename)) {
            if line.similarity > rescore_threshold {
                writer.write_line(&line.line)?;
                summary.kept += 1;
                summary.record(line.similarity, line.matched);
                continue;
            }
        }

        let book = record.id().ok().map(|id| id.book);
        let reference = match references {
            References::Single(text) => Arc::clone(text),
            References::Library(store) => {
                let Some(book_id) = book.as_deref() else {
                    warn!(
                        filename = %record.filename,
                        "Skipping record: filename does not name a book"
                    );
                    summary.malformed += 1;
                    continue;
                };
                if summary.missing_books.iter().any(|b| b == book_id) {
                    continue;
                }
                match engine.reference_for(store, book_id) {
                    Ok(text) => text,
                    Err(CatalogError::MissingReference { book_id, path }) => {
                        warn!(
                            book_id = %book_id,
                            path = %path.display(),
                            "Reference text missing, skipping its fragments"
                        );
                        summary.missing_book(&book_id);
                        continue;
                    }
                    Err(CatalogError::InvalidBookId(book_id)) => {
                        warn!(
                            filename = %record.filename,
                            book_id = %book_id,
                            "Skipping record: invalid book id"
                        );
                        summary.malformed += 1;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        if book != current_book {
            cursor = 0;
            current_book = book;
        }
        let start = if sequenced { cursor } else { 0 };

        let result = engine.align_text(&record.text, &reference, start);
        if sequenced {
            cursor = result.cursor_after;
        }

        if result.is_match() {
            debug!(
                filename = %record.filename,
                similarity = result.similarity,
                start,
                cursor = result.cursor_after,
                "Aligned fragment"
            );
        } else {
            debug!(filename = %record.filename, start, "No match found");
        }

        writer.write_line(&OutputRecord::from_match(record, &result).to_line())?;
        summary.record(result.similarity, result.is_match());
    }

    writer.persist()?;
    summary.elapsed_secs = started.elapsed().as_secs_f64();

    info!(
        input = %input.display(),
        records = summary.records,
        kept = summary.kept,
        mean_similarity = summary.mean_similarity,
        "Finished batch"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::BookStore;
    use crate::core::types::SearchType;
    use crate::matching::engine::AlignerConfig;

    const BOOK_1: &str = "O gato subiu no telhado. O cão ficou no quintal.";
    const BOOK_2: &str = "A chuva caiu sobre a cidade. As ruas ficaram molhadas.";

    fn engine(config: AlignerConfig) -> AlignmentEngine {
        AlignmentEngine::new(config).unwrap()
    }

    fn single(engine: &AlignmentEngine, text: &str) -> References<'static> {
        References::Single(Arc::new(engine.prepare_reference(text)))
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_run_batch_writes_sorted_records() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transcripts.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(
            &input,
            "s_1_2\to cao ficou no quintal\n\
             s_1_1\to gato subiu no telhado\n\
             s_1_3\tkwy xxkw\n\
             broken\n",
        )
        .unwrap();

        let mut engine = engine(AlignerConfig::default());
        let references = single(&engine, BOOK_1);
        let summary = run_batch(&mut engine, &references, &input, &output).unwrap();

        assert_eq!(
            read_lines(&output),
            vec![
                "s_1_1|o gato subiu no telhado|O gato subiu no telhado.|1.0",
                "s_1_2|o cao ficou no quintal|O cão ficou no quintal.|1.0",
                "s_1_3|kwy xxkw||0.0",
            ]
        );
        assert_eq!(summary.records, 3);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.malformed, 1);
        assert!((summary.mean_similarity - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rescore_keeps_confident_lines() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transcripts.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(
            &input,
            "s_1_1\to gato subiu no telhado\ns_1_2\to cao ficou no quintal\n",
        )
        .unwrap();
        std::fs::write(
            &output,
            "s_1_1|o gato subiu no telhado|KEPT|0.95\n\
             s_1_2|o cao ficou no quintal|wrong|0.2\n",
        )
        .unwrap();

        let mut engine = engine(AlignerConfig::default());
        let references = single(&engine, BOOK_1);
        let summary = run_batch(&mut engine, &references, &input, &output).unwrap();

        assert_eq!(
            read_lines(&output),
            vec![
                "s_1_1|o gato subiu no telhado|KEPT|0.95",
                "s_1_2|o cao ficou no quintal|O cão ficou no quintal.|1.0",
            ]
        );
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.records, 2);
    }

    #[test]
    fn test_incomplete_output_is_recomputed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transcripts.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(
            &input,
            "s_1_1\to gato subiu no telhado\ns_1_2\to cao ficou no quintal\n",
        )
        .unwrap();
        std::fs::write(&output, "s_1_1|o gato subiu no telhado|KEPT|0.95\n").unwrap();

        assert!(!is_complete(&input, &output).unwrap());

        let mut engine = engine(AlignerConfig::default());
        let references = single(&engine, BOOK_1);
        let summary = run_batch(&mut engine, &references, &input, &output).unwrap();

        assert_eq!(summary.kept, 0);
        assert!(!std::fs::read_to_string(&output).unwrap().contains("KEPT"));
        assert!(is_complete(&input, &output).unwrap());
    }

    #[test]
    fn test_second_run_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transcripts.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(
            &input,
            "s_1_1\to gato subiu no telhado\ns_1_2\to cao ficou no quintal\n",
        )
        .unwrap();

        let mut engine = engine(AlignerConfig::default());
        let references = single(&engine, BOOK_1);
        run_batch(&mut engine, &references, &input, &output).unwrap();
        let first = std::fs::read(&output).unwrap();

        let summary = run_batch(&mut engine, &references, &input, &output).unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), first);
        assert_eq!(summary.kept, 2);
    }

    #[test]
    fn test_library_skips_missing_books() {
        let dir = tempfile::tempdir().unwrap();
        let books = dir.path().join("books");
        std::fs::create_dir(&books).unwrap();
        std::fs::write(books.join("1.txt"), BOOK_1).unwrap();

        let input = dir.path().join("transcripts.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(
            &input,
            "s_1_1\to gato subiu no telhado\n\
             s_9_1\tum livro perdido\n\
             s_9_2\toutro trecho perdido\n\
             nobook\tsem livro\n",
        )
        .unwrap();

        let store = BookStore::new(&books);
        let mut engine = engine(AlignerConfig::default());
        let summary =
            run_batch(&mut engine, &References::Library(&store), &input, &output).unwrap();

        assert_eq!(read_lines(&output).len(), 1);
        assert_eq!(summary.records, 1);
        assert_eq!(summary.missing_books, vec!["9"]);
        assert_eq!(summary.malformed, 1);
    }

    #[test]
    fn test_sequenced_cursor_restarts_per_book() {
        let dir = tempfile::tempdir().unwrap();
        let books = dir.path().join("books");
        std::fs::create_dir(&books).unwrap();
        std::fs::write(books.join("1.txt"), BOOK_1).unwrap();
        std::fs::write(books.join("2.txt"), BOOK_2).unwrap();

        let input = dir.path().join("transcripts.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(
            &input,
            "s_1_1\to gato subiu no telhado\n\
             s_1_2\to cao ficou no quintal\n\
             s_2_1\ta chuva caiu sobre a cidade\n",
        )
        .unwrap();

        // The char search starts at the cursor, so a stale cursor would miss
        // the first phrase of the second book.
        let config = AlignerConfig {
            sequenced: true,
            search_type: SearchType::Char,
            ..AlignerConfig::default()
        };
        let store = BookStore::new(&books);
        let mut engine = engine(config);
        let summary =
            run_batch(&mut engine, &References::Library(&store), &input, &output).unwrap();

        let lines = read_lines(&output);
        assert_eq!(
            lines[2],
            "s_2_1|a chuva caiu sobre a cidade|A chuva caiu sobre a cidade.|1.0"
        );
        assert_eq!(summary.matched, 3);
        assert_eq!(engine.books_loaded(), 2);
    }

    #[test]
    fn test_unreadable_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(AlignerConfig::default());
        let references = single(&engine, BOOK_1);
        let result = run_batch(
            &mut engine,
            &references,
            &dir.path().join("missing.txt"),
            &dir.path().join("output.txt"),
        );
        assert!(matches!(result, Err(PipelineError::Parse(ParseError::Io(_)))));
        assert!(!dir.path().join("output.txt").exists());
    }
}
