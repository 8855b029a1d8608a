//! Parsers for the line-oriented record files.
//!
//! - **Transcripts**: `filename<TAB>text`, one ASR fragment per line
//! - **Output**: `filename|original_text|matched_text|similarity`
//! - **Segments**: `filename<TAB>link<TAB>begin<TAB>end`, times in seconds
//!
//! Fragment filenames have the form `speaker_book_segment`; the middle part
//! names the reference book.
//!
//! ## Example
//!
//! ```rust
//! use phrase_aligner::parsing::transcripts::parse_transcripts_text;
//!
//! let batch = parse_transcripts_text("spk_42_0002\tum rei\nspk_42_0001\tera uma vez\n");
//! assert_eq!(batch.records[0].filename, "spk_42_0001");
//! ```

pub mod output;
pub mod segments;
pub mod transcripts;

pub use transcripts::ParseError;
