//! # phrase-aligner
//!
//! A library for recovering the punctuated source phrase of ASR transcript fragments.
//!
//! Speech recognizers produce text without punctuation or capitalization. When
//! the speech is a reading of a known book, the exact phrase can be found in
//! the book and copied back with its original punctuation, along with a
//! similarity score saying how well the fragment matched.
//!
//! `phrase-aligner` searches the book with two complementary strategies:
//!
//! - **Word matching**: walks fragment and book tokens side by side and keeps
//!   the longest run of similar words
//! - **Char matching**: compares flattened characters, for fragments where the
//!   recognizer split or merged words differently from the book
//!
//! The search over book positions is split across worker threads.
//!
//! ## Example
//!
//! ```rust
//! use phrase_aligner::{AlignerConfig, AlignmentEngine};
//!
//! let engine = AlignmentEngine::new(AlignerConfig::default()).unwrap();
//! let book = engine.prepare_reference("Olá, mundo! Como vai?");
//!
//! let result = engine.align_text("ola mundo", &book, 0);
//! assert_eq!(result.matched_text.as_deref(), Some("Olá, mundo!"));
//! assert!(result.similarity > 0.9);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Tokens, text normalization and shared types
//! - [`matching`]: Similarity metrics, matchers and the alignment engine
//! - [`catalog`]: Reference book lookup and caching
//! - [`parsing`]: Transcript, output and segment record formats
//! - [`pipeline`]: Batch alignment with resumable output
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::BookStore;
pub use crate::core::token::{TokenSpan, TokenizedText};
pub use crate::core::types::*;
pub use matching::engine::{AlignerConfig, AlignmentEngine, MatchResult};
pub use pipeline::RunSummary;
