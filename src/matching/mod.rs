//! Fragment alignment: similarity metrics, matchers and the engine that drives them.
//!
//! - [`metric`]: Hamming and Levenshtein similarities normalized to `[0, 1]`
//! - [`word`]: token-by-token walk with prefix commit
//! - [`chars`]: hill climb over flattened character windows
//! - [`parallel`]: fork-join dispatch of a scan over worker threads
//! - [`engine`]: [`AlignmentEngine`], which runs the word matcher and falls
//!   back to the char matcher when the word result is not near-exact
//!
//! ## Example
//!
//! ```rust,no_run
//! use phrase_aligner::{AlignerConfig, AlignmentEngine};
//!
//! let engine = AlignmentEngine::new(AlignerConfig::default()).unwrap();
//! let book = engine.prepare_reference("Olá, mundo! Como vai?");
//! let result = engine.align_text("ola mundo", &book, 0);
//!
//! assert_eq!(result.matched_text.as_deref(), Some("Olá, mundo!"));
//! ```

pub mod chars;
pub mod context;
pub mod engine;
pub mod metric;
pub mod parallel;
pub mod word;

pub use engine::{AlignerConfig, AlignmentEngine, MatchResult};
