//! Core data types for transcript alignment.
//!
//! - [`token::TokenizedText`]: a source text with its tokens; punctuation marks are tokens of their own
//! - [`token::TokenSpan`]: a candidate match, `[start, end)` over a token sequence
//! - [`text::Normalizer`] and [`text::PunctuationSet`]: the comparison forms of text
//! - [`types::MetricKind`], [`types::SearchType`], [`types::FragmentId`]: configuration and record metadata
//! - [`segment::SegmentList`]: time-ordered audio segments with index-based adjacency
//!
//! ## Comparison forms
//!
//! | Form      | Example input   | Result       |
//! |-----------|-----------------|--------------|
//! | `key`     | `Olá,`          | `olá,`       |
//! | `clean`   | `Olá, mundo!`   | `olá mundo`  |
//! | `flatten` | `Olá, mundo!`   | `olámundo`   |
//!
//! With diacritic folding enabled `key` also maps `olá` to `ola`.

pub mod segment;
pub mod text;
pub mod token;
pub mod types;
