use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::cache::BookCache;
use crate::catalog::store::{BookStore, CatalogError};
use crate::core::text::{clean_reference, CleaningOptions, Normalizer};
use crate::core::token::{TokenSpan, TokenizedText};
use crate::core::types::{MetricKind, SearchType, Strategy};
use crate::matching::context::{ScanOutcome, SearchContext};
use crate::matching::parallel::{DispatchError, ParallelSearch};
use crate::utils::validation::{
    check_positive_unit, check_thread_count, check_unit_interval, check_window_padding,
    ConfigError,
};

/// Default similarity above which a search stops scanning
pub const DEFAULT_EARLY_EXIT: f64 = 0.99;

/// Default number of search workers
pub const DEFAULT_THREADS: usize = 4;

/// Configuration for the alignment engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignerConfig {
    /// Metric used to compare tokens during the word walk
    pub metric: MetricKind,
    /// Authoritative matcher
    pub search_type: SearchType,
    /// Carry the search cursor forward between fragments of one book
    pub sequenced: bool,
    /// Number of search workers
    pub threads: usize,
    /// Similarity at which a scan accepts its best span and stops
    pub early_exit_threshold: f64,
    /// Extra reference tokens added to each char window
    pub char_window_padding: usize,
    /// Fraction of the fragment length skipped before the char climb starts
    pub char_start_ratio: f64,
    /// Similarity under which a char climb is abandoned
    pub char_min_similarity: f64,
    /// Best results at or below this similarity are reported as not found
    pub min_similarity: f64,
    /// Re-score mode keeps previous results above this similarity
    pub rescore_threshold: f64,
    /// Compare letters without their accents
    pub fold_diacritics: bool,
    /// Substitutions applied to reference books
    pub cleaning: CleaningOptions,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::default(),
            search_type: SearchType::default(),
            sequenced: false,
            threads: DEFAULT_THREADS,
            early_exit_threshold: DEFAULT_EARLY_EXIT,
            char_window_padding: 10,
            char_start_ratio: 0.9,
            char_min_similarity: 0.5,
            min_similarity: 0.0,
            rescore_threshold: 0.9,
            fold_diacritics: true,
            cleaning: CleaningOptions::default(),
        }
    }
}

impl AlignerConfig {
    /// Check every numeric setting against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_thread_count(self.threads)?;
        check_positive_unit("early_exit_threshold", self.early_exit_threshold)?;
        check_window_padding(self.char_window_padding)?;
        check_unit_interval("char_start_ratio", self.char_start_ratio)?;
        check_unit_interval("char_min_similarity", self.char_min_similarity)?;
        check_unit_interval("min_similarity", self.min_similarity)?;
        check_unit_interval("rescore_threshold", self.rescore_threshold)?;
        Ok(())
    }

    /// Load and validate a JSON configuration file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, names an
    /// unsupported metric, or holds out-of-range values.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Outcome of aligning one fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Reference text of the winning span, `None` when nothing matched
    pub matched_text: Option<String>,
    pub similarity: f64,
    /// Reference token index where the next sequenced search starts
    pub cursor_after: usize,
    pub span: Option<TokenSpan>,
    pub strategy: Option<Strategy>,
}

impl MatchResult {
    #[must_use]
    pub fn not_found(cursor: usize) -> Self {
        Self {
            matched_text: None,
            similarity: 0.0,
            cursor_after: cursor,
            span: None,
            strategy: None,
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched_text.is_some()
    }
}

/// Aligns fragments against reference books
#[derive(Debug)]
pub struct AlignmentEngine {
    config: AlignerConfig,
    normalizer: Normalizer,
    search: ParallelSearch,
    cache: BookCache,
}

impl AlignmentEngine {
    /// Create an engine, validating `config` and starting its workers.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` for invalid settings or
    /// `EngineError::Dispatch` if the worker pool cannot be built.
    pub fn new(config: AlignerConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let search = ParallelSearch::new(config.threads)?;
        Ok(Self {
            normalizer: Normalizer::new(config.fold_diacritics),
            config,
            search,
            cache: BookCache::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn tokenize(&self, text: &str) -> TokenizedText {
        TokenizedText::new(text, &self.normalizer)
    }

    /// Clean and tokenize a raw reference book.
    #[must_use]
    pub fn prepare_reference(&self, raw: &str) -> TokenizedText {
        self.tokenize(&clean_reference(raw, &self.config.cleaning))
    }

    /// Tokenized reference for `book_id`, loaded from `store` on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the book cannot be found or read.
    pub fn reference_for(
        &mut self,
        store: &BookStore,
        book_id: &str,
    ) -> Result<Arc<TokenizedText>, CatalogError> {
        let normalizer = &self.normalizer;
        let cleaning = &self.config.cleaning;
        self.cache.get_or_load(book_id, || {
            let raw = store.load_text(book_id)?;
            Ok(TokenizedText::new(clean_reference(&raw, cleaning), normalizer))
        })
    }

    /// Number of reference books loaded so far
    #[must_use]
    pub fn books_loaded(&self) -> usize {
        self.cache.loads()
    }

    /// Align a raw fragment string.
    #[must_use]
    pub fn align_text(
        &self,
        fragment: &str,
        reference: &TokenizedText,
        start: usize,
    ) -> MatchResult {
        self.align(&self.tokenize(fragment), reference, start)
    }

    /// Find the span of `reference` that best matches `fragment`.
    ///
    /// With the word search type the word matcher runs from `start`; unless
    /// it reaches the early-exit threshold, the char matcher also runs from
    /// the beginning of the reference and the better of the two wins, ties
    /// going to the char result. `cursor_after` never moves before `start`.
    #[must_use]
    pub fn align(
        &self,
        fragment: &TokenizedText,
        reference: &TokenizedText,
        start: usize,
    ) -> MatchResult {
        if fragment.word_count() == 0 {
            return MatchResult::not_found(start);
        }

        let ctx = SearchContext::new(fragment, reference, &self.normalizer, &self.config);

        let (outcome, strategy) = match self.config.search_type {
            SearchType::Char => (
                self.search.search(&ctx, Strategy::Char, ctx.anchors_from(start)),
                Strategy::Char,
            ),
            SearchType::Word => {
                let word = self.search.search(&ctx, Strategy::Word, ctx.anchors_from(start));
                if self.needs_char_fallback(word.similarity()) {
                    debug!(
                        similarity = word.similarity(),
                        "Word match not exact, trying char matcher"
                    );
                    let chars = self.search.search(&ctx, Strategy::Char, ctx.anchors_from(0));
                    prefer(word, chars)
                } else {
                    (word, Strategy::Word)
                }
            }
        };

        self.finish(reference, outcome, strategy, start)
    }

    /// Whether a word score is too low to skip the char matcher
    fn needs_char_fallback(&self, word_similarity: f64) -> bool {
        word_similarity < self.config.early_exit_threshold
    }

    fn finish(
        &self,
        reference: &TokenizedText,
        outcome: ScanOutcome,
        strategy: Strategy,
        start: usize,
    ) -> MatchResult {
        match outcome.best {
            Some(best) if best.similarity > self.config.min_similarity => MatchResult {
                matched_text: Some(reference.span_text(best.span).to_string()),
                similarity: best.similarity,
                cursor_after: start.max(best.span.end),
                span: Some(best.span),
                strategy: Some(strategy),
            },
            _ => MatchResult::not_found(start),
        }
    }
}

/// Pick the better of the word and char outcomes; char wins ties.
fn prefer(word: ScanOutcome, chars: ScanOutcome) -> (ScanOutcome, Strategy) {
    if word.similarity() > chars.similarity() {
        (word, Strategy::Word)
    } else {
        (chars, Strategy::Char)
    }
}
