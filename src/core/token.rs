use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::core::text::Normalizer;

/// A single token of a tokenized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text exactly as it appears in the source
    pub text: String,

    /// Comparison key (lower-cased, optionally diacritic-folded)
    pub key: String,

    /// Index of this token within its owning sequence
    pub position: usize,

    /// Byte offset of the token in the source text
    pub offset: usize,

    /// Whether the token consists only of punctuation
    pub is_punctuation: bool,
}

impl Token {
    /// Byte offset just past the end of the token
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// A contiguous run of tokens `[start, end)` in a token sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Shift a span relative to a window into the window's parent sequence.
    #[must_use]
    pub fn offset_by(self, base: usize) -> Self {
        Self::new(self.start + base, self.end + base)
    }
}

/// Source text together with its tokens.
///
/// Whitespace is never a token; punctuation marks always are their own
/// tokens. Span text is sliced from the source, so spacing, case and
/// punctuation come back exactly as written.
#[derive(Debug, Clone)]
pub struct TokenizedText {
    source: String,
    tokens: Vec<Token>,
}

impl TokenizedText {
    #[must_use]
    pub fn new(source: impl Into<String>, normalizer: &Normalizer) -> Self {
        let source = source.into();
        let tokens = source
            .split_word_bound_indices()
            .filter(|(_, segment)| !segment.trim().is_empty())
            .enumerate()
            .map(|(position, (offset, segment))| Token {
                text: segment.to_string(),
                key: normalizer.key(segment),
                position,
                offset,
                is_punctuation: normalizer.punctuation.is_punctuation(segment),
            })
            .collect();

        Self { source, tokens }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens that are not punctuation
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_punctuation).count()
    }

    /// Source text covered by `span`; empty for an empty span.
    #[must_use]
    pub fn span_text(&self, span: TokenSpan) -> &str {
        let end = span.end.min(self.tokens.len());
        if span.start >= end {
            return "";
        }
        let from = self.tokens[span.start].offset;
        let to = self.tokens[end - 1].end_offset();
        &self.source[from..to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> TokenizedText {
        TokenizedText::new(text, &Normalizer::new(false))
    }

    #[test]
    fn test_punctuation_is_separate_token() {
        let tokens = tokenize("Olá, mundo! como vai?");
        let texts: Vec<&str> = tokens.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Olá", ",", "mundo", "!", "como", "vai", "?"]);
        assert!(tokens.tokens()[1].is_punctuation);
        assert!(!tokens.tokens()[2].is_punctuation);
        assert_eq!(tokens.word_count(), 4);
    }

    #[test]
    fn test_positions_are_sequential() {
        let tokens = tokenize("  um   dois\ntrês ");
        for (i, token) in tokens.tokens().iter().enumerate() {
            assert_eq!(token.position, i);
        }
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens.tokens()[2].key, "três");
    }

    #[test]
    fn test_span_text_preserves_source() {
        let tokens = tokenize("Olá, mundo! como vai?");
        assert_eq!(tokens.span_text(TokenSpan::new(0, 4)), "Olá, mundo!");
        assert_eq!(tokens.span_text(TokenSpan::new(4, 7)), "como vai?");
        assert_eq!(tokens.span_text(TokenSpan::new(3, 3)), "");
        // Out-of-range end is clamped
        assert_eq!(tokens.span_text(TokenSpan::new(5, 40)), "vai?");
    }

    #[test]
    fn test_span_offset() {
        let span = TokenSpan::new(1, 3).offset_by(10);
        assert_eq!(span, TokenSpan::new(11, 13));
        assert_eq!(span.len(), 2);
        assert!(!span.is_empty());
        assert!(TokenSpan::new(4, 4).is_empty());
    }
}
