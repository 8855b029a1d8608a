use std::ops::Range;

use crate::core::text::Normalizer;
use crate::core::token::{TokenSpan, TokenizedText};
use crate::matching::engine::AlignerConfig;

/// Read-only state shared by every worker of one fragment search
#[derive(Debug)]
pub struct SearchContext<'a> {
    pub fragment: &'a TokenizedText,
    pub reference: &'a TokenizedText,
    pub normalizer: &'a Normalizer,
    pub config: &'a AlignerConfig,

    /// Fragment text in `clean` form, scored against word spans
    fragment_clean: String,

    /// Fragment text in `flatten` form, scored against char spans
    fragment_flat: String,
}

impl<'a> SearchContext<'a> {
    #[must_use]
    pub fn new(
        fragment: &'a TokenizedText,
        reference: &'a TokenizedText,
        normalizer: &'a Normalizer,
        config: &'a AlignerConfig,
    ) -> Self {
        Self {
            fragment,
            reference,
            normalizer,
            config,
            fragment_clean: normalizer.clean(fragment.source()),
            fragment_flat: normalizer.flatten(fragment.source()),
        }
    }

    #[must_use]
    pub fn fragment_clean(&self) -> &str {
        &self.fragment_clean
    }

    #[must_use]
    pub fn fragment_flat(&self) -> &str {
        &self.fragment_flat
    }

    /// Candidate anchors `[from, len(reference) - len(fragment))`.
    ///
    /// Empty when the reference is not longer than the fragment or `from`
    /// is already past the last anchor.
    #[must_use]
    pub fn anchors_from(&self, from: usize) -> Range<usize> {
        let end = self.reference.len().saturating_sub(self.fragment.len());
        from.min(end)..end
    }

    /// Reference text of `span` in `clean` form
    #[must_use]
    pub fn clean_span(&self, span: TokenSpan) -> String {
        self.normalizer.clean(self.reference.span_text(span))
    }

    /// Reference text of `span` in `flatten` form
    #[must_use]
    pub fn flat_span(&self, span: TokenSpan) -> String {
        self.normalizer.flatten(self.reference.span_text(span))
    }
}

/// Best span found by one scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub span: TokenSpan,
    pub similarity: f64,
    /// Reference position the scan was anchored at when it produced `span`
    pub anchor: usize,
}

/// Result of scanning a range of anchors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanOutcome {
    pub best: Option<Candidate>,
    /// True when the scan stopped at the early-exit threshold
    pub early_exit: bool,
}

impl ScanOutcome {
    #[must_use]
    pub fn similarity(&self) -> f64 {
        self.best.map_or(0.0, |c| c.similarity)
    }

    /// Keep `candidate` if it strictly beats the current best.
    pub fn offer(&mut self, candidate: Candidate) {
        if candidate.similarity > self.similarity() {
            self.best = Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_range() {
        let normalizer = Normalizer::new(true);
        let config = AlignerConfig::default();
        let fragment = TokenizedText::new("um dois", &normalizer);
        let reference = TokenizedText::new("zero um dois três quatro", &normalizer);
        let ctx = SearchContext::new(&fragment, &reference, &normalizer, &config);

        assert_eq!(ctx.anchors_from(0), 0..3);
        assert_eq!(ctx.anchors_from(2), 2..3);
        assert!(ctx.anchors_from(7).is_empty());

        let long = TokenizedText::new("a b c d e f g h", &normalizer);
        let ctx = SearchContext::new(&long, &reference, &normalizer, &config);
        assert!(ctx.anchors_from(0).is_empty());
    }

    #[test]
    fn test_offer_keeps_strictly_better() {
        let mut outcome = ScanOutcome::default();
        assert!(outcome.similarity().abs() < f64::EPSILON);

        let first = Candidate {
            span: TokenSpan::new(0, 2),
            similarity: 0.5,
            anchor: 0,
        };
        outcome.offer(first);
        outcome.offer(Candidate {
            anchor: 4,
            span: TokenSpan::new(4, 6),
            ..first
        });
        assert_eq!(outcome.best.unwrap().anchor, 0);

        outcome.offer(Candidate {
            span: TokenSpan::new(5, 7),
            similarity: 0.0,
            anchor: 5,
        });
        assert_eq!(outcome.best.unwrap().anchor, 0);
    }

    #[test]
    fn test_zero_similarity_is_never_kept() {
        let mut outcome = ScanOutcome::default();
        outcome.offer(Candidate {
            span: TokenSpan::new(0, 0),
            similarity: 0.0,
            anchor: 0,
        });
        assert!(outcome.best.is_none());
    }
}
