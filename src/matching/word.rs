//! Word-granularity matching.
//!
//! A walk anchored at a reference position compares fragment and reference
//! tokens pairwise and stops at the first pair below the metric's word
//! threshold. Everything matched before that pair is kept (prefix commit),
//! together with any closing punctuation that directly follows it.
//! The scan tries every anchor in a range and re-scores each walked span
//! with Levenshtein similarity on the `clean` forms.

use std::ops::Range;

use crate::core::token::TokenSpan;
use crate::matching::context::{Candidate, ScanOutcome, SearchContext};
use crate::matching::metric::levenshtein_similarity;

/// Walk fragment and reference tokens from `anchor` and return the aligned span.
#[must_use]
pub fn walk(ctx: &SearchContext<'_>, anchor: usize) -> TokenSpan {
    let fragment = ctx.fragment.tokens();
    let reference = ctx.reference.tokens();
    let metric = ctx.config.metric;
    let threshold = metric.word_threshold();

    let mut i = 0;
    let mut j = anchor;
    let mut start = anchor;

    while i < fragment.len() && j < reference.len() {
        // Leading punctuation never belongs to the span
        if i == 0 && reference[j].is_punctuation {
            j += 1;
            start += 1;
            continue;
        }
        if fragment[i].is_punctuation {
            i += 1;
            continue;
        }
        if reference[j].is_punctuation {
            j += 1;
            continue;
        }

        if metric.similarity(&fragment[i].key, &reference[j].key) < threshold {
            break;
        }

        i += 1;
        j += 1;
    }

    // Closing marks right after the last word belong to the phrase
    let punctuation = ctx.normalizer.punctuation;
    if start < j {
        while j < reference.len() && punctuation.is_closing(&reference[j].text) {
            j += 1;
        }
    }

    TokenSpan::new(start.min(j), j)
}

/// Score every anchor in `anchors` and keep the best span.
///
/// Stops at the first anchor whose span beats the early-exit threshold.
#[must_use]
pub fn scan(ctx: &SearchContext<'_>, anchors: Range<usize>) -> ScanOutcome {
    let early_exit = ctx.config.early_exit_threshold;
    let mut outcome = ScanOutcome::default();

    for anchor in anchors {
        let span = walk(ctx, anchor);
        let similarity = levenshtein_similarity(ctx.fragment_clean(), &ctx.clean_span(span));
        outcome.offer(Candidate {
            span,
            similarity,
            anchor,
        });

        if outcome.similarity() > early_exit {
            outcome.early_exit = true;
            break;
        }
    }

    outcome
}
