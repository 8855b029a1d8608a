//! Character-granularity matching.
//!
//! Used when word matching is not near-exact, typically because the ASR
//! split or merged words differently from the book. Each anchor gets a
//! window of `len(fragment) + padding` reference tokens; a hill climb grows
//! a prefix of that window while the Hamming similarity of the flattened
//! strings keeps improving.

use std::ops::Range;

use crate::core::token::TokenSpan;
use crate::matching::context::{Candidate, ScanOutcome, SearchContext};
use crate::matching::metric::{hamming_similarity, levenshtein_similarity};

/// Window of reference tokens examined for `anchor`
#[must_use]
pub fn window_at(ctx: &SearchContext<'_>, anchor: usize) -> TokenSpan {
    let len = ctx.reference.len();
    let start = anchor.min(len);
    let end = start
        .saturating_add(ctx.fragment.len())
        .saturating_add(ctx.config.char_window_padding)
        .min(len);
    TokenSpan::new(start, end)
}

/// First prefix length tried by the climb.
///
/// Never zero: an empty prefix cannot resemble a non-empty fragment.
fn initial_prefix(ctx: &SearchContext<'_>) -> usize {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let skip = (ctx.config.char_start_ratio * ctx.fragment.len() as f64).floor() as usize;
    skip.max(1)
}

/// Hill-climb the prefix of `window` that best matches the fragment.
///
/// Returns `None` when similarity falls under the floor or nothing but
/// punctuation remains. The returned span never starts with punctuation.
#[must_use]
pub fn climb(ctx: &SearchContext<'_>, window: TokenSpan) -> Option<TokenSpan> {
    let tokens = &ctx.reference.tokens()[window.start..window.end];
    let floor = ctx.config.char_min_similarity;

    let mut j = initial_prefix(ctx).min(tokens.len());
    let mut best = 0.0;

    while j < tokens.len() {
        if tokens[j].is_punctuation {
            j += 1;
            continue;
        }

        let prefix = ctx.flat_span(TokenSpan::new(window.start, window.start + j));
        let similarity = hamming_similarity(ctx.fragment_flat(), &prefix);

        if similarity < floor {
            return None;
        }
        if similarity > best {
            best = similarity;
            j += 1;
        } else {
            j -= 1;
            break;
        }
    }

    let mut i = 0;
    while i < j && tokens[i].is_punctuation {
        i += 1;
    }

    if i < j {
        Some(TokenSpan::new(i, j).offset_by(window.start))
    } else {
        None
    }
}

/// Climb at every anchor in `anchors` and keep the best Levenshtein-scored span.
///
/// Stops once the best similarity reaches the early-exit threshold.
#[must_use]
pub fn scan(ctx: &SearchContext<'_>, anchors: Range<usize>) -> ScanOutcome {
    let early_exit = ctx.config.early_exit_threshold;
    let mut outcome = ScanOutcome::default();

    for anchor in anchors {
        let Some(span) = climb(ctx, window_at(ctx, anchor)) else {
            continue;
        };

        let similarity = levenshtein_similarity(ctx.fragment_flat(), &ctx.flat_span(span));
        outcome.offer(Candidate {
            span,
            similarity,
            anchor,
        });

        if outcome.similarity() >= early_exit {
            outcome.early_exit = true;
            break;
        }
    }

    outcome
}
