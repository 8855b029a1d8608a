use crate::core::types::MetricKind;

/// Safely convert usize to f64 for similarity ratios
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

impl MetricKind {
    /// Similarity of `a` and `b` in `[0.0, 1.0]` under this metric
    #[must_use]
    pub fn similarity(self, a: &str, b: &str) -> f64 {
        match self {
            Self::Hamming => hamming_similarity(a, b),
            Self::Levenshtein => levenshtein_similarity(a, b),
        }
    }
}

/// Fraction of positions holding equal chars.
///
/// Chars past the end of the shorter string count as mismatches, so the
/// result is normalized by the longer length. Two empty strings are identical.
#[must_use]
pub fn hamming_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 1.0;
    }

    let equal = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    count_to_f64(equal) / count_to_f64(longest)
}

/// Unit-cost edit distance between two strings, counted in chars
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row DP over the shorter string
    let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        current[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let substitution = previous[j] + usize::from(lc != sc);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[short.len()]
}

/// `1 - distance / max(len(a), len(b))`; two empty strings are identical.
#[must_use]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - count_to_f64(levenshtein_distance(a, b)) / count_to_f64(longest)
}
