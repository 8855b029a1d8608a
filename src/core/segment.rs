use serde::{Deserialize, Serialize};

/// A time range of a source recording, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment identifier (`speaker_book_segment`)
    pub id: String,
    /// Source recording the segment is cut from
    pub source: String,
    pub begin: f64,
    pub end: f64,
}

impl Segment {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }
}

/// Segments in insertion order; adjacency is by index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Silence between segment `i` and the one after it.
    ///
    /// `None` for the last segment or an out-of-range index.
    #[must_use]
    pub fn gap(&self, i: usize) -> Option<f64> {
        let current = self.segments.get(i)?;
        let next = self.segments.get(i + 1)?;
        Some(next.begin - current.end)
    }

    /// Total duration of all segments
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// Absorb segment `i + 1` into segment `i`.
    ///
    /// Returns false when there is no segment after `i`.
    pub fn merge_next(&mut self, i: usize) -> bool {
        if i + 1 >= self.segments.len() {
            return false;
        }
        let next = self.segments.remove(i + 1);
        self.segments[i].end = next.end;
        true
    }

    /// Merge neighbours from the same source whose gap is below `max_gap`.
    ///
    /// Returns the number of merges performed.
    pub fn merge_gaps_below(&mut self, max_gap: f64) -> usize {
        let mut merges = 0;
        let mut i = 0;
        while i + 1 < self.segments.len() {
            let same_source = self.segments[i].source == self.segments[i + 1].source;
            let close = self.gap(i).is_some_and(|gap| gap < max_gap);
            if same_source && close {
                self.merge_next(i);
                merges += 1;
            } else {
                i += 1;
            }
        }
        merges
    }
}
