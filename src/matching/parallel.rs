//! Fork-join search over partitions of the anchor range.
//!
//! The anchor range is cut into one contiguous partition per worker. Every
//! worker scans its partition with the same per-anchor loop the sequential
//! search uses, including the early exit, and the partial results are
//! reduced after all workers have joined. A worker that panics contributes
//! nothing; its siblings are unaffected.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::core::types::Strategy;
use crate::matching::context::{Candidate, ScanOutcome, SearchContext};
use crate::matching::{chars, word};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to start search workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Run one matcher over `anchors` on the current thread.
#[must_use]
pub fn scan(ctx: &SearchContext<'_>, strategy: Strategy, anchors: Range<usize>) -> ScanOutcome {
    match strategy {
        Strategy::Word => word::scan(ctx, anchors),
        Strategy::Char => chars::scan(ctx, anchors),
    }
}

/// Split `range` into exactly `parts` contiguous sub-ranges.
///
/// Sizes differ by at most one; trailing partitions are empty when the range
/// is shorter than `parts`.
#[must_use]
pub fn partition(range: Range<usize>, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let len = range.end.saturating_sub(range.start);
    let bound = |i: usize| range.start + i * len / parts;
    (0..parts).map(|i| bound(i)..bound(i + 1)).collect()
}

/// Reduce per-worker outcomes to the globally best one.
///
/// Highest similarity wins; ties go to the span starting earliest in the
/// reference. Failed workers (`None`) are ignored.
#[must_use]
pub fn merge(outcomes: &[Option<ScanOutcome>]) -> ScanOutcome {
    let best = outcomes
        .iter()
        .flatten()
        .filter_map(|outcome| outcome.best)
        .fold(None, |best: Option<Candidate>, candidate| match best {
            Some(current)
                if current.similarity > candidate.similarity
                    || (current.similarity == candidate.similarity
                        && current.span.start <= candidate.span.start) =>
            {
                Some(current)
            }
            _ => Some(candidate),
        });

    ScanOutcome {
        best,
        early_exit: outcomes.iter().flatten().any(|outcome| outcome.early_exit),
    }
}

/// Dispatches searches over a fixed set of worker threads
#[derive(Debug)]
pub struct ParallelSearch {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl ParallelSearch {
    /// Create a dispatcher with `workers` threads.
    ///
    /// A single worker runs on the calling thread without a pool.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::ThreadPool` if the worker threads cannot be spawned.
    pub fn new(workers: usize) -> Result<Self, DispatchError> {
        let workers = workers.max(1);
        let pool = if workers == 1 {
            None
        } else {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("search-worker-{i}"))
                    .build()?,
            )
        };
        Ok(Self { workers, pool })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Search `anchors` with `strategy`, split across all workers.
    #[must_use]
    pub fn search(
        &self,
        ctx: &SearchContext<'_>,
        strategy: Strategy,
        anchors: Range<usize>,
    ) -> ScanOutcome {
        self.search_with(anchors, |range| scan(ctx, strategy, range))
    }

    /// Run `scan_partition` over every partition of `anchors` and merge.
    fn search_with<F>(&self, anchors: Range<usize>, scan_partition: F) -> ScanOutcome
    where
        F: Fn(Range<usize>) -> ScanOutcome + Sync,
    {
        let outcomes: Vec<Option<ScanOutcome>> = match &self.pool {
            None => vec![run_worker(0, anchors, &scan_partition)],
            Some(pool) => {
                let partitions = partition(anchors, self.workers);
                pool.install(|| {
                    partitions
                        .into_par_iter()
                        .enumerate()
                        .map(|(id, range)| run_worker(id, range, &scan_partition))
                        .collect()
                })
            }
        };

        merge(&outcomes)
    }
}

/// Scan one partition, containing any panic to this worker.
fn run_worker<F>(worker: usize, anchors: Range<usize>, scan_partition: &F) -> Option<ScanOutcome>
where
    F: Fn(Range<usize>) -> ScanOutcome,
{
    if anchors.is_empty() {
        return Some(ScanOutcome::default());
    }

    let (start, end) = (anchors.start, anchors.end);
    match panic::catch_unwind(AssertUnwindSafe(|| scan_partition(anchors))) {
        Ok(outcome) => Some(outcome),
        Err(_) => {
            warn!(
                worker,
                start, end, "Search worker failed, treating its partition as no match"
            );
            None
        }
    }
}
