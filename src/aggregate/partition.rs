//! Partitioned aggregation on a worker pool.
//!
//! Rows are split into contiguous chunks, each chunk is folded on its own
//! worker, and the partial maps are merged on the calling thread once every
//! worker has finished. Workers only read their own sub-slice.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, info};

use super::{build_profiles, merge_all, AggregateError};
use crate::models::{MatchRecord, ProfileMap};

/// Split `len` rows into at most `parts` contiguous ranges.
///
/// Every range but the last holds `len / parts` rows; the last one absorbs
/// the remainder. Fewer ranges are produced when there are fewer rows than
/// parts, and an empty input yields a single empty range.
pub fn partition_bounds(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, len.max(1));
    let chunk = len / parts;

    (0..parts)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == parts { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// Host parallelism, falling back to one worker.
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builds profiles over a fixed-size worker pool.
#[derive(Debug, Clone, Copy)]
pub struct ParallelAggregator {
    workers: usize,
}

impl Default for ParallelAggregator {
    fn default() -> Self {
        Self::new(host_parallelism())
    }
}

impl ParallelAggregator {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fold `rows` chunk-wise in parallel and merge the partial maps.
    ///
    /// A panicking worker aborts the whole run; no partial result is
    /// returned.
    pub fn aggregate(&self, rows: &[MatchRecord]) -> Result<ProfileMap, AggregateError> {
        let bounds = partition_bounds(rows.len(), self.workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(bounds.len())
            .thread_name(|i| format!("profile-worker-{}", i))
            .build()?;

        info!(
            "Aggregating {} matches across {} chunks",
            rows.len(),
            bounds.len()
        );

        let partials: Vec<ProfileMap> = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                bounds
                    .par_iter()
                    .map(|range| build_profiles(&rows[range.clone()]))
                    .collect()
            })
        }))
        .map_err(|payload| AggregateError::WorkerPanicked(panic_message(payload.as_ref())))?;

        debug!(
            "Merging {} partial maps ({} entries)",
            partials.len(),
            partials.iter().map(|p| p.len()).sum::<usize>()
        );

        Ok(merge_all(partials))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::match_record::fixtures::{record, slot};

    fn rows(n: i64) -> Vec<MatchRecord> {
        (0..n)
            .map(|i| {
                let a = format!("p{}", i % 7);
                let b = format!("p{}", (i * 3 + 1) % 11 + 7);
                let mut p1 = slot(&a, (i % 29) as u32, (i % 5) as u32);
                let p2 = slot(&b, ((i * 7) % 29) as u32, (i % 4) as u32 + 1);
                p1.power = i * 3;
                record(1_000 + (i % 13) * 5, p1, p2, i % 3)
            })
            .collect()
    }

    #[test]
    fn test_partition_bounds_even() {
        assert_eq!(partition_bounds(10, 2), vec![0..5, 5..10]);
    }

    #[test]
    fn test_partition_bounds_remainder_in_last() {
        assert_eq!(partition_bounds(10, 3), vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_partition_bounds_more_parts_than_rows() {
        assert_eq!(partition_bounds(2, 8), vec![0..1, 1..2]);
    }

    #[test]
    fn test_partition_bounds_empty() {
        assert_eq!(partition_bounds(0, 4), vec![0..0]);
    }

    #[test]
    fn test_partition_bounds_zero_parts() {
        assert_eq!(partition_bounds(5, 0), vec![0..5]);
    }

    #[test]
    fn test_partition_bounds_cover_input() {
        for len in 0..40 {
            for parts in 1..9 {
                let bounds = partition_bounds(len, parts);
                assert_eq!(bounds.first().map(|r| r.start), Some(0));
                assert_eq!(bounds.last().map(|r| r.end), Some(len));
                for pair in bounds.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows = rows(250);
        let sequential = build_profiles(&rows);

        for workers in [1, 2, 5] {
            let parallel = ParallelAggregator::new(workers).aggregate(&rows).unwrap();
            assert_eq!(parallel, sequential, "workers = {}", workers);
        }
    }

    #[test]
    fn test_partition_counts_agree() {
        let rows = rows(97);
        let one = ParallelAggregator::new(1).aggregate(&rows).unwrap();
        let three = ParallelAggregator::new(3).aggregate(&rows).unwrap();
        let many = ParallelAggregator::new(64).aggregate(&rows).unwrap();

        assert_eq!(one, three);
        assert_eq!(one, many);
    }

    #[test]
    fn test_parallel_empty_input() {
        let profiles = ParallelAggregator::new(4).aggregate(&[]).unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_workers_clamped() {
        assert_eq!(ParallelAggregator::new(0).workers(), 1);
        assert!(ParallelAggregator::default().workers() >= 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
