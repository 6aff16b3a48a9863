//! Player-aggregation engine.
//!
//! Turns an ordered sequence of match records into one profile per player,
//! either with a single sequential fold or by folding contiguous chunks on a
//! worker pool and merging the partial results. Both paths apply the same
//! recency rule, so they produce identical profiles for the same input.

mod builder;
mod merge;
mod partition;

pub use builder::*;
pub use merge::*;
pub use partition::*;

use thiserror::Error;

use crate::models::{MatchRecord, ProfileMap};

/// Errors from parallel aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Profile worker panicked: {0}")]
    WorkerPanicked(String),
}

/// How profiles are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    Sequential,
    Parallel { workers: usize },
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationMode::Sequential => write!(f, "sequential"),
            AggregationMode::Parallel { workers } => write!(f, "parallel ({} workers)", workers),
        }
    }
}

/// Build profiles with the given mode.
pub fn aggregate_profiles(
    rows: &[MatchRecord],
    mode: AggregationMode,
) -> Result<ProfileMap, AggregateError> {
    match mode {
        AggregationMode::Sequential => Ok(build_profiles(rows)),
        AggregationMode::Parallel { workers } => ParallelAggregator::new(workers).aggregate(rows),
    }
}
