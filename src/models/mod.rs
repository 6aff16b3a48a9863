//! Core data models for match statistics.

mod ids;
pub(crate) mod match_record;
mod profile;
mod stats;

pub use ids::*;
pub use match_record::*;
pub use profile::*;
pub use stats::*;
