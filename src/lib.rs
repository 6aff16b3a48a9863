//! # Match Stats
//!
//! Player profiles and character statistics from ranked match records.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (match records, profiles, statistics)
//! - **storage**: Match-row sources (JSONL, Parquet)
//! - **aggregate**: Sequential and partitioned profile building
//! - **calculate**: Segmentation, rank distributions and win rates
//! - **lookup**: Character and rank display names
//! - **analysis**: End-to-end report assembly
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod analysis;
pub mod calculate;
pub mod config;
pub mod lookup;
pub mod models;
pub mod storage;

pub use models::*;
