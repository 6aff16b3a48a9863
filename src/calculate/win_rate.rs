//! Character win rates with binomial confidence intervals.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use super::{binomial_interval, calculate_win_rate};
use crate::lookup::{LookupError, LookupTables};
use crate::models::{
    CharacterId, ConfidenceInterval, MatchRecord, Slot, WinRateEntry, WinRateReport,
};

/// Default confidence level for intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Win-rate calculation errors.
#[derive(Debug, Error)]
pub enum WinRateError {
    #[error("Confidence level must be in (0, 1), got {0}")]
    InvalidConfidence(f64),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    appearances: usize,
    wins: usize,
}

/// Per-character win rates over non-mirror matches.
///
/// Void matches still count as appearances. Entries are sorted by win rate,
/// highest first; equal rates keep ascending character id order.
pub fn calculate_win_rates<'a, I>(
    matches: I,
    confidence_level: f64,
    tables: &LookupTables,
) -> Result<WinRateReport, WinRateError>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(WinRateError::InvalidConfidence(confidence_level));
    }

    let mut tallies: BTreeMap<CharacterId, Tally> = BTreeMap::new();
    let mut total_matches = 0usize;
    let mut mirror_matches = 0usize;

    for record in matches {
        total_matches += 1;
        if record.is_mirror() {
            mirror_matches += 1;
            continue;
        }

        let winner = record.winning_slot();
        for slot in [Slot::One, Slot::Two] {
            let tally = tallies.entry(record.slot(slot).character_id).or_default();
            tally.appearances += 1;
            if winner == Some(slot) {
                tally.wins += 1;
            }
        }
    }

    debug!(
        "Counted {} characters over {} matches ({} mirrors excluded)",
        tallies.len(),
        total_matches,
        mirror_matches
    );

    let mut entries = tallies
        .into_iter()
        .map(|(character_id, tally)| {
            let win_rate = calculate_win_rate(tally.wins, tally.appearances);
            Ok(WinRateEntry {
                character_id,
                name: tables.character_name(character_id)?.to_string(),
                wins: tally.wins,
                appearances: tally.appearances,
                win_rate,
                confidence_interval: rate_interval(confidence_level, tally.appearances, win_rate),
            })
        })
        .collect::<Result<Vec<_>, LookupError>>()?;

    entries.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

    Ok(WinRateReport {
        confidence_level,
        total_matches,
        mirror_matches,
        entries,
    })
}

fn rate_interval(confidence_level: f64, appearances: usize, win_rate: f64) -> ConfidenceInterval {
    if appearances == 0 {
        return ConfidenceInterval::default();
    }
    let (lower, upper) = binomial_interval(confidence_level, appearances, win_rate);
    ConfidenceInterval {
        lower: lower as f64 / appearances as f64,
        upper: upper as f64 / appearances as f64,
    }
}
