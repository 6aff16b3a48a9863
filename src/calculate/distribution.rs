//! Rank distributions and character popularity.

use std::collections::BTreeMap;

use crate::lookup::{LookupError, LookupTables};
use crate::models::{CharacterCount, CharacterId, PlayerProfile, Rank, RankPercentile};

/// Count players per current rank.
pub fn rank_histogram<'a, I>(profiles: I) -> BTreeMap<Rank, usize>
where
    I: IntoIterator<Item = &'a PlayerProfile>,
{
    let mut histogram = BTreeMap::new();
    for profile in profiles {
        *histogram.entry(profile.rank).or_insert(0) += 1;
    }
    histogram
}

/// Lower-tail percentile of each rank, in ascending rank order.
///
/// A rank's percentile is the share of players with a strictly lower rank,
/// so the lowest rank present is always at 0%.
pub fn rank_percentiles(
    histogram: &BTreeMap<Rank, usize>,
    tables: &LookupTables,
) -> Result<Vec<RankPercentile>, LookupError> {
    let total: usize = histogram.values().sum();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut cumulative = 0usize;
    let mut percentiles = Vec::with_capacity(histogram.len());

    for (&rank, &players) in histogram {
        percentiles.push(RankPercentile {
            rank,
            label: tables.rank_name(rank)?.to_string(),
            players,
            percentile: cumulative as f64 / total as f64 * 100.0,
        });
        cumulative += players;
    }

    Ok(percentiles)
}

/// Players per current character, most played first.
pub fn character_popularity<'a, I>(
    profiles: I,
    tables: &LookupTables,
) -> Result<Vec<CharacterCount>, LookupError>
where
    I: IntoIterator<Item = &'a PlayerProfile>,
{
    let mut counts: BTreeMap<CharacterId, usize> = BTreeMap::new();
    for profile in profiles {
        *counts.entry(profile.character_id).or_insert(0) += 1;
    }

    let mut popularity = counts
        .into_iter()
        .map(|(character_id, players)| {
            Ok(CharacterCount {
                character_id,
                name: tables.character_name(character_id)?.to_string(),
                players,
            })
        })
        .collect::<Result<Vec<_>, LookupError>>()?;

    popularity.sort_by(|a, b| b.players.cmp(&a.players));
    Ok(popularity)
}
