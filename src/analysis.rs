//! End-to-end analysis over a set of matches.
//!
//! Builds profiles, segments them by tier and collects every derived
//! statistic into a single serializable report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::{aggregate_profiles, host_parallelism, AggregateError, AggregationMode};
use crate::calculate::{
    calculate_win_rates, character_popularity, rank_histogram, rank_percentiles, segment,
    split_matches_by_tier, WinRateError,
};
use crate::config::AnalysisConfig;
use crate::lookup::{LookupError, LookupTables};
use crate::models::{
    CharacterCount, MatchRecord, ProfileMap, RankPercentile, Tier, TierThresholds, WinRateReport,
};

/// Analysis errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Win-rate calculation failed: {0}")]
    WinRate(#[from] WinRateError),
}

/// Statistics for one skill tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: Tier,

    /// Players whose current rank falls in the tier
    pub players: usize,

    /// Matches where both players are in the tier
    pub matches: usize,

    pub rank_percentiles: Vec<RankPercentile>,
    pub character_popularity: Vec<CharacterCount>,

    /// Win rates over same-tier matches
    pub win_rates: WinRateReport,
}

/// Full analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// When the report was computed
    pub computed_at: DateTime<Utc>,

    /// How profiles were built
    pub aggregation: String,

    pub total_matches: usize,
    pub total_players: usize,

    /// Matches whose players sit in different tiers
    pub cross_tier_matches: usize,

    pub tier_thresholds: TierThresholds,

    pub rank_percentiles: Vec<RankPercentile>,
    pub character_popularity: Vec<CharacterCount>,
    pub win_rates: WinRateReport,
    pub tiers: Vec<TierSummary>,
}

/// Resolve the aggregation mode from settings.
pub fn aggregation_mode(settings: &AnalysisConfig) -> AggregationMode {
    if settings.sequential {
        AggregationMode::Sequential
    } else {
        AggregationMode::Parallel {
            workers: settings.workers.unwrap_or_else(host_parallelism),
        }
    }
}

/// Run the full analysis, returning the profiles alongside the report.
pub fn analyze(
    matches: &[MatchRecord],
    tables: &LookupTables,
    settings: &AnalysisConfig,
    thresholds: &TierThresholds,
) -> Result<(ProfileMap, AnalysisReport), AnalysisError> {
    let mode = aggregation_mode(settings);
    info!("Building profiles from {} matches ({})", matches.len(), mode);

    let times = matches.iter().filter_map(MatchRecord::battle_time);
    if let (Some(first), Some(last)) = (times.clone().min(), times.max()) {
        info!("Matches span {} to {}", first, last);
    }

    let profiles = aggregate_profiles(matches, mode)?;
    // every decisive match credits one game to each of its two players
    let credited: u64 = profiles.values().map(|p| u64::from(p.overall().games())).sum();
    debug!("{} decisive matches credited", credited / 2);

    let segments = segment(&profiles, thresholds);
    let match_tiers = split_matches_by_tier(matches, thresholds);

    let mut tiers = Vec::with_capacity(Tier::ALL.len());
    for (tier, members) in segments.iter() {
        let tier_matches = match_tiers.get(tier);
        tiers.push(TierSummary {
            tier,
            players: members.len(),
            matches: tier_matches.len(),
            rank_percentiles: rank_percentiles(&rank_histogram(members.values()), tables)?,
            character_popularity: character_popularity(members.values(), tables)?,
            win_rates: calculate_win_rates(
                tier_matches.iter().copied(),
                settings.confidence_level,
                tables,
            )?,
        });
    }

    let report = AnalysisReport {
        computed_at: Utc::now(),
        aggregation: mode.to_string(),
        total_matches: matches.len(),
        total_players: profiles.len(),
        cross_tier_matches: match_tiers.mixed,
        tier_thresholds: *thresholds,
        rank_percentiles: rank_percentiles(&rank_histogram(profiles.values()), tables)?,
        character_popularity: character_popularity(profiles.values(), tables)?,
        win_rates: calculate_win_rates(matches, settings.confidence_level, tables)?,
        tiers,
    };

    info!(
        "Analyzed {} players ({} mirror matches excluded from win rates)",
        report.total_players, report.win_rates.mirror_matches
    );

    Ok((profiles, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::NameTable;
    use crate::models::match_record::fixtures::{record, slot};

    fn tables() -> LookupTables {
        LookupTables::new(
            (0..10).map(|c| (c, format!("Character {}", c))).collect(),
            (0..30).map(|r| (r, format!("Rank {}", r))).collect(),
        )
    }

    fn tier(report: &AnalysisReport, tier: Tier) -> &TierSummary {
        report.tiers.iter().find(|t| t.tier == tier).unwrap()
    }

    fn matches() -> Vec<MatchRecord> {
        vec![
            record(1, slot("a", 3, 1), slot("b", 5, 2), 1),
            record(2, slot("c", 15, 3), slot("d", 18, 4), 2),
            record(3, slot("a", 4, 1), slot("c", 16, 3), 1),
            record(4, slot("e", 28, 5), slot("f", 29, 5), 1),
            record(5, slot("g", 23, 6), slot("h", 24, 7), 2),
        ]
    }

    #[test]
    fn test_analyze_report_totals() {
        let settings = AnalysisConfig::default();
        let (profiles, report) =
            analyze(&matches(), &tables(), &settings, &TierThresholds::default()).unwrap();

        assert_eq!(profiles.len(), 8);
        assert_eq!(report.total_players, 8);
        assert_eq!(report.total_matches, 5);
        assert_eq!(report.cross_tier_matches, 1);
        assert_eq!(report.win_rates.mirror_matches, 1);
        assert_eq!(report.tiers.len(), 4);
    }

    #[test]
    fn test_analyze_tier_breakdown() {
        let settings = AnalysisConfig::default();
        let (_, report) =
            analyze(&matches(), &tables(), &settings, &TierThresholds::default()).unwrap();

        let beginner = tier(&report, Tier::Beginner);
        assert_eq!(beginner.players, 2);
        assert_eq!(beginner.matches, 1);
        assert_eq!(beginner.win_rates.entries[0].name, "Character 1");

        let master = tier(&report, Tier::Master);
        assert_eq!(master.players, 2);
        assert_eq!(master.win_rates.mirror_matches, 1);
        assert!(master.win_rates.entries.is_empty());
    }

    #[test]
    fn test_sequential_and_parallel_reports_agree() {
        let sequential = AnalysisConfig {
            sequential: true,
            ..AnalysisConfig::default()
        };
        let parallel = AnalysisConfig {
            workers: Some(3),
            ..AnalysisConfig::default()
        };

        let rows = matches();
        let (p1, r1) = analyze(&rows, &tables(), &sequential, &TierThresholds::default()).unwrap();
        let (p2, r2) = analyze(&rows, &tables(), &parallel, &TierThresholds::default()).unwrap();

        assert_eq!(p1, p2);
        assert_eq!(r1.rank_percentiles, r2.rank_percentiles);
        assert_eq!(r1.aggregation, "sequential");
        assert_eq!(r2.aggregation, "parallel (3 workers)");
    }

    #[test]
    fn test_analyze_missing_rank_name() {
        let tables = LookupTables::new(
            (0..10).map(|c| (c, format!("Character {}", c))).collect(),
            NameTable::new(),
        );
        let result = analyze(
            &matches(),
            &tables,
            &AnalysisConfig::default(),
            &TierThresholds::default(),
        );
        assert!(matches!(
            result,
            Err(AnalysisError::Lookup(LookupError::UnknownRank(_)))
        ));
    }

    #[test]
    fn test_aggregation_mode() {
        let settings = AnalysisConfig {
            workers: Some(6),
            ..AnalysisConfig::default()
        };
        assert_eq!(
            aggregation_mode(&settings),
            AggregationMode::Parallel { workers: 6 }
        );

        let settings = AnalysisConfig {
            sequential: true,
            ..AnalysisConfig::default()
        };
        assert_eq!(aggregation_mode(&settings), AggregationMode::Sequential);
    }

    #[test]
    fn test_report_serializes() {
        let (_, report) = analyze(
            &matches(),
            &tables(),
            &AnalysisConfig::default(),
            &TierThresholds::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_players"], 8);
        assert_eq!(json["tiers"][0]["tier"], "beginner");
    }
}
