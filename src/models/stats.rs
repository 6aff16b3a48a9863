//! Derived statistics models.

use serde::{Deserialize, Serialize};

use super::{CharacterId, Rank};

/// Skill tier derived from dan rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
    Master,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Beginner,
        Tier::Intermediate,
        Tier::Advanced,
        Tier::Master,
    ];

    /// Classify a rank against the given thresholds.
    pub fn from_rank(rank: Rank, thresholds: &TierThresholds) -> Self {
        if rank <= thresholds.beginner_max {
            Tier::Beginner
        } else if rank <= thresholds.intermediate_max {
            Tier::Intermediate
        } else if rank <= thresholds.advanced_max {
            Tier::Advanced
        } else {
            Tier::Master
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Beginner => write!(f, "beginner"),
            Tier::Intermediate => write!(f, "intermediate"),
            Tier::Advanced => write!(f, "advanced"),
            Tier::Master => write!(f, "master"),
        }
    }
}

/// Inclusive upper rank bound of each tier below Master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_beginner_max")]
    pub beginner_max: Rank,

    #[serde(default = "default_intermediate_max")]
    pub intermediate_max: Rank,

    #[serde(default = "default_advanced_max")]
    pub advanced_max: Rank,
}

fn default_beginner_max() -> Rank {
    12
}

fn default_intermediate_max() -> Rank {
    21
}

fn default_advanced_max() -> Rank {
    26
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            beginner_max: default_beginner_max(),
            intermediate_max: default_intermediate_max(),
            advanced_max: default_advanced_max(),
        }
    }
}

impl TierThresholds {
    /// Bounds must be strictly increasing for every tier to be reachable.
    pub fn is_ordered(&self) -> bool {
        self.beginner_max < self.intermediate_max && self.intermediate_max < self.advanced_max
    }
}

/// Two-sided confidence interval on a win rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Win rate of one character across non-mirror matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateEntry {
    pub character_id: CharacterId,

    /// Display name
    pub name: String,

    pub wins: usize,

    /// Matches the character appeared in
    pub appearances: usize,

    /// Win rate (0.0 to 1.0)
    pub win_rate: f64,

    pub confidence_interval: ConfidenceInterval,
}

/// Character win rates for a set of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateReport {
    pub confidence_level: f64,

    /// All matches considered, mirrors included
    pub total_matches: usize,

    /// Matches excluded because both players picked the same character
    pub mirror_matches: usize,

    /// Sorted by win rate (descending)
    pub entries: Vec<WinRateEntry>,
}

impl WinRateReport {
    /// Get a character's entry by display name.
    pub fn get(&self, name: &str) -> Option<&WinRateEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }
}

/// Share of the population strictly below a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankPercentile {
    pub rank: Rank,

    /// Dan name
    pub label: String,

    pub players: usize,

    /// Percentage (0.0 to 100.0) of players with a lower rank
    pub percentile: f64,
}

/// Number of players currently maining a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCount {
    pub character_id: CharacterId,
    pub name: String,
    pub players: usize,
}
