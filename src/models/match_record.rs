//! Match records: one ranked battle between two players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{CharacterId, PolarisId, Rank, Timestamp};

/// One side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Map the raw `winner` column to a slot.
    ///
    /// Anything other than 1 or 2 is a non-decisive match.
    pub fn from_winner(winner: i64) -> Option<Self> {
        match winner {
            1 => Some(Slot::One),
            2 => Some(Slot::Two),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// A player's state as observed in a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSlot {
    /// Stable player identifier
    pub polaris_id: PolarisId,

    /// Display name at the time of the match
    pub name: String,

    /// Session user id
    pub user_id: i64,

    /// Dan rank
    pub rank: Rank,

    /// Character played
    pub character_id: CharacterId,

    /// Tekken power
    pub power: i64,

    /// Rating before the match
    pub rating_before: i64,

    /// Rating delta applied by the match
    pub rating_change: i64,

    /// Rounds won
    pub rounds: u32,

    pub region_id: Option<i64>,
    pub area_id: Option<i64>,
    pub lang: Option<String>,
}

impl PlayerSlot {
    /// Rating after the match was applied.
    pub fn rating_after(&self) -> i64 {
        self.rating_before + self.rating_change
    }
}

/// A single ranked match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// When the battle took place (unix seconds)
    pub battle_at: Timestamp,

    pub battle_id: String,
    pub battle_type: i64,
    pub game_version: i64,
    pub stage_id: i64,

    /// Raw winner indicator: 1 or 2, anything else is void
    pub winner: i64,

    pub p1: PlayerSlot,
    pub p2: PlayerSlot,
}

impl MatchRecord {
    pub fn slot(&self, slot: Slot) -> &PlayerSlot {
        match slot {
            Slot::One => &self.p1,
            Slot::Two => &self.p2,
        }
    }

    /// The winning side, if the match was decisive.
    pub fn winning_slot(&self) -> Option<Slot> {
        Slot::from_winner(self.winner)
    }

    /// Both players picked the same character.
    pub fn is_mirror(&self) -> bool {
        self.p1.character_id == self.p2.character_id
    }

    pub fn battle_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.battle_at, 0)
    }
}

/// Flat, fixed-schema form of a match as stored in the source table.
///
/// Column names follow the replay export (`p1_*` / `p2_*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub battle_at: i64,
    pub battle_id: String,
    #[serde(default)]
    pub battle_type: i64,
    #[serde(default)]
    pub game_version: i64,

    pub p1_chara_id: u32,
    #[serde(default)]
    pub p1_name: String,
    pub p1_polaris_id: String,
    #[serde(default)]
    pub p1_power: i64,
    pub p1_rank: u32,
    #[serde(default)]
    pub p1_rating_before: i64,
    #[serde(default)]
    pub p1_rating_change: i64,
    #[serde(default)]
    pub p1_rounds: u32,
    #[serde(default)]
    pub p1_user_id: i64,
    #[serde(default)]
    pub p1_region_id: Option<i64>,
    #[serde(default)]
    pub p1_area_id: Option<i64>,
    #[serde(default)]
    pub p1_lang: Option<String>,

    pub p2_chara_id: u32,
    #[serde(default)]
    pub p2_name: String,
    pub p2_polaris_id: String,
    #[serde(default)]
    pub p2_power: i64,
    pub p2_rank: u32,
    #[serde(default)]
    pub p2_rating_before: i64,
    #[serde(default)]
    pub p2_rating_change: i64,
    #[serde(default)]
    pub p2_rounds: u32,
    #[serde(default)]
    pub p2_user_id: i64,
    #[serde(default)]
    pub p2_region_id: Option<i64>,
    #[serde(default)]
    pub p2_area_id: Option<i64>,
    #[serde(default)]
    pub p2_lang: Option<String>,

    #[serde(default)]
    pub stage_id: i64,

    /// Missing or null means a non-decisive match
    #[serde(default, deserialize_with = "null_as_void")]
    pub winner: i64,
}

fn null_as_void<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        Self {
            battle_at: row.battle_at,
            battle_id: row.battle_id,
            battle_type: row.battle_type,
            game_version: row.game_version,
            stage_id: row.stage_id,
            winner: row.winner,
            p1: PlayerSlot {
                polaris_id: PolarisId::from(row.p1_polaris_id),
                name: row.p1_name,
                user_id: row.p1_user_id,
                rank: row.p1_rank,
                character_id: row.p1_chara_id,
                power: row.p1_power,
                rating_before: row.p1_rating_before,
                rating_change: row.p1_rating_change,
                rounds: row.p1_rounds,
                region_id: row.p1_region_id,
                area_id: row.p1_area_id,
                lang: row.p1_lang,
            },
            p2: PlayerSlot {
                polaris_id: PolarisId::from(row.p2_polaris_id),
                name: row.p2_name,
                user_id: row.p2_user_id,
                rank: row.p2_rank,
                character_id: row.p2_chara_id,
                power: row.p2_power,
                rating_before: row.p2_rating_before,
                rating_change: row.p2_rating_change,
                rounds: row.p2_rounds,
                region_id: row.p2_region_id,
                area_id: row.p2_area_id,
                lang: row.p2_lang,
            },
        }
    }
}

impl From<&MatchRecord> for MatchRow {
    fn from(record: &MatchRecord) -> Self {
        let (p1, p2) = (&record.p1, &record.p2);
        Self {
            battle_at: record.battle_at,
            battle_id: record.battle_id.clone(),
            battle_type: record.battle_type,
            game_version: record.game_version,
            p1_chara_id: p1.character_id,
            p1_name: p1.name.clone(),
            p1_polaris_id: p1.polaris_id.as_str().to_string(),
            p1_power: p1.power,
            p1_rank: p1.rank,
            p1_rating_before: p1.rating_before,
            p1_rating_change: p1.rating_change,
            p1_rounds: p1.rounds,
            p1_user_id: p1.user_id,
            p1_region_id: p1.region_id,
            p1_area_id: p1.area_id,
            p1_lang: p1.lang.clone(),
            p2_chara_id: p2.character_id,
            p2_name: p2.name.clone(),
            p2_polaris_id: p2.polaris_id.as_str().to_string(),
            p2_power: p2.power,
            p2_rank: p2.rank,
            p2_rating_before: p2.rating_before,
            p2_rating_change: p2.rating_change,
            p2_rounds: p2.rounds,
            p2_user_id: p2.user_id,
            p2_region_id: p2.region_id,
            p2_area_id: p2.area_id,
            p2_lang: p2.lang.clone(),
            stage_id: record.stage_id,
            winner: record.winner,
        }
    }
}
