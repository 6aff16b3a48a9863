//! Per-player profiles derived from match history.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{CharacterId, PlayerSlot, PolarisId, Rank, Timestamp};

/// Win/loss tally for one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

impl WinLoss {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Add another tally into this one.
    pub fn absorb(&mut self, other: WinLoss) {
        self.wins += other.wins;
        self.losses += other.losses;
    }
}

/// Aggregated view of a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub polaris_id: PolarisId,

    /// Display name at the snapshot observation
    pub name: String,

    /// Dan rank at the snapshot observation
    pub rank: Rank,

    /// Character played at the snapshot observation
    pub character_id: CharacterId,

    /// Rating after the snapshot match
    pub rating: i64,

    /// Tekken power at the snapshot observation
    pub tekken_power: i64,

    /// Highest tekken power ever observed
    pub peak_power: i64,

    /// Region, area and language from the first observation
    pub region_id: Option<i64>,
    pub area_id: Option<i64>,
    pub lang: Option<String>,

    /// Every character this player has been seen with
    pub characters: BTreeSet<CharacterId>,

    /// Timestamp of the snapshot observation
    pub last_seen: Timestamp,

    /// Per-character results
    pub win_loss: BTreeMap<CharacterId, WinLoss>,
}

impl PlayerProfile {
    /// Create a profile from a player's first observation.
    pub fn from_observation(slot: &PlayerSlot, battle_at: Timestamp) -> Self {
        Self {
            polaris_id: slot.polaris_id.clone(),
            name: slot.name.clone(),
            rank: slot.rank,
            character_id: slot.character_id,
            rating: slot.rating_after(),
            tekken_power: slot.power,
            peak_power: slot.power,
            region_id: slot.region_id,
            area_id: slot.area_id,
            lang: slot.lang.clone(),
            characters: BTreeSet::from([slot.character_id]),
            last_seen: battle_at,
            win_loss: BTreeMap::from([(slot.character_id, WinLoss::default())]),
        }
    }

    /// Fold a later observation of the same player into the profile.
    ///
    /// The snapshot only moves forward when `battle_at` is strictly newer,
    /// so among equal timestamps the first observation sticks.
    pub fn observe(&mut self, slot: &PlayerSlot, battle_at: Timestamp) {
        self.characters.insert(slot.character_id);
        self.win_loss.entry(slot.character_id).or_default();
        self.peak_power = self.peak_power.max(slot.power);

        if battle_at > self.last_seen {
            self.name = slot.name.clone();
            self.rank = slot.rank;
            self.character_id = slot.character_id;
            self.rating = slot.rating_after();
            self.tekken_power = slot.power;
            self.last_seen = battle_at;
        }
    }

    /// Record a decisive result for one of this player's characters.
    pub fn record_result(&mut self, character_id: CharacterId, won: bool) {
        let tally = self.win_loss.entry(character_id).or_default();
        if won {
            tally.wins += 1;
        } else {
            tally.losses += 1;
        }
    }

    /// Results summed over every character.
    pub fn overall(&self) -> WinLoss {
        self.win_loss
            .values()
            .fold(WinLoss::default(), |mut acc, wl| {
                acc.absorb(*wl);
                acc
            })
    }
}

/// Player profiles keyed by Polaris ID.
pub type ProfileMap = BTreeMap<PolarisId, PlayerProfile>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::match_record::fixtures::slot;

    #[test]
    fn test_win_loss_games() {
        let mut wl = WinLoss { wins: 3, losses: 1 };
        assert_eq!(wl.games(), 4);
        wl.absorb(WinLoss { wins: 1, losses: 2 });
        assert_eq!(wl, WinLoss { wins: 4, losses: 3 });
    }

    #[test]
    fn test_from_observation_seeds_empty_bucket() {
        let mut p = slot("u1", 5, 1);
        p.rating_before = 1000;
        p.rating_change = 25;
        let profile = PlayerProfile::from_observation(&p, 10);

        assert_eq!(profile.rank, 5);
        assert_eq!(profile.rating, 1025);
        assert_eq!(profile.characters, BTreeSet::from([1]));
        assert_eq!(profile.win_loss.get(&1), Some(&WinLoss::default()));
        assert_eq!(profile.last_seen, 10);
    }

    #[test]
    fn test_observe_newer_moves_snapshot() {
        let mut profile = PlayerProfile::from_observation(&slot("u1", 5, 1), 10);

        let mut later = slot("u1", 4, 2);
        later.power = 50;
        profile.observe(&later, 20);

        assert_eq!(profile.rank, 4);
        assert_eq!(profile.character_id, 2);
        assert_eq!(profile.tekken_power, 50);
        assert_eq!(profile.peak_power, 100_000);
        assert_eq!(profile.last_seen, 20);
        assert_eq!(profile.characters, BTreeSet::from([1, 2]));
        assert!(profile.win_loss.contains_key(&2));
    }

    #[test]
    fn test_observe_older_keeps_snapshot() {
        let mut profile = PlayerProfile::from_observation(&slot("u1", 5, 1), 10);

        let mut earlier = slot("u1", 9, 3);
        earlier.power = 200_000;
        profile.observe(&earlier, 5);

        assert_eq!(profile.rank, 5);
        assert_eq!(profile.character_id, 1);
        assert_eq!(profile.last_seen, 10);
        assert_eq!(profile.peak_power, 200_000);
        assert!(profile.characters.contains(&3));
    }

    #[test]
    fn test_observe_equal_timestamp_keeps_first() {
        let mut profile = PlayerProfile::from_observation(&slot("u1", 5, 1), 10);
        profile.observe(&slot("u1", 8, 2), 10);

        assert_eq!(profile.rank, 5);
        assert_eq!(profile.character_id, 1);
    }

    #[test]
    fn test_record_result_and_overall() {
        let mut profile = PlayerProfile::from_observation(&slot("u1", 5, 1), 10);
        profile.record_result(1, true);
        profile.record_result(1, false);
        profile.record_result(2, true);

        assert_eq!(profile.win_loss[&1], WinLoss { wins: 1, losses: 1 });
        assert_eq!(profile.win_loss[&2], WinLoss { wins: 1, losses: 0 });
        assert_eq!(profile.overall(), WinLoss { wins: 2, losses: 1 });
    }
}
