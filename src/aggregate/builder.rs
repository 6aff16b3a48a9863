//! Sequential profile fold.

use tracing::debug;

use crate::models::{MatchRecord, PlayerProfile, PlayerSlot, ProfileMap, Timestamp};

/// Folds match records into player profiles.
///
/// Both slots of a record are applied before the result is counted, so a
/// player seen for the first time already has a bucket for the character
/// they won or lost with.
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    profiles: ProfileMap,
    matches: usize,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single match.
    pub fn push(&mut self, record: &MatchRecord) {
        self.observe(&record.p1, record.battle_at);
        self.observe(&record.p2, record.battle_at);

        if let Some(winner) = record.winning_slot() {
            self.credit(record.slot(winner), true);
            self.credit(record.slot(winner.opponent()), false);
        }

        self.matches += 1;
    }

    fn observe(&mut self, slot: &PlayerSlot, battle_at: Timestamp) {
        match self.profiles.get_mut(&slot.polaris_id) {
            Some(profile) => profile.observe(slot, battle_at),
            None => {
                self.profiles.insert(
                    slot.polaris_id.clone(),
                    PlayerProfile::from_observation(slot, battle_at),
                );
            }
        }
    }

    fn credit(&mut self, slot: &PlayerSlot, won: bool) {
        if let Some(profile) = self.profiles.get_mut(&slot.polaris_id) {
            profile.record_result(slot.character_id, won);
        }
    }

    pub fn finish(self) -> ProfileMap {
        debug!(
            "Built {} profiles from {} matches",
            self.profiles.len(),
            self.matches
        );
        self.profiles
    }
}

impl<'a> Extend<&'a MatchRecord> for ProfileBuilder {
    fn extend<I: IntoIterator<Item = &'a MatchRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Build profiles from an ordered sequence of matches.
pub fn build_profiles<'a, I>(records: I) -> ProfileMap
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut builder = ProfileBuilder::new();
    builder.extend(records);
    builder.finish()
}
