//! Merging partial profile maps.

use crate::models::{PlayerProfile, ProfileMap};

/// Fold `incoming` into `acc` for the same player.
///
/// Characters, win/loss buckets and peak power combine regardless of order.
/// The snapshot is replaced only by a strictly newer `last_seen`, so with
/// equal timestamps the profile merged first wins.
pub fn merge_profile(acc: &mut PlayerProfile, incoming: PlayerProfile) {
    acc.characters.extend(incoming.characters);
    acc.peak_power = acc.peak_power.max(incoming.peak_power);

    for (character_id, tally) in incoming.win_loss {
        acc.win_loss.entry(character_id).or_default().absorb(tally);
    }

    if incoming.last_seen > acc.last_seen {
        acc.name = incoming.name;
        acc.rank = incoming.rank;
        acc.character_id = incoming.character_id;
        acc.rating = incoming.rating;
        acc.tekken_power = incoming.tekken_power;
        acc.last_seen = incoming.last_seen;
    }
}

/// Merge a partial map into the accumulator.
pub fn merge_into(acc: &mut ProfileMap, partial: ProfileMap) {
    for (id, profile) in partial {
        match acc.get_mut(&id) {
            Some(existing) => merge_profile(existing, profile),
            None => {
                acc.insert(id, profile);
            }
        }
    }
}

/// Merge partial maps in iteration order.
pub fn merge_all<I>(partials: I) -> ProfileMap
where
    I: IntoIterator<Item = ProfileMap>,
{
    partials.into_iter().fold(ProfileMap::new(), |mut acc, partial| {
        merge_into(&mut acc, partial);
        acc
    })
}
