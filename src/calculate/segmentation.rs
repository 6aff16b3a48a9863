//! Skill-tier segmentation of players and matches.

use crate::models::{MatchRecord, ProfileMap, Tier, TierThresholds};

/// Profiles split by tier of their current rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments {
    pub beginner: ProfileMap,
    pub intermediate: ProfileMap,
    pub advanced: ProfileMap,
    pub master: ProfileMap,
}

impl Segments {
    pub fn get(&self, tier: Tier) -> &ProfileMap {
        match tier {
            Tier::Beginner => &self.beginner,
            Tier::Intermediate => &self.intermediate,
            Tier::Advanced => &self.advanced,
            Tier::Master => &self.master,
        }
    }

    fn get_mut(&mut self, tier: Tier) -> &mut ProfileMap {
        match tier {
            Tier::Beginner => &mut self.beginner,
            Tier::Intermediate => &mut self.intermediate,
            Tier::Advanced => &mut self.advanced,
            Tier::Master => &mut self.master,
        }
    }

    /// Iterate tiers from Beginner to Master.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &ProfileMap)> {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }

    /// Total number of players across all tiers.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, profiles)| profiles.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split profiles into tiers by their current rank.
pub fn segment(profiles: &ProfileMap, thresholds: &TierThresholds) -> Segments {
    let mut segments = Segments::default();
    for (id, profile) in profiles {
        segments
            .get_mut(Tier::from_rank(profile.rank, thresholds))
            .insert(id.clone(), profile.clone());
    }
    segments
}

/// Matches grouped by the tier both players belong to.
#[derive(Debug, Clone, Default)]
pub struct MatchTiers<'a> {
    pub beginner: Vec<&'a MatchRecord>,
    pub intermediate: Vec<&'a MatchRecord>,
    pub advanced: Vec<&'a MatchRecord>,
    pub master: Vec<&'a MatchRecord>,

    /// Matches whose players sit in different tiers
    pub mixed: usize,
}

impl<'a> MatchTiers<'a> {
    pub fn get(&self, tier: Tier) -> &[&'a MatchRecord] {
        match tier {
            Tier::Beginner => &self.beginner,
            Tier::Intermediate => &self.intermediate,
            Tier::Advanced => &self.advanced,
            Tier::Master => &self.master,
        }
    }
}

/// Group matches where both players share a tier.
pub fn split_matches_by_tier<'a, I>(matches: I, thresholds: &TierThresholds) -> MatchTiers<'a>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut tiers = MatchTiers::default();
    for record in matches {
        let t1 = Tier::from_rank(record.p1.rank, thresholds);
        let t2 = Tier::from_rank(record.p2.rank, thresholds);
        if t1 != t2 {
            tiers.mixed += 1;
            continue;
        }
        match t1 {
            Tier::Beginner => tiers.beginner.push(record),
            Tier::Intermediate => tiers.intermediate.push(record),
            Tier::Advanced => tiers.advanced.push(record),
            Tier::Master => tiers.master.push(record),
        }
    }
    tiers
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::aggregate::build_profiles;
    use crate::models::match_record::fixtures::{record, slot};

    fn profiles() -> ProfileMap {
        let rows = vec![
            record(1, slot("a", 0, 1), slot("b", 12, 2), 1),
            record(2, slot("c", 13, 1), slot("d", 21, 2), 2),
            record(3, slot("e", 22, 1), slot("f", 26, 2), 1),
            record(4, slot("g", 27, 1), slot("h", 29, 2), 2),
        ];
        build_profiles(&rows)
    }

    #[test]
    fn test_segment_boundaries() {
        let segments = segment(&profiles(), &TierThresholds::default());

        let ids = |m: &ProfileMap| m.keys().map(|k| k.as_str().to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&segments.beginner), vec!["a", "b"]);
        assert_eq!(ids(&segments.intermediate), vec!["c", "d"]);
        assert_eq!(ids(&segments.advanced), vec!["e", "f"]);
        assert_eq!(ids(&segments.master), vec!["g", "h"]);
    }

    #[test]
    fn test_segment_is_partition() {
        let input = profiles();
        let segments = segment(&input, &TierThresholds::default());

        let mut seen = BTreeSet::new();
        for (_, bucket) in segments.iter() {
            for id in bucket.keys() {
                assert!(seen.insert(id.clone()), "{} in two tiers", id);
            }
        }
        assert_eq!(seen, input.keys().cloned().collect::<BTreeSet<_>>());
        assert_eq!(segments.len(), input.len());
    }

    #[test]
    fn test_segment_idempotent() {
        let input = profiles();
        let thresholds = TierThresholds::default();
        assert_eq!(segment(&input, &thresholds), segment(&input, &thresholds));
    }

    #[test]
    fn test_segment_custom_thresholds() {
        let thresholds = TierThresholds {
            beginner_max: 0,
            intermediate_max: 1,
            advanced_max: 2,
        };
        let segments = segment(&profiles(), &thresholds);

        assert_eq!(segments.beginner.len(), 1);
        assert_eq!(segments.intermediate.len(), 0);
        assert_eq!(segments.master.len(), 7);
    }

    #[test]
    fn test_segment_empty() {
        let segments = segment(&ProfileMap::new(), &TierThresholds::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn test_split_matches_by_tier() {
        let rows = vec![
            record(1, slot("a", 3, 1), slot("b", 5, 2), 1),
            record(2, slot("c", 15, 1), slot("d", 18, 2), 2),
            record(3, slot("e", 28, 1), slot("f", 29, 2), 1),
            record(4, slot("g", 10, 1), slot("h", 25, 2), 2),
        ];

        let tiers = split_matches_by_tier(&rows, &TierThresholds::default());

        assert_eq!(tiers.get(Tier::Beginner).len(), 1);
        assert_eq!(tiers.get(Tier::Intermediate).len(), 1);
        assert_eq!(tiers.get(Tier::Advanced).len(), 0);
        assert_eq!(tiers.get(Tier::Master).len(), 1);
        assert_eq!(tiers.mixed, 1);
    }
}
