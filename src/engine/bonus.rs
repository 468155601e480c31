//! Bonus point allocation from per-fixture BPS.

use crate::domain::{FixtureId, FixtureStatus, PlayerId, RoundData};
use std::collections::BTreeMap;
use tracing::debug;

/// Bonus awarded to the top three ranks.
const BONUS_BY_RANK: [u8; 3] = [3, 2, 1];

/// Which unconfirmed fixtures receive provisional bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BonusPolicy {
    /// Every started fixture whose bonus is not yet confirmed.
    #[default]
    Live,
    /// Only fixtures whose final whistle has gone.
    FinishedOnly,
}

impl BonusPolicy {
    fn applies_to(&self, fixture: &FixtureStatus) -> bool {
        if fixture.finished {
            return false;
        }
        match self {
            BonusPolicy::Live => fixture.started,
            BonusPolicy::FinishedOnly => fixture.finished_provisional,
        }
    }
}

/// One player's standing in a fixture's BPS table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpsEntry {
    pub player: PlayerId,
    pub bps: i32,
    pub minutes: u16,
}

pub struct BonusEngine;

impl BonusEngine {
    /// Award bonus for one fixture.
    ///
    /// A player's rank is one more than the number of players with a strictly
    /// higher BPS, so tied players share a tier and use up the tiers below
    /// them. Players without minutes are not ranked. Every ranked player is
    /// present in the output, most with zero.
    pub fn award(entries: &[BpsEntry]) -> BTreeMap<PlayerId, u8> {
        let mut ranked: Vec<&BpsEntry> = entries.iter().filter(|e| e.minutes > 0).collect();
        ranked.sort_by(|a, b| b.bps.cmp(&a.bps).then(a.player.cmp(&b.player)));

        let mut awards = BTreeMap::new();
        for entry in &ranked {
            let higher = ranked.iter().filter(|other| other.bps > entry.bps).count();
            let bonus = BONUS_BY_RANK.get(higher).copied().unwrap_or(0);
            awards.insert(entry.player, bonus);
        }
        awards
    }

    /// Fill in provisional bonus for every qualifying fixture of the round.
    ///
    /// Records that already carry confirmed bonus are left untouched. Returns
    /// the number of fixtures processed.
    pub fn apply_provisional(data: &mut RoundData, policy: BonusPolicy) -> usize {
        let mut awards: BTreeMap<(FixtureId, PlayerId), u8> = BTreeMap::new();
        let mut processed = 0;

        for fixture in data.fixtures() {
            if !policy.applies_to(fixture) {
                continue;
            }
            let entries: Vec<BpsEntry> = data
                .fixture_records(fixture.id)
                .into_iter()
                .map(|r| BpsEntry {
                    player: r.player,
                    bps: fixture.bps.get(&r.player).copied().unwrap_or(r.bps),
                    minutes: r.minutes,
                })
                .collect();

            for (player, bonus) in Self::award(&entries) {
                awards.insert((fixture.id, player), bonus);
            }
            processed += 1;
        }

        for record in data.records_mut() {
            if !record.provisional {
                continue;
            }
            if let Some(bonus) = awards.get(&(record.fixture, record.player)) {
                record.bonus = *bonus;
            }
        }

        debug!(
            round = %data.round,
            fixtures = processed,
            "applied provisional bonus"
        );
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FixtureId, PerformanceRecord, RoundId, TeamId};

    fn entry(player: u32, bps: i32) -> BpsEntry {
        BpsEntry {
            player: PlayerId::new(player),
            bps,
            minutes: 90,
        }
    }

    fn bonus_of(awards: &BTreeMap<PlayerId, u8>, player: u32) -> u8 {
        awards.get(&PlayerId::new(player)).copied().unwrap_or(0)
    }

    #[test]
    fn test_distinct_top_three() {
        let awards = BonusEngine::award(&[entry(1, 40), entry(2, 35), entry(3, 30), entry(4, 20)]);
        assert_eq!(bonus_of(&awards, 1), 3);
        assert_eq!(bonus_of(&awards, 2), 2);
        assert_eq!(bonus_of(&awards, 3), 1);
        assert_eq!(bonus_of(&awards, 4), 0);
    }

    #[test]
    fn test_three_way_tie_for_first_consumes_all_tiers() {
        let awards = BonusEngine::award(&[
            entry(1, 40),
            entry(2, 40),
            entry(3, 40),
            entry(4, 35),
            entry(5, 30),
        ]);
        assert_eq!(bonus_of(&awards, 1), 3);
        assert_eq!(bonus_of(&awards, 2), 3);
        assert_eq!(bonus_of(&awards, 3), 3);
        assert_eq!(bonus_of(&awards, 4), 0);
        assert_eq!(bonus_of(&awards, 5), 0);
    }

    #[test]
    fn test_two_way_tie_for_first_skips_second() {
        let awards = BonusEngine::award(&[entry(1, 40), entry(2, 40), entry(3, 35), entry(4, 30)]);
        assert_eq!(bonus_of(&awards, 1), 3);
        assert_eq!(bonus_of(&awards, 2), 3);
        assert_eq!(bonus_of(&awards, 3), 1);
        assert_eq!(bonus_of(&awards, 4), 0);
    }

    #[test]
    fn test_tie_for_second_skips_third() {
        let awards = BonusEngine::award(&[entry(1, 40), entry(2, 35), entry(3, 35), entry(4, 30)]);
        assert_eq!(bonus_of(&awards, 1), 3);
        assert_eq!(bonus_of(&awards, 2), 2);
        assert_eq!(bonus_of(&awards, 3), 2);
        assert_eq!(bonus_of(&awards, 4), 0);
    }

    #[test]
    fn test_tie_for_third_shares_one_point() {
        let awards = BonusEngine::award(&[
            entry(1, 40),
            entry(2, 35),
            entry(3, 30),
            entry(4, 30),
            entry(5, 10),
        ]);
        assert_eq!(bonus_of(&awards, 3), 1);
        assert_eq!(bonus_of(&awards, 4), 1);
        assert_eq!(bonus_of(&awards, 5), 0);
    }

    #[test]
    fn test_players_without_minutes_are_not_ranked() {
        let mut benched = entry(9, 99);
        benched.minutes = 0;
        let awards = BonusEngine::award(&[benched, entry(1, 10)]);
        assert!(!awards.contains_key(&PlayerId::new(9)));
        assert_eq!(bonus_of(&awards, 1), 3);
    }

    #[test]
    fn test_higher_bps_never_gets_less_bonus() {
        let entries: Vec<BpsEntry> = [31, 12, 31, 27, 5, 27, 40, -3, 12]
            .iter()
            .enumerate()
            .map(|(i, bps)| entry(i as u32 + 1, *bps))
            .collect();
        let awards = BonusEngine::award(&entries);

        let threes = awards.values().filter(|b| **b == 3).count();
        assert!(threes >= 1 && threes <= 3);
        for a in &entries {
            for b in &entries {
                let (ba, bb) = (bonus_of(&awards, a.player.0), bonus_of(&awards, b.player.0));
                if a.bps == b.bps {
                    assert_eq!(ba, bb);
                } else if a.bps > b.bps {
                    assert!(ba >= bb);
                }
            }
        }
        let total_awarded: u32 = awards.values().map(|b| u32::from(*b)).sum();
        assert!(total_awarded <= 3 * 3);
    }

    #[test]
    fn test_apply_provisional_only_touches_unconfirmed_fixtures() {
        use crate::domain::FixtureStatus;

        let round = RoundId::new(1);
        let live = FixtureId::new(1);
        let done = FixtureId::new(2);
        let rec = |player: u32, fixture: FixtureId, bps: i32| {
            PerformanceRecord::new(PlayerId::new(player), round, fixture, TeamId::new(1), 90, 2)
                .with_bps(bps)
        };
        let records = vec![
            rec(1, live, 30).provisional(),
            rec(2, live, 20).provisional(),
            rec(3, done, 50).with_bonus(3),
            rec(4, done, 10).with_bonus(0),
        ];
        let fixtures = vec![
            FixtureStatus::new(live, round, TeamId::new(1), TeamId::new(2)).in_progress(),
            FixtureStatus::new(done, round, TeamId::new(3), TeamId::new(4)).finished(),
        ];
        let mut data = RoundData::new(round, vec![], records, fixtures);

        assert_eq!(BonusEngine::apply_provisional(&mut data, BonusPolicy::Live), 1);
        assert_eq!(data.records(PlayerId::new(1))[0].bonus, 3);
        assert_eq!(data.records(PlayerId::new(2))[0].bonus, 2);
        assert_eq!(data.records(PlayerId::new(3))[0].bonus, 3);
        assert_eq!(data.records(PlayerId::new(4))[0].bonus, 0);
    }

    #[test]
    fn test_finished_only_policy_skips_running_fixtures() {
        use crate::domain::FixtureStatus;

        let round = RoundId::new(1);
        let fixture = FixtureId::new(1);
        let records = vec![PerformanceRecord::new(
            PlayerId::new(1),
            round,
            fixture,
            TeamId::new(1),
            45,
            2,
        )
        .with_bps(12)
        .provisional()];
        let fixtures =
            vec![FixtureStatus::new(fixture, round, TeamId::new(1), TeamId::new(2)).in_progress()];
        let mut data = RoundData::new(round, vec![], records, fixtures);

        assert_eq!(
            BonusEngine::apply_provisional(&mut data, BonusPolicy::FinishedOnly),
            0
        );
        assert_eq!(data.records(PlayerId::new(1))[0].bonus, 0);
    }

    #[test]
    fn test_fixture_bps_feed_overrides_record_bps() {
        use crate::domain::FixtureStatus;

        let round = RoundId::new(1);
        let fixture = FixtureId::new(1);
        let rec = |player: u32, bps: i32| {
            PerformanceRecord::new(PlayerId::new(player), round, fixture, TeamId::new(1), 90, 2)
                .with_bps(bps)
                .provisional()
        };
        let mut status =
            FixtureStatus::new(fixture, round, TeamId::new(1), TeamId::new(2)).provisionally_finished();
        status.bps.insert(PlayerId::new(2), 60);
        let mut data = RoundData::new(round, vec![], vec![rec(1, 40), rec(2, 10)], vec![status]);

        BonusEngine::apply_provisional(&mut data, BonusPolicy::FinishedOnly);
        assert_eq!(data.records(PlayerId::new(2))[0].bonus, 3);
        assert_eq!(data.records(PlayerId::new(1))[0].bonus, 2);
    }
}
