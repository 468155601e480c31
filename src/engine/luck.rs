//! Luck decomposition of head-to-head results.
//!
//! Four components are computed per manager:
//! - variance luck (per round, zero-sum): own score against the mean of everyone else's
//! - rank luck (per round, not zero-sum): results that ran against current form
//! - schedule luck (per season, zero-sum): strength of opponents actually faced
//! - chip luck (per season, zero-sum): exposure to opponents playing boost chips
//!
//! Zero-sum components are validated on every decomposition.

use crate::domain::{Chip, H2hMatch, ManagerId, MatchResult, RoundId, RoundLuck, SeasonLuck};
use crate::engine::invariants::{check_zero_sum, InvariantViolation, ZeroSumComponent};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Weight and normalization divisor of one component in a luck index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexTerm {
    pub weight: f64,
    pub divisor: f64,
}

impl IndexTerm {
    const fn new(weight: f64, divisor: f64) -> Self {
        Self { weight, divisor }
    }

    fn apply(&self, value: f64) -> f64 {
        self.weight * (value / self.divisor)
    }
}

pub const SEASON_VARIANCE: IndexTerm = IndexTerm::new(0.4, 10.0);
pub const SEASON_RANK: IndexTerm = IndexTerm::new(0.3, 1.0);
pub const SEASON_SCHEDULE: IndexTerm = IndexTerm::new(0.2, 5.0);
pub const SEASON_CHIP: IndexTerm = IndexTerm::new(0.1, 3.0);
pub const ROUND_VARIANCE: IndexTerm = IndexTerm::new(0.6, 10.0);
pub const ROUND_RANK: IndexTerm = IndexTerm::new(0.4, 1.0);

/// Season-to-date scoring average for one manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonAverage {
    pub matches: u32,
    pub average: f64,
}

/// Decomposes a league's results into luck components.
///
/// Inputs are the league's materialized matches and the chips each manager
/// played per round; nothing is fetched.
pub struct LuckDecomposer<'a> {
    matches: &'a [H2hMatch],
    chips: &'a HashMap<(ManagerId, RoundId), Chip>,
    averages: BTreeMap<ManagerId, SeasonAverage>,
    scope: String,
}

impl<'a> LuckDecomposer<'a> {
    pub fn new(matches: &'a [H2hMatch], chips: &'a HashMap<(ManagerId, RoundId), Chip>) -> Self {
        let scope = matches
            .first()
            .map(|m| format!("league {}", m.league))
            .unwrap_or_else(|| "empty league".to_string());
        Self {
            averages: season_averages(matches),
            matches,
            chips,
            scope,
        }
    }

    fn average_of(&self, manager: ManagerId) -> f64 {
        self.averages.get(&manager).map(|a| a.average).unwrap_or(0.0)
    }

    pub fn rounds(&self) -> BTreeSet<RoundId> {
        self.matches.iter().map(|m| m.round).collect()
    }

    /// Variance and rank luck for every manager who played in `round`.
    pub fn round_luck(&self, round: RoundId) -> Result<Vec<RoundLuck>, InvariantViolation> {
        let round_matches: Vec<&H2hMatch> =
            self.matches.iter().filter(|m| m.round == round).collect();

        let mut scores: BTreeMap<ManagerId, i32> = BTreeMap::new();
        for m in &round_matches {
            scores.insert(m.manager_a, m.points_a);
            scores.insert(m.manager_b, m.points_b);
        }
        let variance = variance_luck(&scores);
        check_zero_sum(
            ZeroSumComponent::Variance,
            format!("{} round {}", self.scope, round),
            variance.values().copied(),
        )?;

        let mut out = Vec::with_capacity(scores.len());
        for m in &round_matches {
            for manager in [m.manager_a, m.manager_b] {
                let Some((own, opponent, opp_points)) = m.side(manager) else {
                    continue;
                };
                let result = MatchResult::from_scores(own, opp_points);
                let own_form = f64::from(own) - self.average_of(manager);
                let opp_form = f64::from(opp_points) - self.average_of(opponent);
                let variance_luck = variance.get(&manager).copied().unwrap_or(0.0);
                let rank_luck = rank_luck(result, own_form, opp_form);

                out.push(RoundLuck {
                    manager,
                    round,
                    points: own,
                    result,
                    variance_luck,
                    rank_luck,
                    round_luck_index: ROUND_VARIANCE.apply(variance_luck)
                        + ROUND_RANK.apply(rank_luck),
                });
            }
        }
        out.sort_by_key(|l| l.manager);
        Ok(out)
    }

    /// Season totals, schedule luck, chip luck, and the season index.
    pub fn season_luck(&self) -> Result<Vec<SeasonLuck>, InvariantViolation> {
        let mut variance_total: BTreeMap<ManagerId, f64> = BTreeMap::new();
        let mut rank_total: BTreeMap<ManagerId, f64> = BTreeMap::new();
        for round in self.rounds() {
            for luck in self.round_luck(round)? {
                *variance_total.entry(luck.manager).or_default() += luck.variance_luck;
                *rank_total.entry(luck.manager).or_default() += luck.rank_luck;
            }
        }

        let schedule = self.schedule_luck();
        check_zero_sum(
            ZeroSumComponent::Schedule,
            self.scope.clone(),
            schedule.values().copied(),
        )?;
        let chip = self.chip_luck();
        check_zero_sum(
            ZeroSumComponent::Chip,
            self.scope.clone(),
            chip.values().copied(),
        )?;

        Ok(self
            .averages
            .iter()
            .map(|(manager, avg)| {
                let variance_luck = variance_total.get(manager).copied().unwrap_or(0.0);
                let rank_luck = rank_total.get(manager).copied().unwrap_or(0.0);
                let schedule_luck = schedule.get(manager).copied().unwrap_or(0.0);
                let chip_luck = chip.get(manager).copied().unwrap_or(0.0);
                SeasonLuck {
                    manager: *manager,
                    matches_played: avg.matches,
                    average_points: avg.average,
                    variance_luck,
                    rank_luck,
                    schedule_luck,
                    chip_luck,
                    season_luck_index: SEASON_VARIANCE.apply(variance_luck)
                        + SEASON_RANK.apply(rank_luck)
                        + SEASON_SCHEDULE.apply(schedule_luck)
                        + SEASON_CHIP.apply(chip_luck),
                }
            })
            .collect())
    }

    /// Average opponent strength a manager would face on a neutral schedule
    /// minus the average strength of the opponents actually faced. Strength is
    /// the opponent's season scoring average. Centered over the league.
    pub fn schedule_luck(&self) -> BTreeMap<ManagerId, f64> {
        let managers: Vec<ManagerId> = self.averages.keys().copied().collect();
        if managers.len() < 2 {
            return managers.into_iter().map(|m| (m, 0.0)).collect();
        }
        let total: f64 = self.averages.values().map(|a| a.average).sum();
        let others = (managers.len() - 1) as f64;

        let raw = managers
            .iter()
            .map(|&manager| {
                let baseline = (total - self.average_of(manager)) / others;
                let faced: Vec<f64> = self
                    .matches
                    .iter()
                    .filter_map(|m| m.side(manager))
                    .map(|(_, opponent, _)| self.average_of(opponent))
                    .collect();
                let faced_mean = if faced.is_empty() {
                    baseline
                } else {
                    faced.iter().sum::<f64>() / faced.len() as f64
                };
                (manager, baseline - faced_mean)
            })
            .collect();
        centered(raw)
    }

    /// Minus the number of matches in which the opponent played a scoring-boost
    /// chip, centered over the league.
    pub fn chip_luck(&self) -> BTreeMap<ManagerId, f64> {
        let raw = self
            .averages
            .keys()
            .map(|&manager| {
                let faced = self
                    .matches
                    .iter()
                    .filter_map(|m| m.side(manager).map(|(_, opponent, _)| (m.round, opponent)))
                    .filter(|(round, opponent)| {
                        self.chips
                            .get(&(*opponent, *round))
                            .map(Chip::is_scoring_boost)
                            .unwrap_or(false)
                    })
                    .count();
                (manager, -(faced as f64))
            })
            .collect();
        centered(raw)
    }
}

/// Scoring average per manager over the supplied matches.
pub fn season_averages(matches: &[H2hMatch]) -> BTreeMap<ManagerId, SeasonAverage> {
    let mut totals: BTreeMap<ManagerId, (i64, u32)> = BTreeMap::new();
    for m in matches {
        for (manager, points) in [(m.manager_a, m.points_a), (m.manager_b, m.points_b)] {
            let entry = totals.entry(manager).or_default();
            entry.0 += i64::from(points);
            entry.1 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(manager, (sum, n))| {
            (
                manager,
                SeasonAverage {
                    matches: n,
                    average: sum as f64 / f64::from(n),
                },
            )
        })
        .collect()
}

/// Each manager's score minus the mean score of every other manager.
///
/// Sums to zero over the managers given.
pub fn variance_luck(scores: &BTreeMap<ManagerId, i32>) -> BTreeMap<ManagerId, f64> {
    if scores.len() < 2 {
        return scores.keys().map(|m| (*m, 0.0)).collect();
    }
    let total: f64 = scores.values().map(|s| f64::from(*s)).sum();
    let others = (scores.len() - 1) as f64;
    scores
        .iter()
        .map(|(manager, score)| {
            let own = f64::from(*score);
            (*manager, own - (total - own) / others)
        })
        .collect()
}

/// Luck of a single result given both sides' form (score minus season average).
///
/// Winning while below your own average is lucky, more so when the opponent
/// was also below theirs; losing while above your average is unlucky, more
/// so when the opponent was also above theirs. Draws count half.
pub fn rank_luck(result: MatchResult, own_form: f64, opponent_form: f64) -> f64 {
    match result {
        MatchResult::Win if own_form < 0.0 => {
            if opponent_form < 0.0 {
                1.0
            } else {
                0.5
            }
        }
        MatchResult::Loss if own_form > 0.0 => {
            if opponent_form > 0.0 {
                -1.0
            } else {
                -0.5
            }
        }
        MatchResult::Draw if own_form < 0.0 => 0.5,
        MatchResult::Draw if own_form > 0.0 => -0.5,
        _ => 0.0,
    }
}

fn centered(raw: BTreeMap<ManagerId, f64>) -> BTreeMap<ManagerId, f64> {
    if raw.is_empty() {
        return raw;
    }
    let mean = raw.values().sum::<f64>() / raw.len() as f64;
    raw.into_iter().map(|(m, v)| (m, v - mean)).collect()
}
