//! Head-to-head match results and luck components.

use crate::domain::{LeagueId, ManagerId, RoundId};
use serde::{Deserialize, Serialize};

/// Outcome of a head-to-head match from one manager's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn from_scores(own: i32, opponent: i32) -> Self {
        match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => MatchResult::Win,
            std::cmp::Ordering::Equal => MatchResult::Draw,
            std::cmp::Ordering::Less => MatchResult::Loss,
        }
    }
}

/// A head-to-head fixture between two managers in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct H2hMatch {
    pub league: LeagueId,
    pub round: RoundId,
    pub manager_a: ManagerId,
    pub points_a: i32,
    pub manager_b: ManagerId,
    pub points_b: i32,
}

impl H2hMatch {
    pub fn new(
        league: LeagueId,
        round: RoundId,
        (manager_a, points_a): (ManagerId, i32),
        (manager_b, points_b): (ManagerId, i32),
    ) -> Self {
        Self {
            league,
            round,
            manager_a,
            points_a,
            manager_b,
            points_b,
        }
    }

    /// The match seen from `manager`'s side: (own points, opponent, opponent points).
    pub fn side(&self, manager: ManagerId) -> Option<(i32, ManagerId, i32)> {
        if self.manager_a == manager {
            Some((self.points_a, self.manager_b, self.points_b))
        } else if self.manager_b == manager {
            Some((self.points_b, self.manager_a, self.points_a))
        } else {
            None
        }
    }

    pub fn result_for(&self, manager: ManagerId) -> Option<MatchResult> {
        self.side(manager)
            .map(|(own, _, opp)| MatchResult::from_scores(own, opp))
    }
}

/// Luck for one manager in one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundLuck {
    pub manager: ManagerId,
    pub round: RoundId,
    pub points: i32,
    pub result: MatchResult,
    pub variance_luck: f64,
    pub rank_luck: f64,
    pub round_luck_index: f64,
}

/// Season-long luck for one manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonLuck {
    pub manager: ManagerId,
    pub matches_played: u32,
    pub average_points: f64,
    pub variance_luck: f64,
    pub rank_luck: f64,
    pub schedule_luck: f64,
    pub chip_luck: f64,
    pub season_luck_index: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> H2hMatch {
        H2hMatch::new(
            LeagueId::new(1),
            RoundId::new(4),
            (ManagerId::new(10), 55),
            (ManagerId::new(20), 61),
        )
    }

    #[test]
    fn test_result_from_both_sides() {
        let m = sample();
        assert_eq!(m.result_for(ManagerId::new(10)), Some(MatchResult::Loss));
        assert_eq!(m.result_for(ManagerId::new(20)), Some(MatchResult::Win));
        assert_eq!(m.result_for(ManagerId::new(30)), None);
    }

    #[test]
    fn test_side_swaps_perspective() {
        let m = sample();
        assert_eq!(m.side(ManagerId::new(20)), Some((61, ManagerId::new(10), 55)));
    }
}
