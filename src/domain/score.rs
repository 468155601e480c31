//! Computed team score for one manager and round.

use crate::domain::{Chip, ManagerId, PlayerId, RoundId, RoundStatus};
use serde::{Deserialize, Serialize};

/// One automatic substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSub {
    pub player_out: PlayerId,
    pub player_in: PlayerId,
    /// Incoming player's points minus outgoing player's points.
    pub points_gained: i32,
}

/// A manager's score breakdown for a round.
///
/// `gross_total = starting_xi_total + captain_bonus + bench_boost_total + auto_sub_total`
/// and `net_total = gross_total - transfer_cost` hold for every value built by
/// [`TeamGameweekScore::assemble`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGameweekScore {
    pub manager: ManagerId,
    pub round: RoundId,
    pub starting_xi_total: i32,
    pub captain_bonus: i32,
    pub bench_boost_total: i32,
    pub auto_sub_total: i32,
    pub gross_total: i32,
    pub transfer_cost: i32,
    pub net_total: i32,
    pub auto_subs: Vec<AutoSub>,
    pub active_chip: Chip,
    pub round_status: RoundStatus,
    /// Player whose points received the armband multiplier, if anyone played.
    pub captain_played_by: Option<PlayerId>,
    /// Picked players with no performance record this round.
    pub missing_players: Vec<PlayerId>,
}

/// Components that determine a score; totals are derived from them.
#[derive(Debug, Clone, Default)]
pub struct ScoreParts {
    pub starting_xi_total: i32,
    pub captain_bonus: i32,
    pub bench_boost_total: i32,
    pub auto_subs: Vec<AutoSub>,
    pub transfer_cost: i32,
    pub captain_played_by: Option<PlayerId>,
    pub missing_players: Vec<PlayerId>,
}

impl TeamGameweekScore {
    pub fn assemble(
        manager: ManagerId,
        round: RoundId,
        active_chip: Chip,
        round_status: RoundStatus,
        parts: ScoreParts,
    ) -> Self {
        let auto_sub_total = parts.auto_subs.iter().map(|s| s.points_gained).sum::<i32>();
        let gross_total =
            parts.starting_xi_total + parts.captain_bonus + parts.bench_boost_total + auto_sub_total;

        Self {
            manager,
            round,
            starting_xi_total: parts.starting_xi_total,
            captain_bonus: parts.captain_bonus,
            bench_boost_total: parts.bench_boost_total,
            auto_sub_total,
            gross_total,
            transfer_cost: parts.transfer_cost,
            net_total: gross_total - parts.transfer_cost,
            auto_subs: parts.auto_subs,
            active_chip,
            round_status,
            captain_played_by: parts.captain_played_by,
            missing_players: parts.missing_players,
        }
    }

    /// Whether any picked player lacked a performance record.
    pub fn has_missing_inputs(&self) -> bool {
        !self.missing_players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_derives_totals() {
        let score = TeamGameweekScore::assemble(
            ManagerId::new(1),
            RoundId::new(2),
            Chip::None,
            RoundStatus::Completed,
            ScoreParts {
                starting_xi_total: 50,
                captain_bonus: 8,
                bench_boost_total: 0,
                auto_subs: vec![AutoSub {
                    player_out: PlayerId::new(1),
                    player_in: PlayerId::new(2),
                    points_gained: 3,
                }],
                transfer_cost: 4,
                captain_played_by: Some(PlayerId::new(9)),
                missing_players: vec![],
            },
        );
        assert_eq!(score.auto_sub_total, 3);
        assert_eq!(score.gross_total, 61);
        assert_eq!(score.net_total, 57);
        assert!(!score.has_missing_inputs());
    }

    #[test]
    fn test_score_serializes_camel_case() {
        let score = TeamGameweekScore::assemble(
            ManagerId::new(1),
            RoundId::new(2),
            Chip::BenchBoost,
            RoundStatus::InProgress,
            ScoreParts::default(),
        );
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["netTotal"], 0);
        assert_eq!(json["activeChip"], "bench_boost");
        assert_eq!(json["roundStatus"], "in_progress");
    }
}
