//! Team score calculation for one manager and round.

use crate::domain::{
    Chip, ManagerPicks, PlayerId, RoundData, RoundStatus, ScoreParts, TeamGameweekScore,
};
use crate::engine::substitution::{Formation, SubstitutionEngine};
use tracing::warn;

pub struct TeamScoreCalculator<'a> {
    formation: &'a Formation,
}

impl<'a> TeamScoreCalculator<'a> {
    pub fn new(formation: &'a Formation) -> Self {
        Self { formation }
    }

    /// Compute the score breakdown for a pick set against a round's data.
    ///
    /// `data` must already carry whatever bonus the caller wants counted.
    /// Picked players without a performance record score zero and are listed
    /// in `missing_players`.
    pub fn calculate(
        &self,
        picks: &ManagerPicks,
        data: &RoundData,
        round_status: RoundStatus,
    ) -> TeamGameweekScore {
        let missing_players: Vec<PlayerId> = picks
            .picks
            .iter()
            .filter(|p| data.records(p.player).is_empty())
            .map(|p| p.player)
            .collect();
        if !missing_players.is_empty() && round_status.is_completed() {
            warn!(
                manager = %picks.manager,
                round = %picks.round,
                missing = missing_players.len(),
                "picked players without performance records"
            );
        }

        let starting_xi_total: i32 = picks
            .starters()
            .iter()
            .filter(|p| p.multiplier > 0)
            .map(|p| data.player_round(p.player).points)
            .sum();

        let (bench_boost_total, auto_subs) = if picks.chip == Chip::BenchBoost {
            let total = picks
                .bench()
                .iter()
                .map(|p| data.player_round(p.player).points)
                .sum();
            (total, Vec::new())
        } else {
            let outcome = SubstitutionEngine::new(self.formation).apply(picks, data);
            (0, outcome.auto_subs)
        };

        let armband = Self::armband(picks, data);
        let captain_bonus = armband
            .map(|player| {
                (picks.chip.captain_multiplier() - 1) * data.player_round(player).points
            })
            .unwrap_or(0);

        TeamGameweekScore::assemble(
            picks.manager,
            picks.round,
            picks.chip,
            round_status,
            ScoreParts {
                starting_xi_total,
                captain_bonus,
                bench_boost_total,
                auto_subs,
                transfer_cost: i32::try_from(picks.transfer_cost).unwrap_or(i32::MAX),
                captain_played_by: armband,
                missing_players,
            },
        )
    }

    /// The player whose points are multiplied: the captain, else the
    /// vice-captain when the captain did not play, else nobody.
    fn armband(picks: &ManagerPicks, data: &RoundData) -> Option<PlayerId> {
        let captain = picks.captain();
        if !data.player_round(captain.player).did_not_play() {
            return Some(captain.player);
        }
        let vice = picks.vice_captain();
        if !data.player_round(vice.player).did_not_play() {
            return Some(vice.player);
        }
        None
    }
}
