//! Automatic substitutions for starters who did not play.

use crate::domain::{AutoSub, ManagerPicks, Position, RoundData, SquadPick};

/// Per-position bounds a starting XI must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formation {
    min: [u8; 4],
    max: [u8; 4],
}

impl Default for Formation {
    /// One goalkeeper, 3-5 defenders, 2-5 midfielders, 1-3 forwards.
    fn default() -> Self {
        Self {
            min: [1, 3, 2, 1],
            max: [1, 5, 5, 3],
        }
    }
}

/// Position counts of an XI, indexed GKP, DEF, MID, FWD.
pub type PositionCounts = [u8; 4];

impl Formation {
    /// Bounds in GKP, DEF, MID, FWD order.
    pub fn new(min: [u8; 4], max: [u8; 4]) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self, counts: &PositionCounts) -> bool {
        Position::ALL.iter().all(|p| {
            let n = counts[p.index()];
            n >= self.min[p.index()] && n <= self.max[p.index()]
        })
    }

    pub fn count<'a>(positions: impl IntoIterator<Item = &'a Position>) -> PositionCounts {
        let mut counts = [0u8; 4];
        for p in positions {
            counts[p.index()] += 1;
        }
        counts
    }
}

/// Result of running substitutions for one manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOutcome {
    /// The XI after substitutions, in original slot order.
    pub effective_xi: Vec<SquadPick>,
    pub auto_subs: Vec<AutoSub>,
}

pub struct SubstitutionEngine<'a> {
    formation: &'a Formation,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(formation: &'a Formation) -> Self {
        Self { formation }
    }

    /// Replace starters who did not play with bench players in priority order.
    ///
    /// A starter is replaced only when all of their fixtures are over with zero
    /// minutes and their pick multiplier is non-zero. A candidate must have
    /// minutes, must not already be used, must match goalkeeper for goalkeeper,
    /// and must leave the XI formation-valid. When nobody qualifies the
    /// starter stays.
    pub fn apply(&self, picks: &ManagerPicks, data: &RoundData) -> SubstitutionOutcome {
        let mut effective: Vec<SquadPick> = picks.starters().to_vec();
        let mut counts = Formation::count(
            effective
                .iter()
                .filter_map(|p| data.player(p.player).map(|info| &info.position)),
        );
        let bench = picks.bench();
        let mut used = vec![false; bench.len()];
        let mut auto_subs = Vec::new();

        for starter in effective.iter_mut() {
            if starter.multiplier == 0 {
                continue;
            }
            let out = data.player_round(starter.player);
            if !out.did_not_play() {
                continue;
            }
            let Some(out_position) = out.info.map(|i| i.position) else {
                continue;
            };

            for (idx, candidate) in bench.iter().enumerate() {
                if used[idx] {
                    continue;
                }
                let incoming = data.player_round(candidate.player);
                if incoming.minutes == 0 {
                    continue;
                }
                let Some(in_position) = incoming.info.map(|i| i.position) else {
                    continue;
                };
                if out_position.is_goalkeeper() != in_position.is_goalkeeper() {
                    continue;
                }

                let mut next = counts;
                next[out_position.index()] -= 1;
                next[in_position.index()] += 1;
                if !self.formation.is_valid(&next) {
                    continue;
                }

                used[idx] = true;
                counts = next;
                auto_subs.push(AutoSub {
                    player_out: starter.player,
                    player_in: candidate.player,
                    points_gained: incoming.points - out.points,
                });
                *starter = SquadPick {
                    player: candidate.player,
                    slot: starter.slot,
                    multiplier: 1,
                    is_captain: false,
                    is_vice_captain: false,
                };
                break;
            }
        }

        SubstitutionOutcome {
            effective_xi: effective,
            auto_subs,
        }
    }
}
