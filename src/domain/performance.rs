//! Per-player, per-fixture performance records.

use crate::domain::{FixtureId, PlayerId, Position, RoundId, TeamId};
use serde::{Deserialize, Serialize};

/// Static player attributes needed by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub team: TeamId,
    pub position: Position,
}

impl PlayerInfo {
    pub fn new(id: PlayerId, team: TeamId, position: Position) -> Self {
        Self { id, team, position }
    }
}

/// One player's performance in one fixture of a round.
///
/// A player with two fixtures in the same round has two records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub player: PlayerId,
    pub round: RoundId,
    pub fixture: FixtureId,
    pub team: TeamId,
    pub minutes: u16,
    pub goals_scored: u8,
    pub assists: u8,
    pub clean_sheets: u8,
    pub goals_conceded: u8,
    pub own_goals: u8,
    pub penalties_saved: u8,
    pub penalties_missed: u8,
    pub yellow_cards: u8,
    pub red_cards: u8,
    pub saves: u8,
    /// Raw bonus points system score used only for bonus ranking.
    pub bps: i32,
    /// Scoring points from the stat table, excluding bonus.
    pub base_points: i32,
    /// Bonus counted in `points`. For provisional records this starts at zero
    /// and is filled in from the live BPS table.
    pub bonus: u8,
    /// True while the fixture's bonus has not been confirmed upstream.
    pub provisional: bool,
}

impl PerformanceRecord {
    /// Create a record with only the fields the scoring engine reads.
    pub fn new(
        player: PlayerId,
        round: RoundId,
        fixture: FixtureId,
        team: TeamId,
        minutes: u16,
        base_points: i32,
    ) -> Self {
        Self {
            player,
            round,
            fixture,
            team,
            minutes,
            base_points,
            ..Default::default()
        }
    }

    pub fn with_bps(mut self, bps: i32) -> Self {
        self.bps = bps;
        self
    }

    pub fn with_bonus(mut self, bonus: u8) -> Self {
        self.bonus = bonus;
        self.provisional = false;
        self
    }

    pub fn provisional(mut self) -> Self {
        self.provisional = true;
        self.bonus = 0;
        self
    }

    /// Points this record contributes: base points plus confirmed bonus.
    pub fn points(&self) -> i32 {
        self.base_points + i32::from(self.bonus)
    }
}
