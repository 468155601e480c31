//! Fixture state and the derived round status.

use crate::domain::{FixtureId, PlayerId, RoundId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State of one fixture as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureStatus {
    pub id: FixtureId,
    pub round: RoundId,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub kickoff: Option<DateTime<Utc>>,
    pub started: bool,
    /// Bonus has been confirmed and folded into player totals.
    pub finished: bool,
    /// The final whistle has gone but bonus is not yet confirmed.
    pub finished_provisional: bool,
    /// Per-player BPS from the fixture feed, when provided.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bps: BTreeMap<PlayerId, i32>,
}

impl FixtureStatus {
    pub fn new(id: FixtureId, round: RoundId, home_team: TeamId, away_team: TeamId) -> Self {
        Self {
            id,
            round,
            home_team,
            away_team,
            kickoff: None,
            started: false,
            finished: false,
            finished_provisional: false,
            bps: BTreeMap::new(),
        }
    }

    pub fn with_kickoff(mut self, kickoff: DateTime<Utc>) -> Self {
        self.kickoff = Some(kickoff);
        self
    }

    pub fn in_progress(mut self) -> Self {
        self.started = true;
        self
    }

    pub fn provisionally_finished(mut self) -> Self {
        self.started = true;
        self.finished_provisional = true;
        self
    }

    pub fn finished(mut self) -> Self {
        self.started = true;
        self.finished_provisional = true;
        self.finished = true;
        self
    }

    /// No more minutes can be played in this fixture.
    pub fn is_over(&self) -> bool {
        self.finished || self.finished_provisional
    }
}

/// Lifecycle state of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Upcoming,
    InProgress,
    Completed,
}

impl RoundStatus {
    /// Derive the status of a round.
    ///
    /// `finalized` is set by the sync layer once every fixture has finished and
    /// its settling buffer has elapsed; it is the only way to reach `Completed`.
    pub fn derive<'a>(
        fixtures: impl IntoIterator<Item = &'a FixtureStatus>,
        finalized: bool,
    ) -> Self {
        if finalized {
            RoundStatus::Completed
        } else if fixtures.into_iter().any(|f| f.started) {
            RoundStatus::InProgress
        } else {
            RoundStatus::Upcoming
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RoundStatus::Completed)
    }
}
