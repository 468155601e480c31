//! Chooses live or persisted inputs by round state and runs the engine.

use crate::datasource::{DataSourceError, LiveSource};
use crate::domain::{
    LeagueId, ManagerId, ManagerPicks, RoundData, RoundId, RoundLuck, RoundStatus, SeasonLuck,
    TeamGameweekScore,
};
use crate::engine::{
    check_breakdown, verify_official_total, BonusEngine, BonusPolicy, Formation,
    InvariantViolation, LuckDecomposer, TeamScoreCalculator,
};
use crate::store::{RoundStore, StoreError};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("picks for manager {manager} in round {round} are not yet available")]
    MissingPicks { manager: ManagerId, round: RoundId },
    #[error("invalid picks: {0}")]
    InvalidPicks(String),
    #[error("live source: {0}")]
    Source(#[from] DataSourceError),
    #[error("round store: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Scoring rules that vary by deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    pub formation: Formation,
    pub bonus_policy: BonusPolicy,
    /// Check completed-round scores against the stored official total.
    pub verify_official_totals: bool,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            formation: Formation::default(),
            bonus_policy: BonusPolicy::default(),
            verify_official_totals: true,
        }
    }
}

/// A round's inputs as resolved for one request.
#[derive(Debug, Clone)]
pub struct ResolvedRound {
    pub status: RoundStatus,
    pub data: RoundData,
}

/// Per-manager outcome of a league fan-out.
#[derive(Debug)]
pub struct LeagueScore {
    pub manager: ManagerId,
    pub result: Result<TeamGameweekScore, ScoreError>,
}

#[derive(Clone)]
pub struct Reconciler {
    live: Arc<dyn LiveSource>,
    store: Arc<dyn RoundStore>,
    settings: ReconcilerSettings,
}

impl Reconciler {
    pub fn new(
        live: Arc<dyn LiveSource>,
        store: Arc<dyn RoundStore>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            live,
            store,
            settings,
        }
    }

    /// Resolve a round's data from the store when it is final, otherwise from
    /// the live source with provisional bonus applied.
    pub async fn resolve_round(&self, round: RoundId) -> Result<ResolvedRound, ScoreError> {
        if self.store.is_round_finalized(round).await? {
            info!(round = %round, "Scoring from persisted round");
            let data = self.store.load_round(round).await?;
            return Ok(ResolvedRound {
                status: RoundStatus::Completed,
                data,
            });
        }

        let mut data = self.live.fetch_live_round(round).await?;
        let status = RoundStatus::derive(data.fixtures(), false);
        let fixtures = BonusEngine::apply_provisional(&mut data, self.settings.bonus_policy);
        info!(
            round = %round,
            status = ?status,
            provisional_fixtures = fixtures,
            "Scoring from live round"
        );
        Ok(ResolvedRound { status, data })
    }

    async fn resolve_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
        status: RoundStatus,
    ) -> Result<ManagerPicks, ScoreError> {
        let picks = if status.is_completed() {
            self.store.load_picks(manager, round).await?
        } else {
            self.live.fetch_picks(manager, round).await?
        };
        let picks = picks.ok_or(ScoreError::MissingPicks { manager, round })?;
        if picks.manager != manager || picks.round != round {
            return Err(ScoreError::InvalidPicks(format!(
                "requested manager {} round {}, got manager {} round {}",
                manager, round, picks.manager, picks.round
            )));
        }
        Ok(picks)
    }

    /// Run the calculator and the standing checks on resolved inputs.
    pub fn score(
        &self,
        picks: &ManagerPicks,
        resolved: &ResolvedRound,
    ) -> Result<TeamGameweekScore, ScoreError> {
        let score = TeamScoreCalculator::new(&self.settings.formation).calculate(
            picks,
            &resolved.data,
            resolved.status,
        );
        check_breakdown(&score)?;

        if resolved.status.is_completed() && self.settings.verify_official_totals {
            match picks.official_total {
                Some(official) => verify_official_total(&score, official)?,
                None => debug!(
                    manager = %picks.manager,
                    round = %picks.round,
                    "No official total to verify against"
                ),
            }
        }
        Ok(score)
    }

    /// Score one manager's round.
    pub async fn score_team(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<TeamGameweekScore, ScoreError> {
        let resolved = self.resolve_round(round).await?;
        let picks = self.resolve_picks(manager, round, resolved.status).await?;
        self.score(&picks, &resolved)
    }

    /// Score every member of a league concurrently.
    ///
    /// The round is resolved once and shared. A failure for one manager is
    /// reported in that manager's entry and does not affect the others.
    pub async fn score_league_round(
        &self,
        league: LeagueId,
        round: RoundId,
    ) -> Result<Vec<LeagueScore>, ScoreError> {
        let members = self.store.league_members(league).await?;
        let resolved = self.resolve_round(round).await?;

        let resolved = &resolved;
        let futures = members.iter().map(|&manager| async move {
            let result = match self.resolve_picks(manager, round, resolved.status).await {
                Ok(picks) => self.score(&picks, resolved),
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(league = %league, manager = %manager, round = %round, error = %e, "Failed to score manager");
            }
            LeagueScore { manager, result }
        });
        Ok(join_all(futures).await)
    }

    /// Variance and rank luck for one round of a league.
    pub async fn round_luck(
        &self,
        league: LeagueId,
        round: RoundId,
    ) -> Result<Vec<RoundLuck>, ScoreError> {
        let (matches, chips) = futures::try_join!(
            self.store.league_matches(league),
            self.store.league_chips(league)
        )?;
        Ok(LuckDecomposer::new(&matches, &chips).round_luck(round)?)
    }

    /// Season luck for every manager of a league.
    pub async fn season_luck(&self, league: LeagueId) -> Result<Vec<SeasonLuck>, ScoreError> {
        let (matches, chips) = futures::try_join!(
            self.store.league_matches(league),
            self.store.league_chips(league)
        )?;
        debug!(league = %league, matches = matches.len(), "Decomposing season luck");
        Ok(LuckDecomposer::new(&matches, &chips).season_luck()?)
    }
}
