//! Persisted round data: the final, bonus-confirmed view of completed rounds
//! and the league structure used for luck.

use crate::domain::{Chip, H2hMatch, LeagueId, ManagerId, ManagerPicks, RoundData, RoundId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mock;

pub use mock::MockRoundStore;

/// Chip played per (manager, round).
pub type ChipLedger = HashMap<(ManagerId, RoundId), Chip>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// A stored row cannot be mapped back into a domain value.
    #[error("corrupt row in {table}: {message}")]
    Corrupt { table: &'static str, message: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, message: impl fmt::Display) -> Self {
        StoreError::Corrupt {
            table,
            message: message.to_string(),
        }
    }
}

#[async_trait]
pub trait RoundStore: Send + Sync + fmt::Debug {
    /// Players, fixtures, and performance records of a round as persisted.
    async fn load_round(&self, round: RoundId) -> Result<RoundData, StoreError>;

    async fn load_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, StoreError>;

    /// Whether the sync layer has marked the round final.
    async fn is_round_finalized(&self, round: RoundId) -> Result<bool, StoreError>;

    async fn league_members(&self, league: LeagueId) -> Result<Vec<ManagerId>, StoreError>;

    /// Every stored head-to-head match of the league, ordered by round.
    async fn league_matches(&self, league: LeagueId) -> Result<Vec<H2hMatch>, StoreError>;

    /// Chips played by the league's members.
    async fn league_chips(&self, league: LeagueId) -> Result<ChipLedger, StoreError>;
}
