//! Repository layer for database operations.
//!
//! `Repository` is the SQLite-backed [`RoundStore`]. Write methods are split
//! across submodules:
//! - `rounds.rs` - players, fixtures, performances, round finalization
//! - `leagues.rs` - manager picks, league members, head-to-head matches

mod leagues;
mod rounds;

use crate::domain::{H2hMatch, LeagueId, ManagerId, ManagerPicks, RoundData, RoundId};
use crate::store::{ChipLedger, RoundStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::fmt;

/// Repository for database operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Liveness check used by `/ready`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be queried.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Read an integer column into a narrower type, reporting out-of-range values.
pub(crate) fn narrow<T>(row: &SqliteRow, table: &'static str, column: &str) -> Result<T, StoreError>
where
    T: TryFrom<i64>,
{
    let value: i64 = row.try_get(column)?;
    T::try_from(value)
        .map_err(|_| StoreError::corrupt(table, format!("{} = {} is out of range", column, value)))
}

#[async_trait]
impl RoundStore for Repository {
    async fn load_round(&self, round: RoundId) -> Result<RoundData, StoreError> {
        self.fetch_round(round).await
    }

    async fn load_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, StoreError> {
        self.fetch_picks(manager, round).await
    }

    async fn is_round_finalized(&self, round: RoundId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT finalized FROM rounds WHERE round = ?")
            .bind(i64::from(round.as_u32()))
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some(row) => row.try_get::<i64, _>("finalized")? != 0,
            None => false,
        })
    }

    async fn league_members(&self, league: LeagueId) -> Result<Vec<ManagerId>, StoreError> {
        self.fetch_league_members(league).await
    }

    async fn league_matches(&self, league: LeagueId) -> Result<Vec<H2hMatch>, StoreError> {
        self.fetch_league_matches(league).await
    }

    async fn league_chips(&self, league: LeagueId) -> Result<ChipLedger, StoreError> {
        self.fetch_league_chips(league).await
    }
}
