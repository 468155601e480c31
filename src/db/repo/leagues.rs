//! Manager picks and league structure operations for the repository.

use crate::domain::{
    Chip, H2hMatch, LeagueId, ManagerId, ManagerPicks, PlayerId, RoundId, SquadPick,
};
use crate::store::{ChipLedger, StoreError};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

use super::{narrow, Repository};

impl Repository {
    // =========================================================================
    // Picks
    // =========================================================================

    /// Store a manager's pick set for a round, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn save_picks(&self, picks: &ManagerPicks) -> Result<(), sqlx::Error> {
        let manager = i64::from(picks.manager.as_u32());
        let round = i64::from(picks.round.as_u32());

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM picks WHERE manager = ? AND round = ?")
            .bind(manager)
            .bind(round)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO manager_rounds (manager, round, chip, transfer_cost, official_total)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(manager, round) DO UPDATE SET
                chip = excluded.chip,
                transfer_cost = excluded.transfer_cost,
                official_total = excluded.official_total
            "#,
        )
        .bind(manager)
        .bind(round)
        .bind(picks.chip.as_str())
        .bind(i64::from(picks.transfer_cost))
        .bind(picks.official_total.map(i64::from))
        .execute(&mut *tx)
        .await?;

        for pick in &picks.picks {
            sqlx::query(
                r#"
                INSERT INTO picks (
                    manager, round, slot, player, multiplier, is_captain, is_vice_captain
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(manager)
            .bind(round)
            .bind(i64::from(pick.slot))
            .bind(i64::from(pick.player.as_u32()))
            .bind(i64::from(pick.multiplier))
            .bind(pick.is_captain)
            .bind(pick.is_vice_captain)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub(super) async fn fetch_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, StoreError> {
        let manager_key = i64::from(manager.as_u32());
        let round_key = i64::from(round.as_u32());

        let header = sqlx::query(
            r#"
            SELECT chip, transfer_cost, official_total
            FROM manager_rounds
            WHERE manager = ? AND round = ?
            "#,
        )
        .bind(manager_key)
        .bind(round_key)
        .fetch_optional(&self.pool)
        .await?;
        let Some(header) = header else {
            return Ok(None);
        };

        let chip: String = header.try_get("chip")?;
        let chip = Chip::from_str(&chip).map_err(|e| StoreError::corrupt("manager_rounds", e))?;
        let transfer_cost: u32 = narrow(&header, "manager_rounds", "transfer_cost")?;
        let official_total: Option<i64> = header.try_get("official_total")?;

        let rows = sqlx::query(
            r#"
            SELECT slot, player, multiplier, is_captain, is_vice_captain
            FROM picks
            WHERE manager = ? AND round = ?
            ORDER BY slot
            "#,
        )
        .bind(manager_key)
        .bind(round_key)
        .fetch_all(&self.pool)
        .await?;
        if rows.is_empty() {
            warn!(manager = %manager, round = %round, "Manager round stored without picks");
            return Ok(None);
        }
        let picks = rows
            .iter()
            .map(|row| -> Result<SquadPick, StoreError> {
                Ok(SquadPick {
                    player: PlayerId::new(narrow(row, "picks", "player")?),
                    slot: narrow(row, "picks", "slot")?,
                    multiplier: narrow(row, "picks", "multiplier")?,
                    is_captain: row.try_get("is_captain")?,
                    is_vice_captain: row.try_get("is_vice_captain")?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let mut picks = ManagerPicks::new(manager, round, picks, chip, transfer_cost)
            .map_err(|e| StoreError::corrupt("picks", format!("manager {}: {}", manager, e)))?;
        if let Some(total) = official_total {
            let total = i32::try_from(total)
                .map_err(|_| StoreError::corrupt("manager_rounds", "official_total out of range"))?;
            picks = picks.with_official_total(total);
        }
        Ok(Some(picks))
    }

    // =========================================================================
    // League structure
    // =========================================================================

    /// Add a manager to a league idempotently.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn add_league_member(
        &self,
        league: LeagueId,
        manager: ManagerId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO league_members (league, manager) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(i64::from(league.as_u32()))
        .bind(i64::from(manager.as_u32()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or update a head-to-head match.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_h2h_match(&self, m: &H2hMatch) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO h2h_matches (league, round, manager_a, points_a, manager_b, points_b)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(league, round, manager_a) DO UPDATE SET
                points_a = excluded.points_a,
                manager_b = excluded.manager_b,
                points_b = excluded.points_b
            "#,
        )
        .bind(i64::from(m.league.as_u32()))
        .bind(i64::from(m.round.as_u32()))
        .bind(i64::from(m.manager_a.as_u32()))
        .bind(i64::from(m.points_a))
        .bind(i64::from(m.manager_b.as_u32()))
        .bind(i64::from(m.points_b))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub(super) async fn fetch_league_members(
        &self,
        league: LeagueId,
    ) -> Result<Vec<ManagerId>, StoreError> {
        let rows = sqlx::query("SELECT manager FROM league_members WHERE league = ? ORDER BY manager")
            .bind(i64::from(league.as_u32()))
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| -> Result<ManagerId, StoreError> {
                Ok(ManagerId::new(narrow(row, "league_members", "manager")?))
            })
            .collect()
    }

    pub(super) async fn fetch_league_matches(
        &self,
        league: LeagueId,
    ) -> Result<Vec<H2hMatch>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT round, manager_a, points_a, manager_b, points_b
            FROM h2h_matches
            WHERE league = ?
            ORDER BY round, manager_a
            "#,
        )
        .bind(i64::from(league.as_u32()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> Result<H2hMatch, StoreError> {
                const TABLE: &str = "h2h_matches";
                Ok(H2hMatch::new(
                    league,
                    RoundId::new(narrow(row, TABLE, "round")?),
                    (
                        ManagerId::new(narrow(row, TABLE, "manager_a")?),
                        narrow(row, TABLE, "points_a")?,
                    ),
                    (
                        ManagerId::new(narrow(row, TABLE, "manager_b")?),
                        narrow(row, TABLE, "points_b")?,
                    ),
                ))
            })
            .collect()
    }

    pub(super) async fn fetch_league_chips(&self, league: LeagueId) -> Result<ChipLedger, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT mr.manager, mr.round, mr.chip
            FROM manager_rounds mr
            JOIN league_members lm ON lm.manager = mr.manager
            WHERE lm.league = ?
            "#,
        )
        .bind(i64::from(league.as_u32()))
        .fetch_all(&self.pool)
        .await?;

        let mut chips = ChipLedger::new();
        for row in &rows {
            let chip: String = row.try_get("chip")?;
            let chip =
                Chip::from_str(&chip).map_err(|e| StoreError::corrupt("manager_rounds", e))?;
            chips.insert(
                (
                    ManagerId::new(narrow(row, "manager_rounds", "manager")?),
                    RoundId::new(narrow(row, "manager_rounds", "round")?),
                ),
                chip,
            );
        }
        Ok(chips)
    }
}
