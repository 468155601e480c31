//! Player, fixture, and performance operations for the repository.

use crate::domain::{
    FixtureId, FixtureStatus, PerformanceRecord, PlayerId, PlayerInfo, Position, RoundData,
    RoundId, TeamId,
};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::collections::BTreeMap;

use super::{narrow, Repository};

impl Repository {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert or update players in a single transaction.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn upsert_players(&self, players: &[PlayerInfo]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for player in players {
            sqlx::query(
                r#"
                INSERT INTO players (id, team, position) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET team = excluded.team, position = excluded.position
                "#,
            )
            .bind(i64::from(player.id.as_u32()))
            .bind(i64::from(player.team.as_u32()))
            .bind(player.position.to_string())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(players.len())
    }

    /// Insert or update a fixture's state.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_fixture(&self, fixture: &FixtureStatus) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO fixtures (
                id, round, home_team, away_team, kickoff,
                started, finished, finished_provisional
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                round = excluded.round,
                home_team = excluded.home_team,
                away_team = excluded.away_team,
                kickoff = excluded.kickoff,
                started = excluded.started,
                finished = excluded.finished,
                finished_provisional = excluded.finished_provisional
            "#,
        )
        .bind(i64::from(fixture.id.as_u32()))
        .bind(i64::from(fixture.round.as_u32()))
        .bind(i64::from(fixture.home_team.as_u32()))
        .bind(i64::from(fixture.away_team.as_u32()))
        .bind(fixture.kickoff)
        .bind(fixture.started)
        .bind(fixture.finished)
        .bind(fixture.finished_provisional)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or replace performance records in a single transaction.
    ///
    /// A record is keyed by (player, fixture); a later sync overwrites it.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn upsert_performances(
        &self,
        records: &[PerformanceRecord],
    ) -> Result<usize, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for r in records {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO performances (
                    player, round, fixture, team, minutes,
                    goals_scored, assists, clean_sheets, goals_conceded, own_goals,
                    penalties_saved, penalties_missed, yellow_cards, red_cards, saves,
                    bps, base_points, bonus, provisional
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(i64::from(r.player.as_u32()))
            .bind(i64::from(r.round.as_u32()))
            .bind(i64::from(r.fixture.as_u32()))
            .bind(i64::from(r.team.as_u32()))
            .bind(i64::from(r.minutes))
            .bind(i64::from(r.goals_scored))
            .bind(i64::from(r.assists))
            .bind(i64::from(r.clean_sheets))
            .bind(i64::from(r.goals_conceded))
            .bind(i64::from(r.own_goals))
            .bind(i64::from(r.penalties_saved))
            .bind(i64::from(r.penalties_missed))
            .bind(i64::from(r.yellow_cards))
            .bind(i64::from(r.red_cards))
            .bind(i64::from(r.saves))
            .bind(i64::from(r.bps))
            .bind(i64::from(r.base_points))
            .bind(i64::from(r.bonus))
            .bind(r.provisional)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(records.len())
    }

    /// Mark a round as final. Scores for it are then read from this store.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn mark_round_finalized(&self, round: RoundId) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO rounds (round, finalized, finalized_at) VALUES (?, 1, ?)
            ON CONFLICT(round) DO UPDATE SET finalized = 1
            "#,
        )
        .bind(i64::from(round.as_u32()))
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub(super) async fn fetch_round(&self, round: RoundId) -> Result<RoundData, StoreError> {
        let round_key = i64::from(round.as_u32());

        let player_rows = sqlx::query("SELECT id, team, position FROM players")
            .fetch_all(&self.pool)
            .await?;
        let players = player_rows
            .iter()
            .map(|row| -> Result<PlayerInfo, StoreError> {
                let position: String = row.try_get("position")?;
                let position = match position.as_str() {
                    "GKP" => Position::Gkp,
                    "DEF" => Position::Def,
                    "MID" => Position::Mid,
                    "FWD" => Position::Fwd,
                    other => {
                        return Err(StoreError::corrupt(
                            "players",
                            format!("unknown position {}", other),
                        ))
                    }
                };
                Ok(PlayerInfo::new(
                    PlayerId::new(narrow(row, "players", "id")?),
                    TeamId::new(narrow(row, "players", "team")?),
                    position,
                ))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let fixture_rows = sqlx::query(
            r#"
            SELECT id, round, home_team, away_team, kickoff,
                   started, finished, finished_provisional
            FROM fixtures
            WHERE round = ?
            ORDER BY id
            "#,
        )
        .bind(round_key)
        .fetch_all(&self.pool)
        .await?;
        let fixtures = fixture_rows
            .iter()
            .map(|row| -> Result<FixtureStatus, StoreError> {
                Ok(FixtureStatus {
                    id: FixtureId::new(narrow(row, "fixtures", "id")?),
                    round,
                    home_team: TeamId::new(narrow(row, "fixtures", "home_team")?),
                    away_team: TeamId::new(narrow(row, "fixtures", "away_team")?),
                    kickoff: row.try_get::<Option<DateTime<Utc>>, _>("kickoff")?,
                    started: row.try_get("started")?,
                    finished: row.try_get("finished")?,
                    finished_provisional: row.try_get("finished_provisional")?,
                    bps: BTreeMap::new(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let record_rows = sqlx::query(
            r#"
            SELECT player, fixture, team, minutes,
                   goals_scored, assists, clean_sheets, goals_conceded, own_goals,
                   penalties_saved, penalties_missed, yellow_cards, red_cards, saves,
                   bps, base_points, bonus, provisional
            FROM performances
            WHERE round = ?
            ORDER BY player, fixture
            "#,
        )
        .bind(round_key)
        .fetch_all(&self.pool)
        .await?;
        let records = record_rows
            .iter()
            .map(|row| -> Result<PerformanceRecord, StoreError> {
                const TABLE: &str = "performances";
                Ok(PerformanceRecord {
                    player: PlayerId::new(narrow(row, TABLE, "player")?),
                    round,
                    fixture: FixtureId::new(narrow(row, TABLE, "fixture")?),
                    team: TeamId::new(narrow(row, TABLE, "team")?),
                    minutes: narrow(row, TABLE, "minutes")?,
                    goals_scored: narrow(row, TABLE, "goals_scored")?,
                    assists: narrow(row, TABLE, "assists")?,
                    clean_sheets: narrow(row, TABLE, "clean_sheets")?,
                    goals_conceded: narrow(row, TABLE, "goals_conceded")?,
                    own_goals: narrow(row, TABLE, "own_goals")?,
                    penalties_saved: narrow(row, TABLE, "penalties_saved")?,
                    penalties_missed: narrow(row, TABLE, "penalties_missed")?,
                    yellow_cards: narrow(row, TABLE, "yellow_cards")?,
                    red_cards: narrow(row, TABLE, "red_cards")?,
                    saves: narrow(row, TABLE, "saves")?,
                    bps: narrow(row, TABLE, "bps")?,
                    base_points: narrow(row, TABLE, "base_points")?,
                    bonus: narrow(row, TABLE, "bonus")?,
                    provisional: row.try_get("provisional")?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(RoundData::new(round, players, records, fixtures))
    }
}
