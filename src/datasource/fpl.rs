//! FPL-style public API client.
//!
//! HTTP is kept to `get_json`; everything else is pure mapping from the
//! upstream payloads into domain types.

use super::{DataSourceError, LiveSource};
use crate::domain::{
    Chip, FixtureId, FixtureStatus, ManagerId, ManagerPicks, PerformanceRecord, PlayerId,
    PlayerInfo, Position, RoundData, RoundId, SquadPick, TeamId,
};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";

#[derive(Debug, Clone)]
pub struct FplLiveSource {
    client: Client,
    base_url: String,
}

impl FplLiveSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET a JSON document, retrying transient failures.
    ///
    /// Returns `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, DataSourceError> {
        let url = format!("{}/{}", self.base_url, path);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response.json::<T>().await.map(Some).map_err(|e| {
                backoff::Error::permanent(DataSourceError::ParseError(e.to_string()))
            })
        })
        .await
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str) -> Result<T, DataSourceError> {
        self.get_json(path).await?.ok_or_else(|| DataSourceError::HttpError {
            status: 404,
            message: format!("{} not found", path),
        })
    }
}

#[async_trait]
impl LiveSource for FplLiveSource {
    async fn fetch_live_round(&self, round: RoundId) -> Result<RoundData, DataSourceError> {
        debug!(round = %round, "Fetching live round");

        let bootstrap_path = "bootstrap-static/".to_string();
        let fixtures_path = format!("fixtures/?event={}", round);
        let live_path = format!("event/{}/live/", round);
        let (bootstrap, fixtures, live) = futures::try_join!(
            self.get_required::<BootstrapResponse>(&bootstrap_path),
            self.get_required::<Vec<RawFixture>>(&fixtures_path),
            self.get_required::<LiveResponse>(&live_path),
        )?;

        let players = parse_players(&bootstrap);
        let fixtures = parse_fixtures(round, &fixtures);
        let records = parse_live(round, &live, &players, &fixtures);
        debug!(
            round = %round,
            players = players.len(),
            fixtures = fixtures.len(),
            records = records.len(),
            "Mapped live round"
        );

        Ok(RoundData::new(
            round,
            players.into_values(),
            records,
            fixtures.into_values(),
        ))
    }

    async fn fetch_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, DataSourceError> {
        debug!(manager = %manager, round = %round, "Fetching picks");
        let path = format!("entry/{}/event/{}/picks/", manager, round);
        match self.get_json::<PicksResponse>(&path).await? {
            Some(raw) => parse_picks(manager, round, &raw).map(Some),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Upstream payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapResponse {
    pub elements: Vec<RawElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    pub id: u32,
    pub team: u32,
    pub element_type: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFixture {
    pub id: u32,
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started: Option<bool>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub finished_provisional: bool,
    #[serde(default)]
    pub stats: Vec<RawFixtureStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFixtureStat {
    pub identifier: String,
    #[serde(default)]
    pub a: Vec<RawStatValue>,
    #[serde(default)]
    pub h: Vec<RawStatValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatValue {
    pub value: i32,
    pub element: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveResponse {
    pub elements: Vec<RawLiveElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLiveElement {
    pub id: u32,
    #[serde(default)]
    pub explain: Vec<RawExplain>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawExplain {
    pub fixture: u32,
    #[serde(default)]
    pub stats: Vec<RawExplainStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawExplainStat {
    pub identifier: String,
    pub points: i32,
    pub value: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PicksResponse {
    pub active_chip: Option<String>,
    #[serde(default)]
    pub automatic_subs: Vec<RawAutomaticSub>,
    pub entry_history: RawEntryHistory,
    pub picks: Vec<RawPick>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntryHistory {
    /// Round points before the transfer cost is deducted.
    pub points: Option<i32>,
    #[serde(default)]
    pub event_transfers_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAutomaticSub {
    pub element_in: u32,
    pub element_out: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPick {
    pub element: u32,
    pub position: u8,
    pub multiplier: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

// ============================================================================
// Mapping
// ============================================================================

/// Player id → team and position. Elements with an unknown position are skipped.
pub fn parse_players(bootstrap: &BootstrapResponse) -> HashMap<PlayerId, PlayerInfo> {
    bootstrap
        .elements
        .iter()
        .filter_map(|e| match Position::from_element_type(e.element_type) {
            Some(position) => Some((
                PlayerId::new(e.id),
                PlayerInfo::new(PlayerId::new(e.id), TeamId::new(e.team), position),
            )),
            None => {
                warn!(player = e.id, element_type = e.element_type, "Skipping element with unknown position");
                None
            }
        })
        .collect()
}

/// Fixture id → status for the fixtures scheduled in `round`.
pub fn parse_fixtures(round: RoundId, raw: &[RawFixture]) -> HashMap<FixtureId, FixtureStatus> {
    raw.iter()
        .filter(|f| f.event == Some(round.as_u32()))
        .map(|f| {
            let bps: BTreeMap<PlayerId, i32> = f
                .stats
                .iter()
                .filter(|s| s.identifier == "bps")
                .flat_map(|s| s.h.iter().chain(s.a.iter()))
                .map(|v| (PlayerId::new(v.element), v.value))
                .collect();
            let status = FixtureStatus {
                id: FixtureId::new(f.id),
                round,
                home_team: TeamId::new(f.team_h),
                away_team: TeamId::new(f.team_a),
                kickoff: f.kickoff_time,
                started: f.started.unwrap_or(false) || f.finished_provisional || f.finished,
                finished: f.finished,
                finished_provisional: f.finished_provisional || f.finished,
                bps,
            };
            (status.id, status)
        })
        .collect()
}

/// One performance record per (player, fixture) explain block.
///
/// `base_points` sums every explained stat except bonus. Bonus from the
/// explain block is only trusted once the fixture is finished; before that the
/// record is provisional with zero bonus. Players or fixtures the round does not
/// know about are skipped.
pub fn parse_live(
    round: RoundId,
    live: &LiveResponse,
    players: &HashMap<PlayerId, PlayerInfo>,
    fixtures: &HashMap<FixtureId, FixtureStatus>,
) -> Vec<PerformanceRecord> {
    let mut records = Vec::new();
    for element in &live.elements {
        let player = PlayerId::new(element.id);
        let Some(info) = players.get(&player) else {
            if !element.explain.is_empty() {
                warn!(player = element.id, "Skipping live element without player info");
            }
            continue;
        };
        for explain in &element.explain {
            let fixture_id = FixtureId::new(explain.fixture);
            let Some(fixture) = fixtures.get(&fixture_id) else {
                warn!(player = element.id, fixture = explain.fixture, "Skipping explain for unknown fixture");
                continue;
            };
            records.push(explain_record(round, info, fixture, explain));
        }
    }
    records
}

fn explain_record(
    round: RoundId,
    info: &PlayerInfo,
    fixture: &FixtureStatus,
    explain: &RawExplain,
) -> PerformanceRecord {
    let value = |id: &str| -> i32 {
        explain
            .stats
            .iter()
            .filter(|s| s.identifier == id)
            .map(|s| s.value)
            .sum()
    };
    let count = |id: &str| -> u8 { u8::try_from(value(id).max(0)).unwrap_or(u8::MAX) };

    let base_points: i32 = explain
        .stats
        .iter()
        .filter(|s| s.identifier != "bonus")
        .map(|s| s.points)
        .sum();
    let minutes = u16::try_from(value("minutes").max(0)).unwrap_or(u16::MAX);
    let bps = fixture
        .bps
        .get(&info.id)
        .copied()
        .unwrap_or_else(|| value("bps"));

    let mut record = PerformanceRecord::new(info.id, round, fixture.id, info.team, minutes, base_points)
        .with_bps(bps);
    record.goals_scored = count("goals_scored");
    record.assists = count("assists");
    record.clean_sheets = count("clean_sheets");
    record.goals_conceded = count("goals_conceded");
    record.own_goals = count("own_goals");
    record.penalties_saved = count("penalties_saved");
    record.penalties_missed = count("penalties_missed");
    record.yellow_cards = count("yellow_cards");
    record.red_cards = count("red_cards");
    record.saves = count("saves");

    if fixture.finished {
        record.with_bonus(count("bonus"))
    } else {
        record.provisional()
    }
}

/// Map an upstream picks document. The official total is the round points
/// net of the transfer cost.
///
/// Upstream multipliers already reflect processed automatic substitutions, so
/// they are ignored: multipliers are rebuilt from slot and armband as picked,
/// and substitutions are left to the engine.
pub fn parse_picks(
    manager: ManagerId,
    round: RoundId,
    raw: &PicksResponse,
) -> Result<ManagerPicks, DataSourceError> {
    let chip = Chip::from_upstream(raw.active_chip.as_deref())
        .map_err(|e| DataSourceError::ParseError(e.to_string()))?;
    let picks = raw
        .picks
        .iter()
        .map(|p| {
            let mut pick = SquadPick::new(PlayerId::new(p.element), p.position);
            if p.is_captain {
                pick = pick.captain();
                if chip == Chip::TripleCaptain {
                    pick = pick.with_multiplier(3);
                }
            }
            if p.is_vice_captain {
                pick = pick.vice_captain();
            }
            pick
        })
        .collect();
    if !raw.automatic_subs.is_empty() {
        let upstream_subs: Vec<(u32, u32)> = raw
            .automatic_subs
            .iter()
            .map(|s| (s.element_out, s.element_in))
            .collect();
        debug!(
            manager = %manager,
            round = %round,
            ?upstream_subs,
            "Ignoring upstream automatic substitutions"
        );
    }
    let cost = raw.entry_history.event_transfers_cost;
    let picks = ManagerPicks::new(manager, round, picks, chip, cost)
        .map_err(|e| DataSourceError::ParseError(format!("manager {}: {}", manager, e)))?;

    Ok(match raw.entry_history.points {
        Some(points) => {
            picks.with_official_total(points - i32::try_from(cost).unwrap_or(i32::MAX))
        }
        None => picks,
    })
}
