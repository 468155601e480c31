//! Per-invocation lookup maps over one round's materialized data.

use crate::domain::{FixtureId, FixtureStatus, PerformanceRecord, PlayerId, PlayerInfo, RoundId, TeamId};
use std::collections::HashMap;

/// Everything the scoring engine needs to know about a round, indexed once.
///
/// Built per request from already-resolved inputs and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct RoundData {
    pub round: RoundId,
    players: HashMap<PlayerId, PlayerInfo>,
    performances: HashMap<PlayerId, Vec<PerformanceRecord>>,
    fixtures: HashMap<FixtureId, FixtureStatus>,
    team_fixtures: HashMap<TeamId, Vec<FixtureId>>,
}

/// What the engine knows about a player's round after aggregating fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRound {
    pub info: Option<PlayerInfo>,
    pub minutes: u32,
    pub points: i32,
    /// Every fixture the player's team has in the round is over.
    pub fixtures_over: bool,
    /// No performance record exists for the player.
    pub missing: bool,
}

impl PlayerRound {
    /// The player cannot score any more points this round and scored no minutes.
    pub fn did_not_play(&self) -> bool {
        self.minutes == 0 && self.fixtures_over
    }
}

impl RoundData {
    pub fn new(
        round: RoundId,
        players: impl IntoIterator<Item = PlayerInfo>,
        performances: impl IntoIterator<Item = PerformanceRecord>,
        fixtures: impl IntoIterator<Item = FixtureStatus>,
    ) -> Self {
        let players: HashMap<PlayerId, PlayerInfo> =
            players.into_iter().map(|p| (p.id, p)).collect();

        let mut by_player: HashMap<PlayerId, Vec<PerformanceRecord>> = HashMap::new();
        for record in performances {
            by_player.entry(record.player).or_default().push(record);
        }
        for records in by_player.values_mut() {
            records.sort_by_key(|r| r.fixture);
        }

        let mut fixtures_by_id = HashMap::new();
        let mut team_fixtures: HashMap<TeamId, Vec<FixtureId>> = HashMap::new();
        for fixture in fixtures {
            team_fixtures.entry(fixture.home_team).or_default().push(fixture.id);
            team_fixtures.entry(fixture.away_team).or_default().push(fixture.id);
            fixtures_by_id.insert(fixture.id, fixture);
        }

        Self {
            round,
            players,
            performances: by_player,
            fixtures: fixtures_by_id,
            team_fixtures,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.get(&id)
    }

    pub fn records(&self, id: PlayerId) -> &[PerformanceRecord] {
        self.performances.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&FixtureStatus> {
        self.fixtures.get(&id)
    }

    /// Fixtures sorted by id.
    pub fn fixtures(&self) -> Vec<&FixtureStatus> {
        let mut fixtures: Vec<_> = self.fixtures.values().collect();
        fixtures.sort_by_key(|f| f.id);
        fixtures
    }

    /// All records taking part in a fixture.
    pub fn fixture_records(&self, fixture: FixtureId) -> Vec<&PerformanceRecord> {
        let mut records: Vec<_> = self
            .performances
            .values()
            .flatten()
            .filter(|r| r.fixture == fixture)
            .collect();
        records.sort_by_key(|r| r.player);
        records
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut PerformanceRecord> + '_ {
        self.performances.values_mut().flatten()
    }

    /// Whether every fixture of the team in this round is over.
    ///
    /// A team without a fixture this round has nothing left to play.
    pub fn team_fixtures_over(&self, team: TeamId) -> bool {
        self.team_fixtures
            .get(&team)
            .map(|ids| {
                ids.iter()
                    .all(|id| self.fixtures.get(id).map(FixtureStatus::is_over).unwrap_or(true))
            })
            .unwrap_or(true)
    }

    /// Aggregate a player's records for the round.
    pub fn player_round(&self, id: PlayerId) -> PlayerRound {
        let info = self.players.get(&id).copied();
        let records = self.records(id);
        let minutes = records.iter().map(|r| u32::from(r.minutes)).sum();
        let points = records.iter().map(PerformanceRecord::points).sum();
        let team = info
            .map(|i| i.team)
            .or_else(|| records.first().map(|r| r.team));
        let fixtures_over = match team {
            Some(team) => self.team_fixtures_over(team),
            None => records.iter().all(|r| {
                self.fixtures
                    .get(&r.fixture)
                    .map(FixtureStatus::is_over)
                    .unwrap_or(true)
            }),
        };

        PlayerRound {
            info,
            minutes,
            points,
            fixtures_over,
            missing: records.is_empty(),
        }
    }
}
