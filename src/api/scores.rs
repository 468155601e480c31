use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{parse_round, AppState};
use crate::domain::{LeagueId, ManagerId, TeamGameweekScore};
use crate::error::AppError;
use crate::orchestration::LeagueScore;

pub async fn get_team_score(
    Path((manager, round)): Path<(u32, u32)>,
    State(state): State<AppState>,
) -> Result<Json<TeamGameweekScore>, AppError> {
    let round = parse_round(round)?;
    let score = state
        .reconciler
        .score_team(ManagerId::new(manager), round)
        .await?;
    Ok(Json(score))
}

/// One manager's entry in a league response: a score or the reason there is none.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueScoreEntry {
    pub manager: ManagerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<TeamGameweekScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<LeagueScore> for LeagueScoreEntry {
    fn from(entry: LeagueScore) -> Self {
        match entry.result {
            Ok(score) => LeagueScoreEntry {
                manager: entry.manager,
                score: Some(score),
                error: None,
            },
            Err(e) => LeagueScoreEntry {
                manager: entry.manager,
                score: None,
                error: Some(e.to_string()),
            },
        }
    }
}

pub async fn get_league_scores(
    Path((league, round)): Path<(u32, u32)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LeagueScoreEntry>>, AppError> {
    let round = parse_round(round)?;
    let scores = state
        .reconciler
        .score_league_round(LeagueId::new(league), round)
        .await?;
    Ok(Json(scores.into_iter().map(LeagueScoreEntry::from).collect()))
}
