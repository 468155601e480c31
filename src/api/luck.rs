use axum::extract::{Path, State};
use axum::Json;

use crate::api::{parse_round, AppState};
use crate::domain::{LeagueId, RoundLuck, SeasonLuck};
use crate::error::AppError;

pub async fn get_round_luck(
    Path((league, round)): Path<(u32, u32)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RoundLuck>>, AppError> {
    let round = parse_round(round)?;
    let luck = state
        .reconciler
        .round_luck(LeagueId::new(league), round)
        .await?;
    Ok(Json(luck))
}

pub async fn get_season_luck(
    Path(league): Path<u32>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SeasonLuck>>, AppError> {
    let luck = state.reconciler.season_luck(LeagueId::new(league)).await?;
    Ok(Json(luck))
}
