pub mod health;
pub mod luck;
pub mod scores;

use crate::db::Repository;
use crate::domain::RoundId;
use crate::error::AppError;
use crate::orchestration::Reconciler;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    /// Checked by `/ready` when present.
    pub repo: Option<Arc<Repository>>,
}

impl AppState {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self {
            reconciler,
            repo: None,
        }
    }

    pub fn with_repository(mut self, repo: Arc<Repository>) -> Self {
        self.repo = Some(repo);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/teams/:manager/rounds/:round/score",
            get(scores::get_team_score),
        )
        .route(
            "/v1/leagues/:league/rounds/:round/scores",
            get(scores::get_league_scores),
        )
        .route(
            "/v1/leagues/:league/rounds/:round/luck",
            get(luck::get_round_luck),
        )
        .route("/v1/leagues/:league/luck", get(luck::get_season_luck))
        .layer(cors)
        .with_state(state)
}

fn parse_round(round: u32) -> Result<RoundId, AppError> {
    if round == 0 {
        return Err(AppError::BadRequest("round must be at least 1".to_string()));
    }
    Ok(RoundId::new(round))
}
