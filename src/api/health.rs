use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::api::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the round store answers queries.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if let Some(repo) = &state.repo {
        if let Err(e) = repo.ping().await {
            warn!(error = %e, "Round store not ready");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            );
        }
    }
    (StatusCode::OK, Json(serde_json::json!({"status": "ready"})))
}
