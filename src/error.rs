use crate::orchestration::ScoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// The score or luck was computed but failed a correctness check.
    #[error("Computed but inconsistent: {0}")]
    Inconsistent(String),
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::MissingPicks { .. } => AppError::NotFound(err.to_string()),
            ScoreError::InvalidPicks(_) => AppError::Internal(err.to_string()),
            ScoreError::Source(_) => AppError::Upstream(err.to_string()),
            ScoreError::Store(_) => AppError::Internal(err.to_string()),
            ScoreError::Invariant(_) => AppError::Inconsistent(err.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Inconsistent(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(self) -> String {
        match self {
            AppError::Internal(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Inconsistent(msg)
            | AppError::Upstream(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.message(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ManagerId, RoundId};
    use crate::engine::{InvariantViolation, ZeroSumComponent};

    #[test]
    fn test_missing_picks_is_not_found() {
        let err = AppError::from(ScoreError::MissingPicks {
            manager: ManagerId::new(1),
            round: RoundId::new(2),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("not yet available"));
    }

    #[test]
    fn test_invariant_violation_is_conflict() {
        let err = AppError::from(ScoreError::Invariant(InvariantViolation::ZeroSum {
            component: ZeroSumComponent::Variance,
            scope: "league 4 round 1".to_string(),
            sum: 0.5,
        }));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_source_failure_is_bad_gateway() {
        let err = AppError::from(ScoreError::Source(
            crate::datasource::DataSourceError::RateLimited,
        ));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
