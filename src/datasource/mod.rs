//! Live data source abstraction for rounds that are not yet finalized.

use crate::domain::{ManagerId, ManagerPicks, RoundData, RoundId};
use async_trait::async_trait;
use std::fmt;

pub mod fpl;
pub mod mock;

pub use fpl::FplLiveSource;
pub use mock::MockLiveSource;

/// Source of live round data and picks.
///
/// Implementations handle retry/backoff themselves and map upstream payloads
/// into domain types before returning.
#[async_trait]
pub trait LiveSource: Send + Sync + fmt::Debug {
    /// Fetch player info, performance records, and fixture state for a round.
    ///
    /// Performance records carry whatever bonus the upstream has confirmed;
    /// records of unconfirmed fixtures are marked provisional.
    async fn fetch_live_round(&self, round: RoundId) -> Result<RoundData, DataSourceError>;

    /// Fetch a manager's picks for a round.
    ///
    /// # Returns
    /// `None` when the upstream has no picks for the manager yet.
    async fn fetch_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// Non-success HTTP status
    HttpError { status: u16, message: String },
    /// Invalid JSON or a payload that cannot be mapped into domain types
    ParseError(String),
    /// Rate limit exceeded after retries
    RateLimited,
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasource_error_display() {
        let err = DataSourceError::NetworkError("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = DataSourceError::HttpError {
            status: 503,
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 503: Server error");

        let err = DataSourceError::ParseError("unknown chip: 5xc".to_string());
        assert_eq!(err.to_string(), "Parse error: unknown chip: 5xc");

        assert_eq!(DataSourceError::RateLimited.to_string(), "Rate limited");
    }
}
