//! Mock live source for testing without network calls.

use super::{DataSourceError, LiveSource};
use crate::domain::{ManagerId, ManagerPicks, RoundData, RoundId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Live source that returns predefined rounds and picks.
#[derive(Debug, Clone, Default)]
pub struct MockLiveSource {
    rounds: HashMap<RoundId, RoundData>,
    picks: HashMap<(ManagerId, RoundId), ManagerPicks>,
    failing_managers: HashSet<ManagerId>,
}

impl MockLiveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_round(mut self, data: RoundData) -> Self {
        self.rounds.insert(data.round, data);
        self
    }

    pub fn with_picks(mut self, picks: ManagerPicks) -> Self {
        self.picks.insert((picks.manager, picks.round), picks);
        self
    }

    /// Make `fetch_picks` fail with a network error for this manager.
    pub fn with_failing_manager(mut self, manager: ManagerId) -> Self {
        self.failing_managers.insert(manager);
        self
    }
}

#[async_trait]
impl LiveSource for MockLiveSource {
    /// Unknown rounds come back empty, as an upstream would before kickoff.
    async fn fetch_live_round(&self, round: RoundId) -> Result<RoundData, DataSourceError> {
        Ok(self
            .rounds
            .get(&round)
            .cloned()
            .unwrap_or_else(|| RoundData::new(round, Vec::new(), Vec::new(), Vec::new())))
    }

    async fn fetch_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, DataSourceError> {
        if self.failing_managers.contains(&manager) {
            return Err(DataSourceError::NetworkError(format!(
                "connection reset fetching manager {}",
                manager
            )));
        }
        Ok(self.picks.get(&(manager, round)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chip, PlayerId, SquadPick};

    fn picks(manager: u32, round: u32) -> ManagerPicks {
        let picks = (1..=15u8)
            .map(|slot| {
                let pick = SquadPick::new(PlayerId::new(u32::from(slot)), slot);
                match slot {
                    1 => pick.captain(),
                    2 => pick.vice_captain(),
                    _ => pick,
                }
            })
            .collect();
        ManagerPicks::new(ManagerId::new(manager), RoundId::new(round), picks, Chip::None, 0)
            .unwrap()
    }

    #[test]
    fn test_mock_fetch_picks() {
        let mock = MockLiveSource::new().with_picks(picks(1, 3));
        let found = tokio_test::block_on(mock.fetch_picks(ManagerId::new(1), RoundId::new(3)));
        assert_eq!(found.unwrap(), Some(picks(1, 3)));

        let other_round = tokio_test::block_on(mock.fetch_picks(ManagerId::new(1), RoundId::new(4)));
        assert_eq!(other_round.unwrap(), None);
    }

    #[test]
    fn test_mock_failing_manager() {
        let mock = MockLiveSource::new()
            .with_picks(picks(1, 3))
            .with_failing_manager(ManagerId::new(1));
        let result = tokio_test::block_on(mock.fetch_picks(ManagerId::new(1), RoundId::new(3)));
        assert!(matches!(result, Err(DataSourceError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_mock_unknown_round_is_empty() {
        let mock = MockLiveSource::new();
        let data = mock.fetch_live_round(RoundId::new(9)).await.unwrap();
        assert_eq!(data.round, RoundId::new(9));
        assert!(data.fixtures().is_empty());
    }
}
