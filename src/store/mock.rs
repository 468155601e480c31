//! In-memory round store for tests.

use super::{ChipLedger, RoundStore, StoreError};
use crate::domain::{H2hMatch, LeagueId, ManagerId, ManagerPicks, RoundData, RoundId};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct MockRoundStore {
    rounds: HashMap<RoundId, RoundData>,
    finalized: HashSet<RoundId>,
    picks: HashMap<(ManagerId, RoundId), ManagerPicks>,
    members: HashMap<LeagueId, BTreeSet<ManagerId>>,
    matches: Vec<H2hMatch>,
    unavailable: bool,
}

impl MockRoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a round and mark it finalized.
    pub fn with_final_round(mut self, data: RoundData) -> Self {
        self.finalized.insert(data.round);
        self.rounds.insert(data.round, data);
        self
    }

    pub fn with_picks(mut self, picks: ManagerPicks) -> Self {
        self.picks.insert((picks.manager, picks.round), picks);
        self
    }

    pub fn with_member(mut self, league: LeagueId, manager: ManagerId) -> Self {
        self.members.entry(league).or_default().insert(manager);
        self
    }

    /// Add a match; both managers become league members.
    pub fn with_match(self, m: H2hMatch) -> Self {
        let mut store = self
            .with_member(m.league, m.manager_a)
            .with_member(m.league, m.manager_b);
        store.matches.push(m);
        store
    }

    /// Every call fails as if the database were down.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("mock store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RoundStore for MockRoundStore {
    async fn load_round(&self, round: RoundId) -> Result<RoundData, StoreError> {
        self.check()?;
        Ok(self
            .rounds
            .get(&round)
            .cloned()
            .unwrap_or_else(|| RoundData::new(round, Vec::new(), Vec::new(), Vec::new())))
    }

    async fn load_picks(
        &self,
        manager: ManagerId,
        round: RoundId,
    ) -> Result<Option<ManagerPicks>, StoreError> {
        self.check()?;
        Ok(self.picks.get(&(manager, round)).cloned())
    }

    async fn is_round_finalized(&self, round: RoundId) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.finalized.contains(&round))
    }

    async fn league_members(&self, league: LeagueId) -> Result<Vec<ManagerId>, StoreError> {
        self.check()?;
        Ok(self
            .members
            .get(&league)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn league_matches(&self, league: LeagueId) -> Result<Vec<H2hMatch>, StoreError> {
        self.check()?;
        let mut matches: Vec<H2hMatch> = self
            .matches
            .iter()
            .filter(|m| m.league == league)
            .copied()
            .collect();
        matches.sort_by_key(|m| (m.round, m.manager_a));
        Ok(matches)
    }

    async fn league_chips(&self, league: LeagueId) -> Result<ChipLedger, StoreError> {
        self.check()?;
        let members = self.members.get(&league);
        Ok(self
            .picks
            .iter()
            .filter(|((manager, _), _)| members.map(|m| m.contains(manager)).unwrap_or(false))
            .map(|(key, picks)| (*key, picks.chip))
            .collect())
    }
}
