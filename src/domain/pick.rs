//! Squad picks, chips, and the per-manager pick set for a round.

use crate::domain::{ManagerId, PlayerId, RoundId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First bench slot; slots below it form the starting XI.
pub const FIRST_BENCH_SLOT: u8 = 12;
/// Number of picks in a full squad.
pub const SQUAD_SIZE: usize = 15;

/// Chip active for a manager in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chip {
    #[default]
    None,
    Wildcard,
    FreeHit,
    BenchBoost,
    TripleCaptain,
}

impl Chip {
    /// Chips that change how points are counted in the round they are played.
    pub fn is_scoring_boost(&self) -> bool {
        matches!(self, Chip::BenchBoost | Chip::TripleCaptain)
    }

    /// Multiplier applied to whoever wears the armband.
    pub fn captain_multiplier(&self) -> i32 {
        match self {
            Chip::TripleCaptain => 3,
            _ => 2,
        }
    }

    /// Parse the upstream chip code (`bboost`, `3xc`, `freehit`, `wildcard`).
    pub fn from_upstream(code: Option<&str>) -> Result<Self, ChipParseError> {
        match code {
            None | Some("") => Ok(Chip::None),
            Some("wildcard") => Ok(Chip::Wildcard),
            Some("freehit") => Ok(Chip::FreeHit),
            Some("bboost") => Ok(Chip::BenchBoost),
            Some("3xc") => Ok(Chip::TripleCaptain),
            Some(other) => Err(ChipParseError(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Chip::None => "none",
            Chip::Wildcard => "wildcard",
            Chip::FreeHit => "free_hit",
            Chip::BenchBoost => "bench_boost",
            Chip::TripleCaptain => "triple_captain",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chip: {0}")]
pub struct ChipParseError(pub String);

impl FromStr for Chip {
    type Err = ChipParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Chip::None),
            "wildcard" => Ok(Chip::Wildcard),
            "free_hit" => Ok(Chip::FreeHit),
            "bench_boost" => Ok(Chip::BenchBoost),
            "triple_captain" => Ok(Chip::TripleCaptain),
            other => Err(ChipParseError(other.to_string())),
        }
    }
}

/// One player in a manager's squad for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadPick {
    pub player: PlayerId,
    /// Squad slot 1..=15. 1..=11 start, 12..=15 are the bench in priority order.
    pub slot: u8,
    pub multiplier: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

impl SquadPick {
    pub fn new(player: PlayerId, slot: u8) -> Self {
        Self {
            player,
            slot,
            multiplier: if slot < FIRST_BENCH_SLOT { 1 } else { 0 },
            is_captain: false,
            is_vice_captain: false,
        }
    }

    pub fn captain(mut self) -> Self {
        self.is_captain = true;
        self.multiplier = 2;
        self
    }

    pub fn vice_captain(mut self) -> Self {
        self.is_vice_captain = true;
        self
    }

    pub fn with_multiplier(mut self, multiplier: u8) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Errors raised when a pick set breaks its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PicksError {
    #[error("expected 15 picks, got {0}")]
    WrongSquadSize(usize),
    #[error("slot {0} is outside 1..=15 or repeated")]
    BadSlot(u8),
    #[error("expected exactly one captain, found {0}")]
    CaptainCount(usize),
    #[error("expected exactly one vice-captain, found {0}")]
    ViceCaptainCount(usize),
    #[error("multiplier {0} is outside 0..=3")]
    BadMultiplier(u8),
}

/// A manager's complete pick set for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerPicks {
    pub manager: ManagerId,
    pub round: RoundId,
    /// Sorted by slot.
    pub picks: Vec<SquadPick>,
    pub chip: Chip,
    pub transfer_cost: u32,
    /// Net total reported upstream, when known. Used only for verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_total: Option<i32>,
}

impl ManagerPicks {
    /// Build and validate a pick set.
    pub fn new(
        manager: ManagerId,
        round: RoundId,
        mut picks: Vec<SquadPick>,
        chip: Chip,
        transfer_cost: u32,
    ) -> Result<Self, PicksError> {
        if picks.len() != SQUAD_SIZE {
            return Err(PicksError::WrongSquadSize(picks.len()));
        }
        picks.sort_by_key(|p| p.slot);
        for (expected, pick) in (1u8..).zip(&picks) {
            if pick.slot != expected {
                return Err(PicksError::BadSlot(pick.slot));
            }
            if pick.multiplier > 3 {
                return Err(PicksError::BadMultiplier(pick.multiplier));
            }
        }
        let captains = picks.iter().filter(|p| p.is_captain).count();
        if captains != 1 {
            return Err(PicksError::CaptainCount(captains));
        }
        let vices = picks.iter().filter(|p| p.is_vice_captain).count();
        if vices != 1 {
            return Err(PicksError::ViceCaptainCount(vices));
        }

        Ok(Self {
            manager,
            round,
            picks,
            chip,
            transfer_cost,
            official_total: None,
        })
    }

    pub fn with_official_total(mut self, total: i32) -> Self {
        self.official_total = Some(total);
        self
    }

    pub fn starters(&self) -> &[SquadPick] {
        &self.picks[..usize::from(FIRST_BENCH_SLOT - 1)]
    }

    pub fn bench(&self) -> &[SquadPick] {
        &self.picks[usize::from(FIRST_BENCH_SLOT - 1)..]
    }

    pub fn captain(&self) -> &SquadPick {
        // Validated in `new`.
        self.picks
            .iter()
            .find(|p| p.is_captain)
            .unwrap_or(&self.picks[0])
    }

    pub fn vice_captain(&self) -> &SquadPick {
        self.picks
            .iter()
            .find(|p| p.is_vice_captain)
            .unwrap_or(&self.picks[0])
    }
}
