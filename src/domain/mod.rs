//! Domain types for head-to-head fantasy scoring.
//!
//! This module provides:
//! - Identifier newtypes and playing positions
//! - Performance records, squad picks, chips, and fixture state
//! - Per-round lookup maps built once per invocation
//! - Computed score and luck value objects

pub mod fixture;
pub mod luck;
pub mod performance;
pub mod pick;
pub mod primitives;
pub mod round;
pub mod score;

pub use fixture::{FixtureStatus, RoundStatus};
pub use luck::{H2hMatch, MatchResult, RoundLuck, SeasonLuck};
pub use performance::{PerformanceRecord, PlayerInfo};
pub use pick::{Chip, ChipParseError, ManagerPicks, PicksError, SquadPick};
pub use primitives::{FixtureId, LeagueId, ManagerId, PlayerId, Position, RoundId, TeamId};
pub use round::{PlayerRound, RoundData};
pub use score::{AutoSub, ScoreParts, TeamGameweekScore};
