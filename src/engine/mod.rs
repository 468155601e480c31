//! Pure scoring and luck computation. Nothing here performs I/O.

pub mod bonus;
pub mod invariants;
pub mod luck;
pub mod substitution;
pub mod team_score;

pub use bonus::{BonusEngine, BonusPolicy, BpsEntry};
pub use invariants::{
    check_breakdown, check_zero_sum, verify_official_total, InvariantViolation, ZeroSumComponent,
    ZERO_SUM_TOLERANCE,
};
pub use luck::{LuckDecomposer, SeasonAverage};
pub use substitution::{Formation, PositionCounts, SubstitutionEngine, SubstitutionOutcome};
pub use team_score::TeamScoreCalculator;
