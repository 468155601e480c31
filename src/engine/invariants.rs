//! Standing correctness checks. Violations are reported, never corrected.

use crate::domain::{ManagerId, RoundId, TeamGameweekScore};
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Largest allowed absolute sum for a zero-sum luck component.
pub const ZERO_SUM_TOLERANCE: f64 = 0.01;

/// Luck components constrained to sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroSumComponent {
    Variance,
    Schedule,
    Chip,
}

impl fmt::Display for ZeroSumComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroSumComponent::Variance => write!(f, "variance"),
            ZeroSumComponent::Schedule => write!(f, "schedule"),
            ZeroSumComponent::Chip => write!(f, "chip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("{component} luck sums to {sum:.4} over {scope}, expected 0")]
    ZeroSum {
        component: ZeroSumComponent,
        scope: String,
        sum: f64,
    },
    #[error("manager {manager} round {round}: computed net total {computed}, official total {official}")]
    OfficialMismatch {
        manager: ManagerId,
        round: RoundId,
        computed: i32,
        official: i32,
    },
    #[error("manager {manager} round {round}: score breakdown does not add up")]
    Breakdown { manager: ManagerId, round: RoundId },
}

/// Check that `values` sum to zero within [`ZERO_SUM_TOLERANCE`].
pub fn check_zero_sum<I>(
    component: ZeroSumComponent,
    scope: impl Into<String>,
    values: I,
) -> Result<(), InvariantViolation>
where
    I: IntoIterator<Item = f64>,
{
    let sum: f64 = values.into_iter().sum();
    if sum.is_finite() && sum.abs() <= ZERO_SUM_TOLERANCE {
        return Ok(());
    }
    let violation = InvariantViolation::ZeroSum {
        component,
        scope: scope.into(),
        sum,
    };
    error!(%violation, "zero-sum invariant violated");
    Err(violation)
}

/// Check the additive identities of a score breakdown.
pub fn check_breakdown(score: &TeamGameweekScore) -> Result<(), InvariantViolation> {
    let gross = score.starting_xi_total
        + score.captain_bonus
        + score.bench_boost_total
        + score.auto_sub_total;
    let subs: i32 = score.auto_subs.iter().map(|s| s.points_gained).sum();
    if gross == score.gross_total
        && score.net_total == score.gross_total - score.transfer_cost
        && subs == score.auto_sub_total
    {
        return Ok(());
    }
    let violation = InvariantViolation::Breakdown {
        manager: score.manager,
        round: score.round,
    };
    error!(%violation, "score breakdown invariant violated");
    Err(violation)
}

/// Compare a computed score against the independently reported official total.
pub fn verify_official_total(
    score: &TeamGameweekScore,
    official: i32,
) -> Result<(), InvariantViolation> {
    if score.net_total == official {
        return Ok(());
    }
    let violation = InvariantViolation::OfficialMismatch {
        manager: score.manager,
        round: score.round,
        computed: score.net_total,
        official,
    };
    error!(%violation, "computed score disagrees with official total");
    Err(violation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chip, RoundStatus, ScoreParts};

    fn score(net_parts: (i32, i32)) -> TeamGameweekScore {
        TeamGameweekScore::assemble(
            ManagerId::new(3),
            RoundId::new(9),
            Chip::None,
            RoundStatus::Completed,
            ScoreParts {
                starting_xi_total: net_parts.0,
                transfer_cost: net_parts.1,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_zero_sum_within_tolerance() {
        assert!(check_zero_sum(ZeroSumComponent::Variance, "league 1", [1.5, -1.495]).is_ok());
    }

    #[test]
    fn test_zero_sum_outside_tolerance() {
        let err = check_zero_sum(ZeroSumComponent::Chip, "league 1", [1.0, -0.9]).unwrap_err();
        match err {
            InvariantViolation::ZeroSum { component, sum, .. } => {
                assert_eq!(component, ZeroSumComponent::Chip);
                assert!((sum - 0.1).abs() < 1e-9);
            }
            other => panic!("unexpected violation: {other}"),
        }
    }

    #[test]
    fn test_zero_sum_rejects_nan() {
        assert!(check_zero_sum(ZeroSumComponent::Schedule, "x", [f64::NAN]).is_err());
    }

    #[test]
    fn test_official_total_match() {
        assert!(verify_official_total(&score((60, 4)), 56).is_ok());
    }

    #[test]
    fn test_official_total_mismatch_is_reported_not_fixed() {
        let s = score((60, 4));
        let err = verify_official_total(&s, 57).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::OfficialMismatch {
                manager: ManagerId::new(3),
                round: RoundId::new(9),
                computed: 56,
                official: 57,
            }
        );
        assert_eq!(s.net_total, 56);
    }

    #[test]
    fn test_breakdown_detects_tampering() {
        let mut s = score((60, 4));
        assert!(check_breakdown(&s).is_ok());
        s.gross_total += 1;
        assert!(check_breakdown(&s).is_err());
    }
}
