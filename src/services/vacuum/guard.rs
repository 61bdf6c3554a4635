// SPDX-License-Identifier: MIT

use crate::common::constants::{MAX_DUST_VALUE_USD, MIN_DUST_VALUE_USD};
use crate::domain::error::{VacuumError, ValuationBound};

/// Bounds-checks caller-supplied USD valuations before anything leaves
/// the process. Purely local and synchronous: a rejected run performs
/// zero network or ledger calls.
///
/// The valuation itself is client-estimated, not ledger-verified; the
/// aggregate cap is the only thing limiting an inflated claim.
#[derive(Debug, Clone, Copy)]
pub struct PriceValidationGuard {
    pub min_usd: f64,
    pub max_usd: f64,
}

impl Default for PriceValidationGuard {
    fn default() -> Self {
        Self {
            min_usd: MIN_DUST_VALUE_USD,
            max_usd: MAX_DUST_VALUE_USD,
        }
    }
}

impl PriceValidationGuard {
    pub fn new(min_usd: f64, max_usd: f64) -> Self {
        Self { min_usd, max_usd }
    }

    /// Rejects when any single valuation sits below the floor or the
    /// run's aggregate exceeds the cap.
    pub fn validate(&self, valuations_usd: &[f64]) -> Result<(), VacuumError> {
        for &value in valuations_usd {
            if value < self.min_usd {
                return Err(VacuumError::ValuationOutOfBounds {
                    value_usd: value,
                    bound: ValuationBound::Minimum,
                    limit: self.min_usd,
                });
            }
        }
        let aggregate: f64 = valuations_usd.iter().sum();
        if aggregate > self.max_usd {
            return Err(VacuumError::ValuationOutOfBounds {
                value_usd: aggregate,
                bound: ValuationBound::Aggregate,
                limit: self.max_usd,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valuations_inside_the_window() {
        let guard = PriceValidationGuard::default();
        assert!(guard.validate(&[0.05, 1.2, 42.0]).is_ok());
        assert!(guard.validate(&[]).is_ok());
    }

    #[test]
    fn rejects_single_value_below_floor() {
        let guard = PriceValidationGuard::default();
        let err = guard.validate(&[0.5, 0.0001]).unwrap_err();
        match err {
            VacuumError::ValuationOutOfBounds { value_usd, bound, limit } => {
                assert_eq!(value_usd, 0.0001);
                assert_eq!(bound, ValuationBound::Minimum);
                assert_eq!(limit, MIN_DUST_VALUE_USD);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_aggregate_above_cap() {
        let guard = PriceValidationGuard::default();
        let err = guard.validate(&[60.0, 55.0]).unwrap_err();
        match err {
            VacuumError::ValuationOutOfBounds { value_usd, bound, limit } => {
                assert_eq!(value_usd, 115.0);
                assert_eq!(bound, ValuationBound::Aggregate);
                assert_eq!(limit, MAX_DUST_VALUE_USD);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_oversized_donation_violates_aggregate() {
        // Scenario: one asset claimed at $150 against a $100 cap.
        let guard = PriceValidationGuard::default();
        assert!(guard.validate(&[150.0]).is_err());
    }
}
