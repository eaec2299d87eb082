//! Nearest-rank percentile estimator.
//!
//! The rank is selected with a ceiling, never interpolated: the result is always a member of
//! the input sample. This is deliberately not the linear interpolation used by most numeric
//! libraries, and the two must not be substituted for one another.

use crate::error::LevelError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nearest-rank percentile of `values` at percentile `percentile` (expressed 0..=100).
///
/// ```text
/// index = max(0, ceil((p / 100) * len) - 1)
/// ```
///
/// An empty sample returns `0.0` by convention. Values are sorted with a stable ascending sort in
/// IEEE total order, so the sort never panics and a positive `NaN` sorts after every number.
pub fn percentile_nearest_rank(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = values
        .iter()
        .copied()
        .sorted_by(f64::total_cmp)
        .collect::<Vec<_>>();

    let rank = ((percentile / 100.0) * sorted.len() as f64).ceil() as i64 - 1;
    let index = (rank.max(0) as usize).min(sorted.len() - 1);

    sorted[index]
}

/// Validated percentile tier within `(0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PercentileTier(f64);

impl PercentileTier {
    pub const P50: Self = Self(50.0);
    pub const P75: Self = Self(75.0);
    pub const P90: Self = Self(90.0);

    /// Tiers used when the caller does not supply its own.
    pub const DEFAULT: [Self; 3] = [Self::P50, Self::P75, Self::P90];

    pub fn new(percentile: f64) -> Result<Self, LevelError> {
        if percentile > 0.0 && percentile <= 100.0 {
            Ok(Self(percentile))
        } else {
            Err(LevelError::InvalidPercentile(percentile))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// [`percentile_nearest_rank`] of `values` at this tier.
    pub fn of(&self, values: &[f64]) -> f64 {
        percentile_nearest_rank(values, self.0)
    }
}

impl TryFrom<f64> for PercentileTier {
    type Error = LevelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PercentileTier> for f64 {
    fn from(value: PercentileTier) -> Self {
        value.0
    }
}

impl fmt::Display for PercentileTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_percentile_nearest_rank() {
        struct TestCase {
            values: Vec<f64>,
            percentile: f64,
            expected: f64,
        }

        let one_to_ten = (1..=10_i32).map(f64::from).collect::<Vec<_>>();

        let tests = vec![
            TestCase {
                // TC0: empty sample returns zero by convention
                values: vec![],
                percentile: 50.0,
                expected: 0.0,
            },
            TestCase {
                // TC1: ceil(0.5 * 10) - 1 = 4
                values: one_to_ten.clone(),
                percentile: 50.0,
                expected: 5.0,
            },
            TestCase {
                // TC2: ceil(0.9 * 10) - 1 = 8
                values: one_to_ten.clone(),
                percentile: 90.0,
                expected: 9.0,
            },
            TestCase {
                // TC3: ceil(0.75 * 10) - 1 = 7
                values: one_to_ten.clone(),
                percentile: 75.0,
                expected: 8.0,
            },
            TestCase {
                // TC4: p100 selects the maximum
                values: one_to_ten.clone(),
                percentile: 100.0,
                expected: 10.0,
            },
            TestCase {
                // TC5: tiny p clamps the rank to the minimum
                values: one_to_ten,
                percentile: 0.001,
                expected: 1.0,
            },
            TestCase {
                // TC6: unsorted input is sorted before ranking
                values: vec![5.0, 8.0, 3.0],
                percentile: 50.0,
                expected: 5.0,
            },
            TestCase {
                // TC7: signed sample, ceil(0.5 * 3) - 1 = 1
                values: vec![2.0, -1.0, 1.0],
                percentile: 50.0,
                expected: 1.0,
            },
            TestCase {
                // TC8: nearest rank, not linear interpolation (which would give 2.5)
                values: vec![1.0, 2.0, 3.0, 4.0],
                percentile: 50.0,
                expected: 2.0,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = percentile_nearest_rank(&test.values, test.percentile);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_percentile_does_not_mutate_input() {
        let values = vec![3.0, 1.0, 2.0];
        let _ = percentile_nearest_rank(&values, 90.0);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_percentile_with_nan_sorts_nan_last() {
        let values = (0..40_i32)
            .map(|i| if i % 3 == 0 { f64::NAN } else { f64::from(i) })
            .collect::<Vec<_>>();

        // 14 NaN sort after the 26 finite values, ceil(0.5 * 40) - 1 = 19
        assert_eq!(percentile_nearest_rank(&values, 50.0), 29.0);
        assert_eq!(percentile_nearest_rank(&values, 0.001), 1.0);
        assert!(percentile_nearest_rank(&values, 100.0).is_nan());
    }

    #[test]
    fn test_percentile_tier_new() {
        assert_eq!(PercentileTier::new(50.0), Ok(PercentileTier::P50));
        assert!(PercentileTier::new(100.0).is_ok());
        assert_eq!(
            PercentileTier::new(0.0),
            Err(LevelError::InvalidPercentile(0.0))
        );
        assert_eq!(
            PercentileTier::new(100.5),
            Err(LevelError::InvalidPercentile(100.5))
        );
        assert!(PercentileTier::new(f64::NAN).is_err());
    }

    #[test]
    fn test_percentile_tier_display() {
        assert_eq!(PercentileTier::P50.to_string(), "P50");
        assert_eq!(PercentileTier::P90.to_string(), "P90");
        assert_eq!(PercentileTier::new(97.5).unwrap().to_string(), "P97.5");
    }

    #[test]
    fn test_percentile_tier_de_rejects_out_of_range() {
        assert!(serde_json::from_str::<PercentileTier>("75").is_ok());
        assert!(serde_json::from_str::<PercentileTier>("0").is_err());
        assert!(serde_json::from_str::<PercentileTier>("150").is_err());
    }

    proptest! {
        #[test]
        fn prop_result_is_member_of_sample(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200),
            percentile in 0.001f64..=100.0,
        ) {
            let actual = percentile_nearest_rank(&values, percentile);
            prop_assert!(values.contains(&actual));
        }

        #[test]
        fn prop_single_value_resolves_to_itself(
            value in -1.0e6f64..1.0e6,
            percentile in 0.001f64..=100.0,
        ) {
            prop_assert_eq!(percentile_nearest_rank(&[value], percentile), value);
        }

        #[test]
        fn prop_empty_sample_is_zero(percentile in 0.001f64..=100.0) {
            prop_assert_eq!(percentile_nearest_rank(&[], percentile), 0.0);
        }

        #[test]
        fn prop_monotonic_in_percentile(
            values in prop::collection::btree_set(-100_000i64..100_000, 1..200),
            p1 in 0.001f64..=100.0,
            p2 in 0.001f64..=100.0,
        ) {
            let values = values.into_iter().map(|v| v as f64).collect::<Vec<_>>();
            let (low, high) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
            prop_assert!(
                percentile_nearest_rank(&values, low) <= percentile_nearest_rank(&values, high)
            );
        }
    }
}
