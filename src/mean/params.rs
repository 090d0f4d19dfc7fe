//! Frozen aggregation parameters and their validation.

use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, Result};

/// Validated parameters of a bounded-mean aggregation, frozen at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanParams {
    /// Privacy budget ε, split evenly between the sum and count releases
    pub epsilon: f64,
    /// Privacy parameter δ; absent for pure-ε mechanisms
    pub delta: Option<f64>,
    /// Lower clamping bound for input values
    pub lower: f64,
    /// Upper clamping bound for input values
    pub upper: f64,
    /// L₀ bound: partitions a single user may contribute to
    pub max_partitions_contributed: i32,
    /// L∞ bound: contributions a single user may make to one partition
    pub max_contributions_per_partition: i32,
}

impl MeanParams {
    /// Midpoint of the clamping range
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Width of the clamping range
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// L∞ sensitivity of the normalized sum: each clamped, normalized
    /// entry lies in [-range/2, range/2] and one user adds at most
    /// `max_contributions_per_partition` of them per partition.
    pub(crate) fn sum_sensitivity(&self) -> f64 {
        f64::from(self.max_contributions_per_partition) * self.range() / 2.0
    }

    /// L∞ sensitivity of the count
    pub(crate) fn count_sensitivity(&self) -> i64 {
        i64::from(self.max_contributions_per_partition)
    }

    /// Per-subquery share of ε
    pub(crate) fn split_epsilon(&self) -> f64 {
        self.epsilon / 2.0
    }

    /// Per-subquery share of δ
    pub(crate) fn split_delta(&self) -> Option<f64> {
        self.delta.map(|d| d / 2.0)
    }
}

pub(crate) fn validate_epsilon(epsilon: f64) -> Result<()> {
    if !epsilon.is_finite() {
        return Err(AggregationError::InvalidParameter {
            field: "epsilon",
            reason: format!("must be finite, got {epsilon}"),
        });
    }
    if epsilon <= 0.0 {
        return Err(AggregationError::InvalidParameter {
            field: "epsilon",
            reason: format!("must be positive, got {epsilon}"),
        });
    }
    Ok(())
}

pub(crate) fn validate_bounds(lower: f64, upper: f64) -> Result<()> {
    if !lower.is_finite() {
        return Err(AggregationError::InvalidParameter {
            field: "lower",
            reason: format!("must be finite, got {lower}"),
        });
    }
    if !upper.is_finite() {
        return Err(AggregationError::InvalidParameter {
            field: "upper",
            reason: format!("must be finite, got {upper}"),
        });
    }
    if lower >= upper {
        return Err(AggregationError::InvalidParameter {
            field: "bounds",
            reason: format!("lower ({lower}) must be strictly less than upper ({upper})"),
        });
    }
    Ok(())
}

pub(crate) fn validate_contribution_bound(field: &'static str, value: i32) -> Result<()> {
    if value <= 0 {
        return Err(AggregationError::InvalidParameter {
            field,
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}
