//! Serializable, mergeable snapshot of a bounded-mean aggregation.

use serde::{Deserialize, Serialize};

use super::params::MeanParams;
use crate::error::{AggregationError, Result};
use crate::noise::MechanismType;

/// Immutable snapshot of an aggregator's pre-noise state together with the
/// configuration fingerprint needed to check merge compatibility.
///
/// Summaries may be merged into any number of open aggregators; merging
/// never consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanSummary {
    pub normalized_sum: f64,
    pub count: i64,
    pub mechanism_type: MechanismType,
    pub epsilon: f64,
    pub delta: Option<f64>,
    pub lower: f64,
    pub upper: f64,
    pub max_partitions_contributed: i32,
    pub max_contributions_per_partition: i32,
}

impl MeanSummary {
    /// Encode the summary for transport between shards.
    pub fn to_bytes(&self) -> Vec<u8> {
        // All stored floats are finite (validated parameters, clamped
        // inputs), so encoding cannot fail.
        serde_json::to_vec(self).expect("mean summary always serializes")
    }

    /// Decode a summary previously produced by [`MeanSummary::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| AggregationError::MalformedSummary(e.to_string()))
    }

    /// Check that this summary was produced under the given configuration.
    ///
    /// Floats are compared by bit pattern: the fingerprint must match the
    /// stored values exactly, not merely numerically.
    pub(crate) fn check_compatible(
        &self,
        params: &MeanParams,
        mechanism_type: MechanismType,
    ) -> Result<()> {
        if self.epsilon.to_bits() != params.epsilon.to_bits() {
            return Err(AggregationError::IncompatibleMerge { field: "epsilon" });
        }
        let delta_matches = match (self.delta, params.delta) {
            (None, None) => true,
            (Some(a), Some(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        };
        if !delta_matches {
            return Err(AggregationError::IncompatibleMerge { field: "delta" });
        }
        if self.mechanism_type != mechanism_type {
            return Err(AggregationError::IncompatibleMerge { field: "mechanism_type" });
        }
        if self.max_partitions_contributed != params.max_partitions_contributed {
            return Err(AggregationError::IncompatibleMerge {
                field: "max_partitions_contributed",
            });
        }
        if self.max_contributions_per_partition != params.max_contributions_per_partition {
            return Err(AggregationError::IncompatibleMerge {
                field: "max_contributions_per_partition",
            });
        }
        if self.lower.to_bits() != params.lower.to_bits() {
            return Err(AggregationError::IncompatibleMerge { field: "lower" });
        }
        if self.upper.to_bits() != params.upper.to_bits() {
            return Err(AggregationError::IncompatibleMerge { field: "upper" });
        }
        Ok(())
    }
}
