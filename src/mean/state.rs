//! Aggregator lifecycle.

use crate::error::{AggregationError, Result};

/// Lifecycle of an aggregator.
///
/// Transitions are monotone: `Open` moves to exactly one of the terminal
/// states and never back. Each noised artifact spends privacy budget, so
/// a finalized aggregator refuses to release anything further from the
/// same raw state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AggregationState {
    /// Accepting entries and merges
    Open,
    /// A noised result has been released
    ResultReturned,
    /// A serializable summary has been released
    Serialized,
}

impl AggregationState {
    /// Fail with [`AggregationError::AggregatorFinalized`] unless open.
    pub(crate) fn check_open(self, operation: &'static str) -> Result<()> {
        match self {
            AggregationState::Open => Ok(()),
            _ => Err(AggregationError::AggregatorFinalized { operation }),
        }
    }
}
