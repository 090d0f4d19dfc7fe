//! Error types for the aggregation crate.

use thiserror::Error;

/// Aggregation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AggregationError {
    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("aggregator already finalized: {operation} requires an open aggregator")]
    AggregatorFinalized { operation: &'static str },

    #[error("confidence interval requested before the result was computed")]
    ResultNotYetComputed,

    #[error("incompatible merge: {field} differs between the aggregators")]
    IncompatibleMerge { field: &'static str },

    #[error("malformed summary: {0}")]
    MalformedSummary(String),
}

/// Result type for aggregation operations
pub type Result<T> = std::result::Result<T, AggregationError>;
