//! Differentially private bounded-mean aggregation.
//!
//! The central type is [`BoundedMean`], an incremental accumulator that
//! consumes a stream of real-valued contributions and releases a noised,
//! clamped estimate of their arithmetic mean under (ε, δ)-differential
//! privacy. The mean query is decomposed into two independently noised
//! releases, a midpoint-normalized sum and a count, each receiving half of
//! the privacy budget; post-noise clamping into the configured bounds is
//! free under DP post-processing.
//!
//! Noise enters through the [`Noise`] capability trait. [`LaplaceNoise`]
//! and [`GaussianNoise`] are the bundled mechanisms; tests substitute
//! deterministic stubs.
//!
//! Each aggregator is single-shot: once a result has been computed or a
//! mergeable [`MeanSummary`] has been taken, the raw state can never be
//! released again.
//!
//! # Example
//!
//! ```
//! use agregar::{BoundedMean, LaplaceNoise};
//! use std::sync::Arc;
//!
//! let mut mean = BoundedMean::builder()
//!     .with_epsilon(1.0)
//!     .with_lower(0.0)
//!     .with_upper(10.0)
//!     .with_max_partitions_contributed(1)
//!     .with_max_contributions_per_partition(1)
//!     .with_noise(Arc::new(LaplaceNoise::new()))
//!     .build()?;
//!
//! mean.add_entries([4.0, 6.0, 8.0])?;
//! let result = mean.compute_result()?;
//! assert!((0.0..=10.0).contains(&result));
//! # Ok::<(), agregar::AggregationError>(())
//! ```

pub mod error;
pub mod interval;
pub mod mean;
pub mod noise;

pub use error::{AggregationError, Result};
pub use interval::ConfidenceInterval;
pub use mean::{BoundedMean, BoundedMeanBuilder, MeanParams, MeanSummary};
pub use noise::{GaussianNoise, LaplaceNoise, MechanismType, Noise};
