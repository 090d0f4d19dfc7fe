//! Differentially private bounded mean.
//!
//! [`BoundedMean`] reduces the mean query to two independently noised
//! releases:
//!
//! 1. the midpoint-normalized sum of clamped entries, with L∞ sensitivity
//!    `max_contributions_per_partition · range / 2`;
//! 2. the entry count, with L∞ sensitivity `max_contributions_per_partition`.
//!
//! Each release receives half of the privacy budget (ε/2, and δ/2 when a
//! delta is configured). The released mean is the noised sum divided by the
//! noised count, shifted back by the midpoint and clamped into the
//! configured bounds; clamping is deterministic post-processing and costs
//! no additional budget.

mod aggregates;
mod params;
mod state;
mod summary;


pub use params::MeanParams;
pub use summary::MeanSummary;

use std::sync::Arc;

use aggregates::PartialAggregates;
use state::AggregationState;

use crate::error::{AggregationError, Result};
use crate::interval::ConfidenceInterval;
use crate::noise::Noise;

/// The two noised components cached by [`BoundedMean::compute_result`] for
/// confidence-interval computation.
#[derive(Debug, Clone, Copy)]
struct NoisedMean {
    normalized_sum: f64,
    count: i64,
}

/// Differentially private estimator of the arithmetic mean of a stream of
/// bounded real values.
///
/// Single-owner and single-shot: the estimator accepts entries (and merges)
/// while open, then releases exactly one noised artifact, either a result
/// or a serializable summary.
pub struct BoundedMean {
    params: MeanParams,
    noise: Arc<dyn Noise>,
    aggregates: PartialAggregates,
    state: AggregationState,
    noised: Option<NoisedMean>,
}

impl BoundedMean {
    /// Start building a bounded-mean estimator
    pub fn builder() -> BoundedMeanBuilder {
        BoundedMeanBuilder::default()
    }

    /// The frozen parameters of this estimator
    pub fn params(&self) -> &MeanParams {
        &self.params
    }

    /// Accept one entry.
    ///
    /// The value is clamped into `[lower, upper]`; NaN is silently dropped.
    /// Fails once the estimator has been finalized.
    pub fn add_entry(&mut self, value: f64) -> Result<()> {
        self.state.check_open("add_entry")?;
        self.aggregates.insert(value, &self.params);
        Ok(())
    }

    /// Accept a batch of entries, as [`BoundedMean::add_entry`] per value.
    pub fn add_entries(&mut self, values: impl IntoIterator<Item = f64>) -> Result<()> {
        self.state.check_open("add_entries")?;
        for value in values {
            self.aggregates.insert(value, &self.params);
        }
        Ok(())
    }

    /// Release the noised mean. Single-shot: finalizes the estimator.
    ///
    /// When the noised count comes out non-positive (which includes the
    /// empty-stream case under zero noise) the mean is undefined and the
    /// midpoint is returned instead.
    pub fn compute_result(&mut self) -> Result<f64> {
        self.state.check_open("compute_result")?;
        self.state = AggregationState::ResultReturned;

        let epsilon = self.params.split_epsilon();
        let delta = self.params.split_delta();
        let l0 = self.params.max_partitions_contributed;

        let noised_normalized_sum = self.noise.add_noise_f64(
            self.aggregates.normalized_sum,
            l0,
            self.params.sum_sensitivity(),
            epsilon,
            delta,
        );
        let noised_count = self.noise.add_noise_i64(
            self.aggregates.count,
            l0,
            self.params.count_sensitivity(),
            epsilon,
            delta,
        );
        self.noised = Some(NoisedMean {
            normalized_sum: noised_normalized_sum,
            count: noised_count,
        });

        let midpoint = self.params.midpoint();
        let mean = if noised_count <= 0 {
            midpoint
        } else {
            noised_normalized_sum / noised_count as f64 + midpoint
        };
        Ok(mean.clamp(self.params.lower, self.params.upper))
    }

    /// Confidence interval at level `1 - alpha` around the released mean,
    /// with the default budget split `alpha_sum = alpha / 2`.
    ///
    /// Requires [`BoundedMean::compute_result`] to have been called; may be
    /// called any number of times afterwards.
    pub fn compute_confidence_interval(&self, alpha: f64) -> Result<ConfidenceInterval> {
        self.compute_confidence_interval_with_alpha_split(alpha, alpha / 2.0)
    }

    /// Confidence interval at level `1 - alpha`, spending `alpha_sum` of
    /// the failure probability on the sum component.
    ///
    /// The count component receives
    /// `alpha_count = (alpha - alpha_sum) / (1 - alpha_sum)`, so that a
    /// union bound over the two components yields overall confidence
    /// `1 - alpha`.
    pub fn compute_confidence_interval_with_alpha_split(
        &self,
        alpha: f64,
        alpha_sum: f64,
    ) -> Result<ConfidenceInterval> {
        let noised = self.noised.ok_or(AggregationError::ResultNotYetComputed)?;
        validate_alpha(alpha)?;
        validate_alpha_sum(alpha, alpha_sum)?;

        let alpha_count = (alpha - alpha_sum) / (1.0 - alpha_sum);
        let epsilon = self.params.split_epsilon();
        let delta = self.params.split_delta();
        let l0 = self.params.max_partitions_contributed;

        let sum_interval = self.noise.confidence_interval_f64(
            noised.normalized_sum,
            l0,
            self.params.sum_sensitivity(),
            epsilon,
            delta,
            alpha_sum,
        );
        let count_interval = self.noise.confidence_interval_i64(
            noised.count,
            l0,
            self.params.count_sensitivity(),
            epsilon,
            delta,
            alpha_count,
        );

        // The mean is monotone in sum and count within each orthant; the
        // extremal endpoints come from the worst-case corner of the
        // sum × count rectangle. A count lower bound below 1 would allow a
        // division by zero or a sign flip, so both count bounds are kept
        // at least 1.
        let count_lower = count_interval.lower_bound.max(1.0);
        let count_upper = count_interval.upper_bound.max(1.0);
        let midpoint = self.params.midpoint();

        let mean_upper = if sum_interval.upper_bound >= 0.0 {
            sum_interval.upper_bound / count_lower
        } else {
            sum_interval.upper_bound / count_upper
        } + midpoint;
        let mean_lower = if sum_interval.lower_bound >= 0.0 {
            sum_interval.lower_bound / count_upper
        } else {
            sum_interval.lower_bound / count_lower
        } + midpoint;

        Ok(ConfidenceInterval::new(mean_lower, mean_upper)
            .clamped_to(self.params.lower, self.params.upper))
    }

    /// Release the pre-noise state as a mergeable summary. Single-shot:
    /// finalizes the estimator, mirroring [`BoundedMean::compute_result`].
    pub fn get_serializable_summary(&mut self) -> Result<MeanSummary> {
        self.state.check_open("get_serializable_summary")?;
        self.state = AggregationState::Serialized;
        Ok(MeanSummary {
            normalized_sum: self.aggregates.normalized_sum,
            count: self.aggregates.count,
            mechanism_type: self.noise.mechanism_type(),
            epsilon: self.params.epsilon,
            delta: self.params.delta,
            lower: self.params.lower,
            upper: self.params.upper,
            max_partitions_contributed: self.params.max_partitions_contributed,
            max_contributions_per_partition: self.params.max_contributions_per_partition,
        })
    }

    /// Fold another shard's summary into this open estimator.
    ///
    /// The summary's configuration fingerprint must match this estimator's
    /// exactly (floats by bit pattern); the first mismatching field is
    /// reported. The estimator stays open, so further entries and merges
    /// are allowed.
    pub fn merge_with(&mut self, summary: &MeanSummary) -> Result<()> {
        self.state.check_open("merge_with")?;
        summary.check_compatible(&self.params, self.noise.mechanism_type())?;
        self.aggregates.merge(summary.normalized_sum, summary.count);
        Ok(())
    }
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AggregationError::InvalidParameter {
            field: "alpha",
            reason: format!("must be in (0, 1), got {alpha}"),
        });
    }
    Ok(())
}

fn validate_alpha_sum(alpha: f64, alpha_sum: f64) -> Result<()> {
    if !(alpha_sum > 0.0 && alpha_sum < alpha) {
        return Err(AggregationError::InvalidParameter {
            field: "alpha_sum",
            reason: format!("must be in (0, alpha), got {alpha_sum} with alpha {alpha}"),
        });
    }
    Ok(())
}

/// Builder for [`BoundedMean`].
///
/// Contribution bounds default to 1, the narrowest bound; everything else
/// must be provided explicitly.
pub struct BoundedMeanBuilder {
    epsilon: Option<f64>,
    delta: Option<f64>,
    lower: Option<f64>,
    upper: Option<f64>,
    max_partitions_contributed: i32,
    max_contributions_per_partition: i32,
    noise: Option<Arc<dyn Noise>>,
}

impl Default for BoundedMeanBuilder {
    fn default() -> Self {
        Self {
            epsilon: None,
            delta: None,
            lower: None,
            upper: None,
            max_partitions_contributed: 1,
            max_contributions_per_partition: 1,
            noise: None,
        }
    }
}

impl BoundedMeanBuilder {
    /// Set the privacy budget ε
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Set the privacy parameter δ
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Set the lower clamping bound
    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    /// Set the upper clamping bound
    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Set the L₀ contribution bound
    pub fn with_max_partitions_contributed(mut self, bound: i32) -> Self {
        self.max_partitions_contributed = bound;
        self
    }

    /// Set the L∞ contribution bound
    pub fn with_max_contributions_per_partition(mut self, bound: i32) -> Self {
        self.max_contributions_per_partition = bound;
        self
    }

    /// Set the noise mechanism
    pub fn with_noise(mut self, noise: Arc<dyn Noise>) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Validate the parameters and construct an open estimator.
    pub fn build(self) -> Result<BoundedMean> {
        let noise = self.noise.ok_or(AggregationError::InvalidParameter {
            field: "noise",
            reason: "a noise mechanism is required".to_string(),
        })?;
        let epsilon = self.epsilon.ok_or(AggregationError::InvalidParameter {
            field: "epsilon",
            reason: "required".to_string(),
        })?;
        params::validate_epsilon(epsilon)?;
        noise.mechanism_type().check_delta(self.delta)?;
        let lower = self.lower.ok_or(AggregationError::InvalidParameter {
            field: "lower",
            reason: "required".to_string(),
        })?;
        let upper = self.upper.ok_or(AggregationError::InvalidParameter {
            field: "upper",
            reason: "required".to_string(),
        })?;
        params::validate_bounds(lower, upper)?;
        params::validate_contribution_bound(
            "max_partitions_contributed",
            self.max_partitions_contributed,
        )?;
        params::validate_contribution_bound(
            "max_contributions_per_partition",
            self.max_contributions_per_partition,
        )?;

        Ok(BoundedMean {
            params: MeanParams {
                epsilon,
                delta: self.delta,
                lower,
                upper,
                max_partitions_contributed: self.max_partitions_contributed,
                max_contributions_per_partition: self.max_contributions_per_partition,
            },
            noise,
            aggregates: PartialAggregates::default(),
            state: AggregationState::Open,
            noised: None,
        })
    }
}
