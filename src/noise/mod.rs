//! Noise capability consumed by the aggregators.
//!
//! The aggregator never samples noise itself; it talks to a [`Noise`]
//! implementation through four operations, two per numeric domain. Concrete
//! mechanisms ([`LaplaceNoise`], [`GaussianNoise`]) live in their own
//! modules; tests substitute deterministic stubs through the same trait.
//!
//! Sensitivities are passed in two parts: `l0_sensitivity` is the number of
//! partitions a single user may contribute to, `linf_sensitivity` the
//! worst-case change within one partition. How the two combine into an L1
//! or L2 bound is mechanism-specific.

pub mod gaussian;
pub mod laplace;

pub use gaussian::GaussianNoise;
pub use laplace::LaplaceNoise;

use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, Result};
use crate::interval::ConfidenceInterval;

/// Identity of a noise mechanism, used for merge compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MechanismType {
    /// Pure-ε mechanism; forbids a delta parameter.
    Laplace,
    /// (ε, δ) mechanism; requires a delta parameter.
    Gaussian,
    /// Caller-supplied mechanism with no fixed delta discipline.
    Unspecified,
}

impl MechanismType {
    /// Check that `delta` is admissible for this mechanism.
    ///
    /// A present delta must always lie in (0, 1); whether it may (or must)
    /// be present at all is decided by the mechanism identity.
    pub fn check_delta(self, delta: Option<f64>) -> Result<()> {
        match (self, delta) {
            (MechanismType::Laplace, Some(_)) => Err(AggregationError::InvalidParameter {
                field: "delta",
                reason: "must be absent for the Laplace mechanism".to_string(),
            }),
            (MechanismType::Gaussian, None) => Err(AggregationError::InvalidParameter {
                field: "delta",
                reason: "required for the Gaussian mechanism".to_string(),
            }),
            (_, Some(d)) if !(d > 0.0 && d < 1.0) => Err(AggregationError::InvalidParameter {
                field: "delta",
                reason: format!("must be in (0, 1), got {d}"),
            }),
            _ => Ok(()),
        }
    }
}

/// Capability for injecting calibrated noise and deriving confidence
/// intervals over noised releases.
///
/// Implementations may assume that privacy parameters have been validated
/// (the aggregator builder rejects invalid ones before any call is made)
/// and must be total for validated inputs. All operations are synchronous.
pub trait Noise: Send + Sync {
    /// Mechanism identity for summary-merge compatibility.
    fn mechanism_type(&self) -> MechanismType;

    /// Add noise to a real-valued statistic.
    fn add_noise_f64(
        &self,
        value: f64,
        l0_sensitivity: i32,
        linf_sensitivity: f64,
        epsilon: f64,
        delta: Option<f64>,
    ) -> f64;

    /// Add noise to an integer-valued statistic.
    fn add_noise_i64(
        &self,
        value: i64,
        l0_sensitivity: i32,
        linf_sensitivity: i64,
        epsilon: f64,
        delta: Option<f64>,
    ) -> i64;

    /// Confidence interval at level `1 - alpha` around a noised
    /// real-valued release.
    fn confidence_interval_f64(
        &self,
        noised_value: f64,
        l0_sensitivity: i32,
        linf_sensitivity: f64,
        epsilon: f64,
        delta: Option<f64>,
        alpha: f64,
    ) -> ConfidenceInterval;

    /// Confidence interval at level `1 - alpha` around a noised
    /// integer-valued release. Bounds are real-valued.
    fn confidence_interval_i64(
        &self,
        noised_value: i64,
        l0_sensitivity: i32,
        linf_sensitivity: i64,
        epsilon: f64,
        delta: Option<f64>,
        alpha: f64,
    ) -> ConfidenceInterval;
}
