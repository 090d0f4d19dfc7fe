//! Gaussian mechanism.
//!
//! Provides (ε, δ)-differential privacy by adding noise drawn from
//! N(0, σ²) with
//!
//! ```text
//! σ = L2 · √(2 ln(1.25/δ)) / ε
//! ```
//!
//! where the L2 sensitivity of the release is
//! `√l0_sensitivity · linf_sensitivity`. Sampling uses the Box-Muller
//! transform.

use rand::Rng;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

use super::{MechanismType, Noise};
use crate::interval::ConfidenceInterval;

/// Gaussian mechanism for (ε, δ)-differential privacy
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianNoise;

impl GaussianNoise {
    /// Create a new Gaussian mechanism
    pub fn new() -> Self {
        Self
    }

    /// Standard deviation calibrated for (ε, δ)-DP.
    fn sigma(l0_sensitivity: i32, linf_sensitivity: f64, epsilon: f64, delta: f64) -> f64 {
        let l2_sensitivity = f64::from(l0_sensitivity).sqrt() * linf_sensitivity;
        l2_sensitivity * (2.0 * (1.25 / delta).ln()).sqrt() / epsilon
    }

    /// Sample from N(0, sigma²) via the Box-Muller transform.
    fn sample<R: Rng>(rng: &mut R, sigma: f64) -> f64 {
        let u1: f64 = rng.random::<f64>().max(1e-15);
        let u2: f64 = rng.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * sigma
    }

    /// Two-sided interval half-width at level `1 - alpha`.
    fn interval_half_width(sigma: f64, alpha: f64) -> f64 {
        let standard_normal =
            Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
        sigma * standard_normal.inverse_cdf(1.0 - alpha / 2.0)
    }
}

impl Noise for GaussianNoise {
    fn mechanism_type(&self) -> MechanismType {
        MechanismType::Gaussian
    }

    fn add_noise_f64(
        &self,
        value: f64,
        l0_sensitivity: i32,
        linf_sensitivity: f64,
        epsilon: f64,
        delta: Option<f64>,
    ) -> f64 {
        let delta = delta.expect("delta is required for the gaussian mechanism");
        let sigma = Self::sigma(l0_sensitivity, linf_sensitivity, epsilon, delta);
        let mut rng = rand::rng();
        value + Self::sample(&mut rng, sigma)
    }

    fn add_noise_i64(
        &self,
        value: i64,
        l0_sensitivity: i32,
        linf_sensitivity: i64,
        epsilon: f64,
        delta: Option<f64>,
    ) -> i64 {
        let delta = delta.expect("delta is required for the gaussian mechanism");
        let sigma = Self::sigma(l0_sensitivity, linf_sensitivity as f64, epsilon, delta);
        let mut rng = rand::rng();
        value + Self::sample(&mut rng, sigma).round() as i64
    }

    fn confidence_interval_f64(
        &self,
        noised_value: f64,
        l0_sensitivity: i32,
        linf_sensitivity: f64,
        epsilon: f64,
        delta: Option<f64>,
        alpha: f64,
    ) -> ConfidenceInterval {
        let delta = delta.expect("delta is required for the gaussian mechanism");
        let sigma = Self::sigma(l0_sensitivity, linf_sensitivity, epsilon, delta);
        let half_width = Self::interval_half_width(sigma, alpha);
        ConfidenceInterval::new(noised_value - half_width, noised_value + half_width)
    }

    fn confidence_interval_i64(
        &self,
        noised_value: i64,
        l0_sensitivity: i32,
        linf_sensitivity: i64,
        epsilon: f64,
        delta: Option<f64>,
        alpha: f64,
    ) -> ConfidenceInterval {
        let delta = delta.expect("delta is required for the gaussian mechanism");
        let sigma = Self::sigma(l0_sensitivity, linf_sensitivity as f64, epsilon, delta);
        let half_width = Self::interval_half_width(sigma, alpha);
        let center = noised_value as f64;
        ConfidenceInterval::new(center - half_width, center + half_width)
    }
}
