//! Laplace mechanism.
//!
//! Provides (ε, 0)-differential privacy by adding noise drawn from
//! Laplace(0, b) with scale `b = L1 / ε`, where the L1 sensitivity of the
//! release is `l0_sensitivity · linf_sensitivity`.
//!
//! Sampling uses the inverse CDF method: for U ~ Uniform(-0.5, 0.5),
//! `X = -b · sign(U) · ln(1 - 2|U|)` is Laplace(0, b).

use rand::Rng;

use super::{MechanismType, Noise};
use crate::interval::ConfidenceInterval;

/// Laplace mechanism for (ε, 0)-differential privacy
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplaceNoise;

impl LaplaceNoise {
    /// Create a new Laplace mechanism
    pub fn new() -> Self {
        Self
    }

    fn scale(l0_sensitivity: i32, linf_sensitivity: f64, epsilon: f64) -> f64 {
        let l1_sensitivity = f64::from(l0_sensitivity) * linf_sensitivity;
        l1_sensitivity / epsilon
    }

    /// Sample from Laplace(0, scale) via the inverse CDF method.
    fn sample<R: Rng>(rng: &mut R, scale: f64) -> f64 {
        // Keep u strictly above -0.5 so that 1 - 2|u| stays positive.
        let u = rng.random::<f64>().max(1e-15) - 0.5;
        -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
    }

    /// Two-sided interval half-width at level `1 - alpha`.
    ///
    /// P(|X| > t) = e^(-t/b) for Laplace(0, b), so t = -b · ln(alpha).
    fn interval_half_width(scale: f64, alpha: f64) -> f64 {
        -scale * alpha.ln()
    }
}

impl Noise for LaplaceNoise {
    fn mechanism_type(&self) -> MechanismType {
        MechanismType::Laplace
    }

    fn add_noise_f64(
        &self,
        value: f64,
        l0_sensitivity: i32,
        linf_sensitivity: f64,
        epsilon: f64,
        _delta: Option<f64>,
    ) -> f64 {
        let scale = Self::scale(l0_sensitivity, linf_sensitivity, epsilon);
        let mut rng = rand::rng();
        value + Self::sample(&mut rng, scale)
    }

    fn add_noise_i64(
        &self,
        value: i64,
        l0_sensitivity: i32,
        linf_sensitivity: i64,
        epsilon: f64,
        _delta: Option<f64>,
    ) -> i64 {
        let scale = Self::scale(l0_sensitivity, linf_sensitivity as f64, epsilon);
        let mut rng = rand::rng();
        value + Self::sample(&mut rng, scale).round() as i64
    }

    fn confidence_interval_f64(
        &self,
        noised_value: f64,
        l0_sensitivity: i32,
        linf_sensitivity: f64,
        epsilon: f64,
        _delta: Option<f64>,
        alpha: f64,
    ) -> ConfidenceInterval {
        let scale = Self::scale(l0_sensitivity, linf_sensitivity, epsilon);
        let half_width = Self::interval_half_width(scale, alpha);
        ConfidenceInterval::new(noised_value - half_width, noised_value + half_width)
    }

    fn confidence_interval_i64(
        &self,
        noised_value: i64,
        l0_sensitivity: i32,
        linf_sensitivity: i64,
        epsilon: f64,
        _delta: Option<f64>,
        alpha: f64,
    ) -> ConfidenceInterval {
        let scale = Self::scale(l0_sensitivity, linf_sensitivity as f64, epsilon);
        let half_width = Self::interval_half_width(scale, alpha);
        let center = noised_value as f64;
        ConfidenceInterval::new(center - half_width, center + half_width)
    }
}
