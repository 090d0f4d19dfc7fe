//! Property tests for the bounded-mean estimator.
//!
//! Ensures the released values satisfy their invariants:
//! - Results and confidence-interval bounds stay inside the clamping range
//! - NaN entries never influence the release
//! - Merging partial aggregates is exact regardless of grouping
//! - Summaries survive their byte encoding unchanged

use std::sync::Arc;

use agregar::{
    BoundedMean, ConfidenceInterval, GaussianNoise, LaplaceNoise, MechanismType, Noise,
};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// Deterministic zero-noise mechanism
// =============================================================================

/// Echoes its input unchanged; intervals collapse onto the value. Turns the
/// estimator into an exact bounded mean for determinism-sensitive
/// properties.
#[derive(Debug, Clone, Copy)]
struct EchoNoise;

impl Noise for EchoNoise {
    fn mechanism_type(&self) -> MechanismType {
        MechanismType::Unspecified
    }

    fn add_noise_f64(&self, value: f64, _l0: i32, _linf: f64, _eps: f64, _delta: Option<f64>) -> f64 {
        value
    }

    fn add_noise_i64(&self, value: i64, _l0: i32, _linf: i64, _eps: f64, _delta: Option<f64>) -> i64 {
        value
    }

    fn confidence_interval_f64(
        &self,
        noised_value: f64,
        _l0: i32,
        _linf: f64,
        _eps: f64,
        _delta: Option<f64>,
        _alpha: f64,
    ) -> ConfidenceInterval {
        ConfidenceInterval::new(noised_value, noised_value)
    }

    fn confidence_interval_i64(
        &self,
        noised_value: i64,
        _l0: i32,
        _linf: i64,
        _eps: f64,
        _delta: Option<f64>,
        _alpha: f64,
    ) -> ConfidenceInterval {
        ConfidenceInterval::new(noised_value as f64, noised_value as f64)
    }
}

// =============================================================================
// Strategy helpers
// =============================================================================

/// Generate a valid (lower, upper) clamping range
fn clamping_bounds() -> impl Strategy<Value = (f64, f64)> {
    (-100.0f64..100.0, 0.1f64..100.0).prop_map(|(lower, width)| (lower, lower + width))
}

/// Entries as integer-valued floats, so that sums are exact in f64 and
/// grouping-sensitive properties can assert bitwise equality.
fn exact_entries(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    vec((-50i32..50).prop_map(f64::from), len)
}

fn laplace_mean(lower: f64, upper: f64, epsilon: f64) -> BoundedMean {
    BoundedMean::builder()
        .with_epsilon(epsilon)
        .with_noise(Arc::new(LaplaceNoise::new()))
        .with_lower(lower)
        .with_upper(upper)
        .build()
        .unwrap()
}

fn echo_mean(lower: f64, upper: f64) -> BoundedMean {
    BoundedMean::builder()
        .with_epsilon(1.0)
        .with_noise(Arc::new(EchoNoise))
        .with_lower(lower)
        .with_upper(upper)
        .build()
        .unwrap()
}

// =============================================================================
// Release bound properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_laplace_result_within_bounds(
        (lower, upper) in clamping_bounds(),
        entries in vec(-300.0f64..300.0, 0..20),
        epsilon in 0.1f64..5.0,
    ) {
        let mut mean = laplace_mean(lower, upper, epsilon);
        mean.add_entries(entries).unwrap();

        let result = mean.compute_result().unwrap();
        prop_assert!(
            (lower..=upper).contains(&result),
            "result {} outside [{}, {}]",
            result,
            lower,
            upper
        );
    }

    #[test]
    fn prop_gaussian_result_within_bounds(
        (lower, upper) in clamping_bounds(),
        entries in vec(-300.0f64..300.0, 0..20),
        epsilon in 0.1f64..5.0,
        delta in 1e-8f64..1e-2,
    ) {
        let mut mean = BoundedMean::builder()
            .with_epsilon(epsilon)
            .with_delta(delta)
            .with_noise(Arc::new(GaussianNoise::new()))
            .with_lower(lower)
            .with_upper(upper)
            .build()
            .unwrap();
        mean.add_entries(entries).unwrap();

        let result = mean.compute_result().unwrap();
        prop_assert!(
            (lower..=upper).contains(&result),
            "result {} outside [{}, {}]",
            result,
            lower,
            upper
        );
    }

    #[test]
    fn prop_confidence_bounds_within_bounds(
        (lower, upper) in clamping_bounds(),
        epsilon in 0.1f64..5.0,
        alpha in 0.01f64..0.99,
        split in 0.01f64..0.99,
    ) {
        let mut mean = laplace_mean(lower, upper, epsilon);
        mean.add_entry((lower + upper) / 2.0).unwrap();
        mean.compute_result().unwrap();

        let alpha_sum = alpha * split;
        let ci = mean
            .compute_confidence_interval_with_alpha_split(alpha, alpha_sum)
            .unwrap();
        prop_assert!(ci.lower_bound <= ci.upper_bound);
        prop_assert!((lower..=upper).contains(&ci.lower_bound));
        prop_assert!((lower..=upper).contains(&ci.upper_bound));

        let ci = mean.compute_confidence_interval(alpha).unwrap();
        prop_assert!(ci.lower_bound <= ci.upper_bound);
        prop_assert!((lower..=upper).contains(&ci.lower_bound));
        prop_assert!((lower..=upper).contains(&ci.upper_bound));
    }
}

// =============================================================================
// Determinism-sensitive properties (zero noise)
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_nan_entries_do_not_change_result(
        entries in vec((-300.0f64..300.0, any::<bool>()), 0..30),
    ) {
        let mut with_nans = echo_mean(-10.0, 10.0);
        let mut without_nans = echo_mean(-10.0, 10.0);

        for (value, nan_after) in &entries {
            with_nans.add_entry(*value).unwrap();
            without_nans.add_entry(*value).unwrap();
            if *nan_after {
                with_nans.add_entry(f64::NAN).unwrap();
            }
        }

        let left = with_nans.compute_result().unwrap();
        let right = without_nans.compute_result().unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_merge_grouping_is_exact(
        a in exact_entries(0..15),
        b in exact_entries(0..15),
        c in exact_entries(0..15),
    ) {
        let summarize = |entries: &[f64]| {
            let mut mean = echo_mean(-60.0, 60.0);
            mean.add_entries(entries.iter().copied()).unwrap();
            mean.get_serializable_summary().unwrap()
        };

        // (A + B) + C
        let mut ab = echo_mean(-60.0, 60.0);
        ab.add_entries(a.iter().copied()).unwrap();
        ab.merge_with(&summarize(&b)).unwrap();
        let mut left = echo_mean(-60.0, 60.0);
        left.merge_with(&ab.get_serializable_summary().unwrap()).unwrap();
        left.merge_with(&summarize(&c)).unwrap();

        // A + (B + C)
        let mut bc = echo_mean(-60.0, 60.0);
        bc.add_entries(b.iter().copied()).unwrap();
        bc.merge_with(&summarize(&c)).unwrap();
        let mut right = echo_mean(-60.0, 60.0);
        right.merge_with(&summarize(&a)).unwrap();
        right.merge_with(&bc.get_serializable_summary().unwrap()).unwrap();

        let left = left.get_serializable_summary().unwrap();
        let right = right.get_serializable_summary().unwrap();
        prop_assert_eq!(left.normalized_sum, right.normalized_sum);
        prop_assert_eq!(left.count, right.count);
    }

    #[test]
    fn prop_merge_is_commutative(
        a in exact_entries(0..15),
        b in exact_entries(0..15),
    ) {
        let summarize = |entries: &[f64]| {
            let mut mean = echo_mean(-60.0, 60.0);
            mean.add_entries(entries.iter().copied()).unwrap();
            mean.get_serializable_summary().unwrap()
        };
        let (sa, sb) = (summarize(&a), summarize(&b));

        let mut ab = echo_mean(-60.0, 60.0);
        ab.merge_with(&sa).unwrap();
        ab.merge_with(&sb).unwrap();
        let mut ba = echo_mean(-60.0, 60.0);
        ba.merge_with(&sb).unwrap();
        ba.merge_with(&sa).unwrap();

        let ab = ab.get_serializable_summary().unwrap();
        let ba = ba.get_serializable_summary().unwrap();
        prop_assert_eq!(ab.normalized_sum, ba.normalized_sum);
        prop_assert_eq!(ab.count, ba.count);
    }

    #[test]
    fn prop_normalized_sum_stays_bounded(
        (lower, upper) in clamping_bounds(),
        entries in vec(-300.0f64..300.0, 0..30),
    ) {
        let mut mean = echo_mean(lower, upper);
        mean.add_entries(entries).unwrap();
        let summary = mean.get_serializable_summary().unwrap();

        // Every clamped, normalized entry lies in [-range/2, range/2];
        // allow a whisker of accumulated rounding error.
        let limit = summary.count as f64 * (upper - lower) / 2.0;
        prop_assert!(summary.normalized_sum.abs() <= limit * (1.0 + 1e-12) + 1e-9);
    }

    #[test]
    fn prop_summary_byte_roundtrip(
        (lower, upper) in clamping_bounds(),
        entries in vec(-300.0f64..300.0, 0..30),
    ) {
        let mut mean = laplace_mean(lower, upper, 1.0);
        mean.add_entries(entries).unwrap();
        let summary = mean.get_serializable_summary().unwrap();

        let decoded = agregar::MeanSummary::from_bytes(&summary.to_bytes()).unwrap();
        prop_assert_eq!(decoded, summary);
    }
}
