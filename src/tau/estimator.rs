//! Lifetime estimators.
//!
//! Over a single adjacent pair, the decay law ties the shifted-intensity
//! slope to the unshifted intensity: `dS/dt = U / tau`. Each pair therefore
//! gives an independent estimate, and the two variants differ only in which
//! quantity they pool across pairs:
//!
//! - rate-mean: pool the decay rates `lambda_k = slope_k / mean_k` by
//!   inverse-variance weighting, then invert the pooled rate once.
//! - lifetime-mean: form `tau_k = mean_k / slope_k` per pair and pool those
//!   directly.
//!
//! On exact data the two agree; on noisy data they weight the same
//! information differently and genuinely diverge. Reporting both side by
//! side is the point, not a redundancy.
//!
//! The pooled uncertainty is `1 / sqrt(sum of weights)` in both variants
//! (for the rate-mean variant, mapped through the inversion). Accumulation
//! runs in pair-index order so repeated runs are bit-for-bit reproducible.

use crate::domain::{Dataset, EstimatorKind};
use crate::error::TauError;
use crate::math::{UncertainValue, inverse_variance_mean};
use crate::tau::normalise::normalise;
use crate::tau::pairwise::{PairwiseSeries, reduce};

/// One estimator's output.
#[derive(Debug, Clone)]
pub struct TauEstimate {
    pub estimator: EstimatorKind,
    /// Pooled lifetime (ps).
    pub tau: UncertainValue,
    /// Sum of the inverse-variance weights behind the pool. Infinite when
    /// some per-pair estimate was exact.
    pub weight_sum: f64,
    /// Per-pair estimates in pair order: decay rates (1/ps) for the
    /// rate-mean variant, lifetimes (ps) for the lifetime-mean variant.
    pub per_pair: Vec<UncertainValue>,
}

fn check_pair_shape(pairs: &PairwiseSeries) -> Result<(), TauError> {
    if pairs.unshifted_mean.len() != pairs.shifted_slope.len() {
        return Err(TauError::ShapeMismatch {
            left: "unshifted means",
            left_len: pairs.unshifted_mean.len(),
            right: "shifted slopes",
            right_len: pairs.shifted_slope.len(),
        });
    }
    if pairs.is_empty() {
        return Err(TauError::InsufficientData {
            len: pairs.len() + 1,
        });
    }
    Ok(())
}

/// Per-pair decay rates `lambda_k = slope_k / mean_k` (1/ps).
pub fn decay_rates(pairs: &PairwiseSeries) -> Result<Vec<UncertainValue>, TauError> {
    check_pair_shape(pairs)?;
    let mut out = Vec::with_capacity(pairs.len());
    for (pair, (slope, mean)) in pairs
        .shifted_slope
        .iter()
        .zip(pairs.unshifted_mean.iter())
        .enumerate()
    {
        let rate = *slope / *mean;
        if !rate.is_finite() {
            return Err(TauError::NonFiniteEstimate { pair });
        }
        out.push(rate);
    }
    Ok(out)
}

/// Per-pair lifetimes `tau_k = mean_k / slope_k` (ps).
pub fn pair_lifetimes(pairs: &PairwiseSeries) -> Result<Vec<UncertainValue>, TauError> {
    check_pair_shape(pairs)?;
    let mut out = Vec::with_capacity(pairs.len());
    for (pair, (slope, mean)) in pairs
        .shifted_slope
        .iter()
        .zip(pairs.unshifted_mean.iter())
        .enumerate()
    {
        let tau = *mean / *slope;
        if !tau.is_finite() {
            return Err(TauError::NonFiniteEstimate { pair });
        }
        out.push(tau);
    }
    Ok(out)
}

/// Rate-mean variant: pool the decay rates, invert the pooled rate.
pub fn rate_mean_estimate(pairs: &PairwiseSeries) -> Result<TauEstimate, TauError> {
    let rates = decay_rates(pairs)?;
    let pooled = inverse_variance_mean(&rates).ok_or(TauError::NonFiniteCombination)?;
    // A pooled rate of exactly zero inverts to infinity; the estimate is
    // then meaningless rather than merely imprecise.
    let tau = pooled.mean.recip();
    if !tau.is_finite() {
        return Err(TauError::NonFiniteCombination);
    }
    Ok(TauEstimate {
        estimator: EstimatorKind::RateMean,
        tau,
        weight_sum: pooled.weight_sum,
        per_pair: rates,
    })
}

/// Lifetime-mean variant: pool the per-pair lifetimes directly.
pub fn lifetime_mean_estimate(pairs: &PairwiseSeries) -> Result<TauEstimate, TauError> {
    let lifetimes = pair_lifetimes(pairs)?;
    let pooled = inverse_variance_mean(&lifetimes).ok_or(TauError::NonFiniteCombination)?;
    Ok(TauEstimate {
        estimator: EstimatorKind::LifetimeMean,
        tau: pooled.mean,
        weight_sum: pooled.weight_sum,
        per_pair: lifetimes,
    })
}

/// Run one concrete estimator over already-reduced pairwise quantities.
pub fn estimate(kind: EstimatorKind, pairs: &PairwiseSeries) -> Result<TauEstimate, TauError> {
    match kind {
        EstimatorKind::RateMean => rate_mean_estimate(pairs),
        EstimatorKind::LifetimeMean => lifetime_mean_estimate(pairs),
    }
}

/// Shared front half of both variants: validate the dataset, normalise both
/// intensity series, and reduce adjacent distances into pairwise quantities.
pub fn derive_pairwise(
    dataset: &Dataset,
    flight_times: &[f64],
) -> Result<PairwiseSeries, TauError> {
    dataset.validate()?;
    if flight_times.len() != dataset.len() {
        return Err(TauError::ShapeMismatch {
            left: "distances",
            left_len: dataset.len(),
            right: "flight times",
            right_len: flight_times.len(),
        });
    }
    let unshifted = normalise(&dataset.unshifted, &dataset.calibrations)?;
    let shifted = normalise(&dataset.shifted, &dataset.calibrations)?;
    reduce(&unshifted, &shifted, flight_times)
}

/// Full rate-mean pipeline from a dataset and its flight times.
pub fn estimate_tau_rate_mean(
    dataset: &Dataset,
    flight_times: &[f64],
) -> Result<TauEstimate, TauError> {
    let pairs = derive_pairwise(dataset, flight_times)?;
    rate_mean_estimate(&pairs)
}

/// Full lifetime-mean pipeline from a dataset and its flight times.
pub fn estimate_tau_lifetime_mean(
    dataset: &Dataset,
    flight_times: &[f64],
) -> Result<TauEstimate, TauError> {
    let pairs = derive_pairwise(dataset, flight_times)?;
    lifetime_mean_estimate(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv(pairs: &[(f64, f64)]) -> Vec<UncertainValue> {
        pairs.iter().map(|&(v, s)| UncertainValue::new(v, s)).collect()
    }

    fn dataset(
        unshifted: &[(f64, f64)],
        shifted: &[(f64, f64)],
        calibrations: &[(f64, f64)],
    ) -> Dataset {
        let n = unshifted.len();
        Dataset {
            distances: (0..n)
                .map(|i| UncertainValue::new(5.0 * (i + 1) as f64, 0.5))
                .collect(),
            calibrations: uv(calibrations),
            unshifted: uv(unshifted),
            shifted: uv(shifted),
            relative_velocity: UncertainValue::new(5.0, 0.05),
        }
    }

    // Three distances, unit uncertainties, exact calibration: small enough
    // to check against propagation done by hand.
    fn hand_checkable() -> (Dataset, Vec<f64>) {
        let ds = dataset(
            &[(10.0, 1.0), (8.0, 1.0), (6.0, 1.0)],
            &[(5.0, 1.0), (4.0, 1.0), (3.0, 1.0)],
            &[(1.0, 0.0), (1.0, 0.0), (1.0, 0.0)],
        );
        (ds, vec![0.0, 1.0, 2.0])
    }

    #[test]
    fn rates_match_hand_propagation() {
        let (ds, times) = hand_checkable();
        let pairs = derive_pairwise(&ds, &times).unwrap();
        let rates = decay_rates(&pairs).unwrap();

        // Pair 0: slope (-1, sqrt2), mean (9, sqrt2/2).
        assert!((rates[0].value + 1.0 / 9.0).abs() < 1e-12);
        let sigma_0 = (2.0 / 81.0 + 0.5 / 6561.0_f64).sqrt();
        assert!((rates[0].uncertainty - sigma_0).abs() < 1e-12);

        // Pair 1: slope (-1, sqrt2), mean (7, sqrt2/2).
        assert!((rates[1].value + 1.0 / 7.0).abs() < 1e-12);
        let sigma_1 = (2.0 / 49.0 + 0.5 / 2401.0_f64).sqrt();
        assert!((rates[1].uncertainty - sigma_1).abs() < 1e-12);
    }

    #[test]
    fn pooled_rate_sits_between_the_pair_rates() {
        let (ds, times) = hand_checkable();
        let est = estimate_tau_rate_mean(&ds, &times).unwrap();

        let pooled_rate = 1.0 / est.tau.value;
        assert!(
            pooled_rate > -1.0 / 7.0 && pooled_rate < -1.0 / 9.0,
            "weighted mean must sit between the extremes, got {pooled_rate}"
        );
        assert!(est.tau.value > -9.0 && est.tau.value < -7.0);
        assert!(est.tau.uncertainty > 0.0);
        assert!(est.weight_sum.is_finite() && est.weight_sum > 0.0);
        assert_eq!(est.per_pair.len(), 2);
    }

    #[test]
    fn variants_disagree_on_noisy_data() {
        let (ds, times) = hand_checkable();
        let a = estimate_tau_rate_mean(&ds, &times).unwrap();
        let b = estimate_tau_lifetime_mean(&ds, &times).unwrap();

        assert!(a.tau.is_finite() && b.tau.is_finite());
        assert!(a.tau.uncertainty > 0.0 && b.tau.uncertainty > 0.0);
        // Same information, different weighting: the pair rates differ, so
        // the two pooled answers must not coincide.
        assert!(
            (a.tau.value - b.tau.value).abs() > 0.1,
            "expected distinct estimates, got {} vs {}",
            a.tau.value,
            b.tau.value
        );
    }

    #[test]
    fn exact_inputs_make_both_variants_agree() {
        // An exact exponential sampled at uniform flight times: every pair
        // sees the same rate, so pooling order cannot matter.
        let ds = dataset(
            &[(7.0, 0.0), (7.0, 0.0), (7.0, 0.0)],
            &[(3.0, 0.0), (4.0, 0.0), (5.0, 0.0)],
            &[(1.0, 0.0), (1.0, 0.0), (1.0, 0.0)],
        );
        let times = vec![1.0, 2.0, 3.0];

        let a = estimate_tau_rate_mean(&ds, &times).unwrap();
        let b = estimate_tau_lifetime_mean(&ds, &times).unwrap();

        assert!((a.tau.value - 7.0).abs() < 1e-12);
        assert!((b.tau.value - 7.0).abs() < 1e-12);
        assert!((a.tau.value - b.tau.value).abs() < 1e-12);
        assert_eq!(a.tau.uncertainty, 0.0, "exact in, exact out");
        assert_eq!(b.tau.uncertainty, 0.0);
        assert!(a.weight_sum.is_infinite());
        assert!(b.weight_sum.is_infinite());
    }

    #[test]
    fn single_pair_collapses_to_the_pair_estimate() {
        let ds = dataset(
            &[(10.0, 1.0), (8.0, 1.0)],
            &[(3.0, 0.5), (5.0, 0.5)],
            &[(1.0, 0.0), (1.0, 0.0)],
        );
        let times = vec![0.0, 2.0];

        let a = estimate_tau_rate_mean(&ds, &times).unwrap();
        let b = estimate_tau_lifetime_mean(&ds, &times).unwrap();

        // One pair: mean (9, sqrt2/2), slope (1, sqrt2/4), so tau = 9 and
        // both variants must reproduce the pair's own uncertainty.
        assert!((b.tau.value - 9.0).abs() < 1e-12);
        assert!((b.tau.value - b.per_pair[0].value).abs() < 1e-12);
        assert!((b.tau.uncertainty - b.per_pair[0].uncertainty).abs() < 1e-12);

        assert!((a.tau.value - b.tau.value).abs() < 1e-12 * 9.0);
        assert!(
            (a.tau.uncertainty - b.tau.uncertainty).abs() < 1e-12 * b.tau.uncertainty,
            "inverting a single pooled rate must keep the pair sigma, got {} vs {}",
            a.tau.uncertainty,
            b.tau.uncertainty
        );
    }

    #[test]
    fn rescaling_all_calibrations_changes_nothing() {
        let base = dataset(
            &[(10.0, 1.0), (8.0, 1.0), (6.0, 1.0)],
            &[(5.0, 1.0), (4.0, 1.0), (3.0, 1.0)],
            &[(1.0, 0.01), (1.02, 0.01), (0.97, 0.01)],
        );
        let times = vec![0.0, 1.0, 2.0];

        let mut scaled = base.clone();
        for c in &mut scaled.calibrations {
            *c = *c * 3.0;
        }

        for (lhs, rhs) in [
            (
                estimate_tau_rate_mean(&base, &times).unwrap(),
                estimate_tau_rate_mean(&scaled, &times).unwrap(),
            ),
            (
                estimate_tau_lifetime_mean(&base, &times).unwrap(),
                estimate_tau_lifetime_mean(&scaled, &times).unwrap(),
            ),
        ] {
            let rel = ((lhs.tau.value - rhs.tau.value) / lhs.tau.value).abs();
            assert!(rel < 1e-12, "tau must be invariant, relative drift {rel}");
            let rel_sigma =
                ((lhs.tau.uncertainty - rhs.tau.uncertainty) / lhs.tau.uncertainty).abs();
            assert!(rel_sigma < 1e-12, "sigma must be invariant, drift {rel_sigma}");
        }
    }

    #[test]
    fn vanishing_denominators_are_reported_per_pair() {
        // Unshifted mean of the only pair is exactly zero: the rate blows up.
        let ds = dataset(
            &[(5.0, 1.0), (-5.0, 1.0)],
            &[(3.0, 0.5), (4.0, 0.5)],
            &[(1.0, 0.0), (1.0, 0.0)],
        );
        let times = vec![0.0, 1.0];
        assert_eq!(
            estimate_tau_rate_mean(&ds, &times).unwrap_err(),
            TauError::NonFiniteEstimate { pair: 0 }
        );

        // Flat shifted series: zero slope kills the lifetime-mean variant.
        let ds = dataset(
            &[(10.0, 1.0), (8.0, 1.0)],
            &[(4.0, 0.5), (4.0, 0.5)],
            &[(1.0, 0.0), (1.0, 0.0)],
        );
        assert_eq!(
            estimate_tau_lifetime_mean(&ds, &times).unwrap_err(),
            TauError::NonFiniteEstimate { pair: 0 }
        );

        // The rate-mean variant survives the per-pair stage on the same data
        // (rates are all zero) but cannot invert the pooled rate.
        assert_eq!(
            estimate_tau_rate_mean(&ds, &times).unwrap_err(),
            TauError::NonFiniteCombination
        );
    }

    #[test]
    fn structural_failures_surface_through_the_entry_points() {
        let (ds, times) = hand_checkable();

        let err = estimate_tau_rate_mean(&ds, &times[..2]).unwrap_err();
        assert!(matches!(err, TauError::ShapeMismatch { .. }));

        let err = estimate_tau_lifetime_mean(&ds, &[0.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(err, TauError::DegenerateInterval { pair: 1, dt: 0.0 });

        let mut short = ds.clone();
        short.distances.truncate(1);
        short.calibrations.truncate(1);
        short.unshifted.truncate(1);
        short.shifted.truncate(1);
        assert_eq!(
            estimate_tau_rate_mean(&short, &times[..1]).unwrap_err(),
            TauError::InsufficientData { len: 1 }
        );
    }
}
