//! Pairwise reduction over adjacent distances.
//!
//! Every pair of neighbouring distances `(i, i+1)` yields two quantities:
//!
//! - the mean unshifted intensity, `0.5 * (U_i + U_{i+1})`
//! - the finite-difference slope of the shifted intensity over flight time,
//!   `(S_{i+1} - S_i) / (t_{i+1} - t_i)`
//!
//! Both are evaluated at the same interval, which is what lets their ratio
//! estimate the decay rate without fitting a curve through the whole series.
//! Pair `k` covers distances `k` and `k+1`; a series of `n` distances yields
//! `n - 1` pairs.

use crate::error::TauError;
use crate::math::UncertainValue;

/// Per-pair quantities derived from one dataset snapshot.
#[derive(Debug, Clone)]
pub struct PairwiseSeries {
    /// Mean normalised unshifted intensity of each adjacent pair.
    pub unshifted_mean: Vec<UncertainValue>,
    /// Normalised shifted-intensity slope of each adjacent pair (per ps).
    pub shifted_slope: Vec<UncertainValue>,
}

impl PairwiseSeries {
    /// Number of adjacent pairs.
    pub fn len(&self) -> usize {
        self.unshifted_mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unshifted_mean.is_empty()
    }
}

/// Mean of each adjacent pair of entries.
pub fn adjacent_means(series: &[UncertainValue]) -> Result<Vec<UncertainValue>, TauError> {
    if series.len() < 2 {
        return Err(TauError::InsufficientData { len: series.len() });
    }
    Ok(series.windows(2).map(|w| (w[0] + w[1]) * 0.5).collect())
}

/// Finite-difference slope of each adjacent pair over flight time.
///
/// Flight times enter as exact numbers, so the slope uncertainty is just the
/// difference quadrature scaled by `1 / dt`. Every interval must have a
/// strictly positive, finite width.
pub fn adjacent_slopes(
    series: &[UncertainValue],
    flight_times: &[f64],
) -> Result<Vec<UncertainValue>, TauError> {
    if series.len() != flight_times.len() {
        return Err(TauError::ShapeMismatch {
            left: "intensities",
            left_len: series.len(),
            right: "flight times",
            right_len: flight_times.len(),
        });
    }
    if series.len() < 2 {
        return Err(TauError::InsufficientData { len: series.len() });
    }

    let mut out = Vec::with_capacity(series.len() - 1);
    for (pair, (s, t)) in series.windows(2).zip(flight_times.windows(2)).enumerate() {
        let dt = t[1] - t[0];
        if !dt.is_finite() || dt <= 0.0 {
            return Err(TauError::DegenerateInterval { pair, dt });
        }
        out.push((s[1] - s[0]) / dt);
    }
    Ok(out)
}

/// Reduce aligned unshifted/shifted series into their per-pair quantities.
pub fn reduce(
    unshifted: &[UncertainValue],
    shifted: &[UncertainValue],
    flight_times: &[f64],
) -> Result<PairwiseSeries, TauError> {
    if unshifted.len() != shifted.len() {
        return Err(TauError::ShapeMismatch {
            left: "unshifted intensities",
            left_len: unshifted.len(),
            right: "shifted intensities",
            right_len: shifted.len(),
        });
    }
    Ok(PairwiseSeries {
        unshifted_mean: adjacent_means(unshifted)?,
        shifted_slope: adjacent_slopes(shifted, flight_times)?,
    })
}
