//! Measurements with Gaussian uncertainties.
//!
//! Every quantity in this pipeline is a `(value, 1-sigma uncertainty)` pair
//! with independent errors, propagated to first order:
//!
//! - sums and differences: absolute uncertainties add in quadrature
//! - products and quotients: relative uncertainties add in quadrature
//! - scaling by a constant `c`: the uncertainty scales by `|c|`
//! - inversion `1/x`: the uncertainty becomes `sigma / x^2`
//!
//! Numerical notes:
//! - Quotients propagate in the absolute form
//!   `sqrt((s_a / b)^2 + (a * s_b / b^2)^2)` rather than the relative form,
//!   so a zero numerator does not turn into a `0/0`.
//! - The inverse-variance mean treats zero-uncertainty entries as exact:
//!   their weights saturate, the combined value is the plain mean of the
//!   exact entries alone, and the combined uncertainty is zero.

use serde::Serialize;
use std::ops::{Add, Div, Mul, Sub};

/// A measured value with its absolute 1-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UncertainValue {
    pub value: f64,
    /// Never negative for valid inputs; propagation keeps it non-negative.
    pub uncertainty: f64,
}

impl UncertainValue {
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }

    /// A value known exactly (zero uncertainty).
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            uncertainty: 0.0,
        }
    }

    /// True when both the value and the uncertainty are finite.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.uncertainty.is_finite()
    }

    /// Multiplicative inverse `1/x` with `sigma / x^2`.
    ///
    /// A zero value yields a non-finite result; callers are expected to
    /// check [`is_finite`](Self::is_finite) where that matters.
    pub fn recip(self) -> Self {
        Self {
            value: 1.0 / self.value,
            uncertainty: self.uncertainty / (self.value * self.value),
        }
    }
}

impl Add for UncertainValue {
    type Output = UncertainValue;

    fn add(self, rhs: UncertainValue) -> UncertainValue {
        UncertainValue {
            value: self.value + rhs.value,
            uncertainty: self.uncertainty.hypot(rhs.uncertainty),
        }
    }
}

impl Sub for UncertainValue {
    type Output = UncertainValue;

    fn sub(self, rhs: UncertainValue) -> UncertainValue {
        UncertainValue {
            value: self.value - rhs.value,
            uncertainty: self.uncertainty.hypot(rhs.uncertainty),
        }
    }
}

impl Mul for UncertainValue {
    type Output = UncertainValue;

    fn mul(self, rhs: UncertainValue) -> UncertainValue {
        UncertainValue {
            value: self.value * rhs.value,
            uncertainty: (self.uncertainty * rhs.value).hypot(rhs.uncertainty * self.value),
        }
    }
}

impl Div for UncertainValue {
    type Output = UncertainValue;

    fn div(self, rhs: UncertainValue) -> UncertainValue {
        UncertainValue {
            value: self.value / rhs.value,
            uncertainty: (self.uncertainty / rhs.value)
                .hypot(self.value * rhs.uncertainty / (rhs.value * rhs.value)),
        }
    }
}

impl Mul<f64> for UncertainValue {
    type Output = UncertainValue;

    fn mul(self, rhs: f64) -> UncertainValue {
        UncertainValue {
            value: self.value * rhs,
            uncertainty: self.uncertainty * rhs.abs(),
        }
    }
}

impl Div<f64> for UncertainValue {
    type Output = UncertainValue;

    fn div(self, rhs: f64) -> UncertainValue {
        UncertainValue {
            value: self.value / rhs,
            uncertainty: self.uncertainty / rhs.abs(),
        }
    }
}

/// Result of pooling uncertain values by inverse-variance weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedMean {
    pub mean: UncertainValue,
    /// Sum of the inverse-variance weights behind `mean`. Infinite when any
    /// input was exact, since an exact entry saturates its weight.
    pub weight_sum: f64,
}

/// Inverse-variance weighted mean of a set of uncertain values.
///
/// Each entry is weighted by `w_i = 1 / sigma_i^2`; the combined value is
/// `sum(w_i * x_i) / sum(w_i)` and its uncertainty is `1 / sqrt(sum(w_i))`.
/// Entries whose inverse variance overflows (uncertainty zero or small
/// enough that `1/sigma^2` is not finite) are taken as exact and dominate
/// the pool outright.
///
/// Returns `None` for an empty slice, and for the pathological case where
/// the finite weights themselves overflow when summed.
pub fn inverse_variance_mean(values: &[UncertainValue]) -> Option<WeightedMean> {
    if values.is_empty() {
        return None;
    }

    let mut exact_sum = 0.0;
    let mut exact_count = 0usize;
    for v in values {
        if !(1.0 / (v.uncertainty * v.uncertainty)).is_finite() {
            exact_sum += v.value;
            exact_count += 1;
        }
    }
    if exact_count > 0 {
        return Some(WeightedMean {
            mean: UncertainValue::exact(exact_sum / exact_count as f64),
            weight_sum: f64::INFINITY,
        });
    }

    let mut weight_sum = 0.0;
    let mut weighted = 0.0;
    for v in values {
        let w = 1.0 / (v.uncertainty * v.uncertainty);
        weight_sum += w;
        weighted += w * v.value;
    }
    if !weight_sum.is_finite() || !weighted.is_finite() || weight_sum <= 0.0 {
        return None;
    }

    Some(WeightedMean {
        mean: UncertainValue::new(weighted / weight_sum, 1.0 / weight_sum.sqrt()),
        weight_sum,
    })
}
