//! Synthetic plunger dataset generation.
//!
//! A recoil-distance measurement observes, at each target-to-stopper
//! distance `d`, how the decays of a state split between flight and rest.
//! With flight time `t = d / v` and true lifetime `tau`:
//!
//! - shifted (decayed in flight):   `S(t) = N0 * (1 - exp(-t / tau))`
//! - unshifted (decayed at rest):   `U(t) = N0 * exp(-t / tau)`
//!
//! The generator samples these curves on a log-spaced distance grid, applies
//! a per-distance efficiency factor (what calibration later undoes), and
//! adds Gaussian counting noise.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Dataset, EstimateConfig};
use crate::error::AppError;
use crate::math::UncertainValue;

/// Lower bound for sampled calibration factors.
/// A factor near zero means the detector channel was essentially dead, and
/// normalisation against it stops being meaningful.
const MIN_CALIBRATION: f64 = 0.1;

/// Floor for quoted counting uncertainties (one count).
const MIN_COUNT_SIGMA: f64 = 1.0;

/// A generated dataset together with the ground truth behind it.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub dataset: Dataset,
    /// Lifetime used to synthesise the decay curves (ps).
    pub true_tau: f64,
}

pub fn generate_sample(config: &EstimateConfig) -> Result<SampleData, AppError> {
    if config.n_distances < 2 {
        return Err(AppError::new(2, "At least two distances are required."));
    }
    if !(config.distance_min.is_finite()
        && config.distance_max.is_finite()
        && config.distance_min > 0.0
        && config.distance_max > config.distance_min)
    {
        return Err(AppError::new(
            2,
            format!(
                "Invalid distance range: min={}, max={} (must be finite, >0, and max>min).",
                config.distance_min, config.distance_max
            ),
        ));
    }
    if !(config.true_tau.is_finite() && config.true_tau > 0.0) {
        return Err(AppError::new(2, "True lifetime must be finite and positive."));
    }
    if !(config.counts.is_finite() && config.counts > 0.0) {
        return Err(AppError::new(2, "Counts must be finite and positive."));
    }
    if !(config.velocity.is_finite() && config.velocity > 0.0) {
        return Err(AppError::new(2, "Recoil velocity must be finite and positive."));
    }
    for (name, value) in [
        ("velocity error", config.velocity_error),
        ("distance error", config.distance_error),
        ("calibration spread", config.calibration_spread),
        ("calibration error", config.calibration_error),
        ("noise factor", config.noise),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(AppError::new(
                2,
                format!("Invalid {name}: must be finite and non-negative."),
            ));
        }
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let grid = log_space(config.distance_min, config.distance_max, config.n_distances)?;

    let mut distances = Vec::with_capacity(grid.len());
    let mut calibrations = Vec::with_capacity(grid.len());
    let mut unshifted = Vec::with_capacity(grid.len());
    let mut shifted = Vec::with_capacity(grid.len());

    for d in grid {
        let time = d / config.velocity;
        let survival = (-time / config.true_tau).exp();
        let expected_unshifted = config.counts * survival;
        let expected_shifted = config.counts * (1.0 - survival);

        // Per-distance efficiency drift; clamped so normalisation stays
        // meaningful even for large spreads.
        let calibration =
            (1.0 + config.calibration_spread * normal.sample(&mut rng)).max(MIN_CALIBRATION);

        let u = sample_intensity(
            expected_unshifted,
            calibration,
            config.noise,
            normal.sample(&mut rng),
        );
        let s = sample_intensity(
            expected_shifted,
            calibration,
            config.noise,
            normal.sample(&mut rng),
        );

        // Distances are plunger set points: the value is the grid point
        // itself, the quoted sigma reflects the positioning accuracy.
        distances.push(UncertainValue::new(d, config.distance_error));
        calibrations.push(UncertainValue::new(calibration, config.calibration_error));
        unshifted.push(u);
        shifted.push(s);
    }

    Ok(SampleData {
        dataset: Dataset {
            distances,
            calibrations,
            unshifted,
            shifted,
            relative_velocity: UncertainValue::new(config.velocity, config.velocity_error),
        },
        true_tau: config.true_tau,
    })
}

/// Draw one raw (pre-normalisation) intensity.
///
/// The decay curves live in normalised space, so the expectation is divided
/// by the efficiency factor here; multiplying by the calibration later
/// recovers the curve. Counting noise is Gaussian with
/// `sigma = noise * sqrt(expected)` (the large-count Poisson limit). The
/// quoted uncertainty keeps the plain `sqrt(expected)` form regardless of
/// the noise factor, so `noise = 0` yields exact curves that still carry
/// honest error bars.
fn sample_intensity(expected: f64, calibration: f64, noise: f64, z: f64) -> UncertainValue {
    let count_sigma = expected.sqrt().max(MIN_COUNT_SIGMA);
    let observed = expected + noise * count_sigma * z;
    UncertainValue::new(observed / calibration, count_sigma / calibration)
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
///
/// Log spacing matches how plunger distances are chosen in practice: the
/// decay is fastest at short flight times, so short distances are sampled
/// densely and long ones sparsely.
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

fn sample_seed(config: &EstimateConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.n_distances.hash(&mut hasher);
    config.true_tau.to_bits().hash(&mut hasher);
    config.distance_min.to_bits().hash(&mut hasher);
    config.distance_max.to_bits().hash(&mut hasher);
    config.distance_error.to_bits().hash(&mut hasher);
    config.velocity.to_bits().hash(&mut hasher);
    config.velocity_error.to_bits().hash(&mut hasher);
    config.counts.to_bits().hash(&mut hasher);
    config.calibration_spread.to_bits().hash(&mut hasher);
    config.calibration_error.to_bits().hash(&mut hasher);
    config.noise.to_bits().hash(&mut hasher);
    hasher.finish()
}
