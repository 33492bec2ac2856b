//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - emitted to JSON reports
//! - reused by callers embedding the estimators in a larger analysis chain

use clap::ValueEnum;
use serde::Serialize;

use crate::error::TauError;
use crate::math::UncertainValue;

/// Which estimator variant(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VariantSpec {
    /// Run both variants and report them side by side.
    Both,
    /// Pool the per-pair decay rates, then invert the pooled rate.
    RateMean,
    /// Pool the per-pair lifetimes directly.
    LifetimeMean,
}

impl std::fmt::Display for VariantSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VariantSpec::Both => "both",
            VariantSpec::RateMean => "rate-mean",
            VariantSpec::LifetimeMean => "lifetime-mean",
        })
    }
}

/// Concrete estimator kind actually run after resolving `VariantSpec::Both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimatorKind {
    RateMean,
    LifetimeMean,
}

impl EstimatorKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            EstimatorKind::RateMean => "rate-mean",
            EstimatorKind::LifetimeMean => "lifetime-mean",
        }
    }
}

impl VariantSpec {
    /// The concrete estimators this spec asks for, in report order.
    pub fn kinds(self) -> Vec<EstimatorKind> {
        match self {
            VariantSpec::Both => vec![EstimatorKind::RateMean, EstimatorKind::LifetimeMean],
            VariantSpec::RateMean => vec![EstimatorKind::RateMean],
            VariantSpec::LifetimeMean => vec![EstimatorKind::LifetimeMean],
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text tables for the terminal.
    Text,
    /// A single JSON document on stdout.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}

/// A measured plunger dataset.
///
/// The four series are index-aligned: entry `i` of each belongs to the
/// `i`-th target-to-stopper distance, and distances are expected in
/// increasing order so adjacent entries form physical pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Target-to-stopper distances (um), increasing.
    pub distances: Vec<UncertainValue>,
    /// Per-distance efficiency calibration factors (dimensionless).
    pub calibrations: Vec<UncertainValue>,
    /// Unshifted (stopped-component) peak intensities.
    pub unshifted: Vec<UncertainValue>,
    /// Doppler-shifted (in-flight) peak intensities.
    pub shifted: Vec<UncertainValue>,
    /// Mean recoil velocity (um/ps) used to turn distances into flight times.
    pub relative_velocity: UncertainValue,
}

impl Dataset {
    /// Number of distances in the dataset.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Check the structural invariants every estimator relies on.
    ///
    /// All four series must share one length, at least two distances must be
    /// present, and every entry must be a finite value with a finite,
    /// non-negative uncertainty. The velocity is checked separately when
    /// flight times are derived.
    pub fn validate(&self) -> Result<(), TauError> {
        let n = self.distances.len();
        for (name, series) in [
            ("calibration factors", &self.calibrations),
            ("unshifted intensities", &self.unshifted),
            ("shifted intensities", &self.shifted),
        ] {
            if series.len() != n {
                return Err(TauError::ShapeMismatch {
                    left: "distances",
                    left_len: n,
                    right: name,
                    right_len: series.len(),
                });
            }
        }
        if n < 2 {
            return Err(TauError::InsufficientData { len: n });
        }
        for (name, series) in [
            ("distances", &self.distances),
            ("calibration factors", &self.calibrations),
            ("unshifted intensities", &self.unshifted),
            ("shifted intensities", &self.shifted),
        ] {
            for (index, v) in series.iter().enumerate() {
                if !v.is_finite() || v.uncertainty < 0.0 {
                    return Err(TauError::InvalidMeasurement { series: name, index });
                }
            }
        }
        Ok(())
    }
}

/// Per-estimator statistics across the replicates of a study run.
#[derive(Debug, Clone, Serialize)]
pub struct VariantStats {
    pub estimator: EstimatorKind,
    /// Mean of the replicate point estimates (ps).
    pub mean_tau: f64,
    /// Sample standard deviation of the replicate point estimates (ps).
    pub sd_tau: f64,
    /// Mean of the replicate quoted uncertainties (ps).
    pub mean_sigma: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct EstimateConfig {
    /// True mean lifetime of the synthetic state (ps).
    pub true_tau: f64,
    /// Number of target-to-stopper distances to generate.
    pub n_distances: usize,
    /// Shortest distance (um).
    pub distance_min: f64,
    /// Longest distance (um).
    pub distance_max: f64,
    /// Quoted 1-sigma distance uncertainty (um).
    pub distance_error: f64,
    /// Mean recoil velocity (um/ps).
    pub velocity: f64,
    /// Quoted 1-sigma velocity uncertainty (um/ps).
    pub velocity_error: f64,
    /// Decays observed per distance at time zero (intensity scale).
    pub counts: f64,
    /// Spread of the per-distance calibration factors around 1.
    pub calibration_spread: f64,
    /// Quoted 1-sigma uncertainty of each calibration factor.
    pub calibration_error: f64,
    /// Counting-noise scale (0 = exact decay curve, 1 = Poisson-like).
    pub noise: f64,
    /// Base seed for dataset synthesis.
    pub seed: u64,

    pub variant: VariantSpec,
    pub format: OutputFormat,
    /// Include the per-pair table in text reports.
    pub show_pairs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<UncertainValue> {
        values.iter().map(|&v| UncertainValue::new(v, 0.1)).collect()
    }

    fn valid_dataset() -> Dataset {
        Dataset {
            distances: series(&[10.0, 20.0, 40.0]),
            calibrations: series(&[1.0, 1.02, 0.98]),
            unshifted: series(&[100.0, 80.0, 60.0]),
            shifted: series(&[20.0, 40.0, 60.0]),
            relative_velocity: UncertainValue::new(5.0, 0.05),
        }
    }

    #[test]
    fn valid_dataset_passes_validation() {
        assert!(valid_dataset().validate().is_ok());
    }

    #[test]
    fn misaligned_series_is_reported_with_both_lengths() {
        let mut ds = valid_dataset();
        ds.shifted.pop();
        match ds.validate() {
            Err(TauError::ShapeMismatch {
                left_len, right_len, ..
            }) => {
                assert_eq!(left_len, 3);
                assert_eq!(right_len, 2);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn single_distance_is_insufficient() {
        let mut ds = valid_dataset();
        ds.distances.truncate(1);
        ds.calibrations.truncate(1);
        ds.unshifted.truncate(1);
        ds.shifted.truncate(1);
        assert_eq!(ds.validate(), Err(TauError::InsufficientData { len: 1 }));
    }

    #[test]
    fn non_finite_or_negative_sigma_entries_are_rejected() {
        let mut ds = valid_dataset();
        ds.unshifted[1] = UncertainValue::new(f64::NAN, 0.1);
        assert_eq!(
            ds.validate(),
            Err(TauError::InvalidMeasurement {
                series: "unshifted intensities",
                index: 1
            })
        );

        let mut ds = valid_dataset();
        ds.calibrations[2] = UncertainValue::new(1.0, -0.01);
        assert_eq!(
            ds.validate(),
            Err(TauError::InvalidMeasurement {
                series: "calibration factors",
                index: 2
            })
        );
    }

    #[test]
    fn variant_spec_expands_to_concrete_kinds() {
        assert_eq!(
            VariantSpec::Both.kinds(),
            vec![EstimatorKind::RateMean, EstimatorKind::LifetimeMean]
        );
        assert_eq!(VariantSpec::RateMean.kinds(), vec![EstimatorKind::RateMean]);
        assert_eq!(
            VariantSpec::LifetimeMean.kinds(),
            vec![EstimatorKind::LifetimeMean]
        );
    }
}
