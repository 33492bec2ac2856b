//! Shared estimation pipeline used by both subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! synthetic sample -> flight times -> pairwise reduction -> pooled estimates.
//! The command handlers then only deal with presentation (text vs JSON).

use rayon::prelude::*;

use crate::data::{SampleData, generate_sample};
use crate::domain::{EstimateConfig, VariantStats};
use crate::error::AppError;
use crate::tau::{PairwiseSeries, TauEstimate, derive_pairwise, estimate, flight_times};

/// All computed outputs of a single estimate run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: SampleData,
    /// Flight time per distance, in ps.
    pub flight_times: Vec<f64>,
    pub pairwise: PairwiseSeries,
    /// One entry per requested estimator, in configuration order.
    pub estimates: Vec<TauEstimate>,
}

/// Execute the full pipeline for one dataset and return everything computed
/// along the way, so reports never have to re-derive intermediates.
pub fn run_estimate(config: &EstimateConfig) -> Result<RunOutput, AppError> {
    // 1) Draw the synthetic dataset.
    let sample = generate_sample(config)?;

    // 2) Convert distances into flight times.
    let times = flight_times(&sample.dataset.distances, sample.dataset.relative_velocity)?;

    // 3) Normalise both intensity series and reduce to adjacent pairs.
    let pairwise = derive_pairwise(&sample.dataset, &times)?;

    // 4) Pool the pairs once per requested estimator.
    let mut estimates = Vec::new();
    for kind in config.variant.kinds() {
        estimates.push(estimate(kind, &pairwise)?);
    }

    Ok(RunOutput {
        sample,
        flight_times: times,
        pairwise,
        estimates,
    })
}

/// Aggregated outputs of a replicated study run.
#[derive(Debug, Clone)]
pub struct StudyOutput {
    pub true_tau: f64,
    pub replicates: usize,
    /// One row per requested estimator, in configuration order.
    pub stats: Vec<VariantStats>,
}

/// Repeat the estimate over independently reseeded datasets and summarise,
/// per estimator, the spread of the results next to the quoted uncertainty.
///
/// Replicate `r` runs with `seed + r`, so a study is reproducible from the
/// base seed alone and no two replicates share a dataset.
pub fn run_study(config: &EstimateConfig, replicates: usize) -> Result<StudyOutput, AppError> {
    if replicates < 2 {
        return Err(AppError::new(
            2,
            format!("A study needs at least 2 replicates, got {replicates}."),
        ));
    }

    let runs = (0..replicates as u64)
        .into_par_iter()
        .map(|r| {
            let mut replicate = config.clone();
            replicate.seed = config.seed.wrapping_add(r);
            run_estimate(&replicate)
        })
        .collect::<Result<Vec<RunOutput>, AppError>>()?;

    let mut stats = Vec::new();
    for kind in config.variant.kinds() {
        let mut taus = Vec::with_capacity(runs.len());
        let mut sigmas = Vec::with_capacity(runs.len());
        for run in &runs {
            if let Some(est) = run.estimates.iter().find(|e| e.estimator == kind) {
                taus.push(est.tau.value);
                sigmas.push(est.tau.uncertainty);
            }
        }
        stats.push(VariantStats {
            estimator: kind,
            mean_tau: mean(&taus),
            sd_tau: sample_sd(&taus),
            mean_sigma: mean(&sigmas),
        });
    }

    Ok(StudyOutput {
        true_tau: config.true_tau,
        replicates,
        stats,
    })
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1 in the denominator).
fn sample_sd(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstimateConfig, EstimatorKind, OutputFormat, VariantSpec};

    fn base_config() -> EstimateConfig {
        EstimateConfig {
            true_tau: 120.0,
            n_distances: 10,
            distance_min: 10.0,
            distance_max: 400.0,
            distance_error: 0.5,
            velocity: 5.0,
            velocity_error: 0.05,
            counts: 10_000.0,
            calibration_spread: 0.05,
            calibration_error: 0.01,
            noise: 0.0,
            seed: 42,
            variant: VariantSpec::Both,
            format: OutputFormat::Text,
            show_pairs: true,
        }
    }

    #[test]
    fn noise_free_run_recovers_the_lifetime() {
        let run = run_estimate(&base_config()).unwrap();

        assert_eq!(run.flight_times.len(), 10);
        assert_eq!(run.pairwise.len(), 9);
        assert_eq!(run.estimates.len(), 2);
        for est in &run.estimates {
            let rel = (est.tau.value - 120.0).abs() / 120.0;
            assert!(
                rel < 0.02,
                "{} recovered tau = {} ps, expected about 120 ps",
                est.estimator.display_name(),
                est.tau.value
            );
            assert!(est.tau.uncertainty > 0.0);
        }
    }

    #[test]
    fn variant_selection_controls_which_estimators_run() {
        let mut config = base_config();
        config.variant = VariantSpec::RateMean;

        let run = run_estimate(&config).unwrap();
        assert_eq!(run.estimates.len(), 1);
        assert_eq!(run.estimates[0].estimator, EstimatorKind::RateMean);

        config.variant = VariantSpec::LifetimeMean;
        let run = run_estimate(&config).unwrap();
        assert_eq!(run.estimates.len(), 1);
        assert_eq!(run.estimates[0].estimator, EstimatorKind::LifetimeMean);
    }

    #[test]
    fn study_summarises_every_requested_estimator() {
        let mut config = base_config();
        config.noise = 0.5;

        let study = run_study(&config, 6).unwrap();
        assert_eq!(study.replicates, 6);
        assert_eq!(study.stats.len(), 2);
        for row in &study.stats {
            let rel = (row.mean_tau - 120.0).abs() / 120.0;
            assert!(
                rel < 0.1,
                "{} mean over replicates = {} ps, expected about 120 ps",
                row.estimator.display_name(),
                row.mean_tau
            );
            assert!(row.sd_tau.is_finite() && row.sd_tau >= 0.0);
            assert!(row.mean_sigma > 0.0);
        }
    }

    #[test]
    fn studies_need_at_least_two_replicates() {
        let err = run_study(&base_config(), 1).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn spread_helpers_match_hand_values() {
        let xs = [1.0, 2.0, 3.0];
        assert!((mean(&xs) - 2.0).abs() < 1e-12);
        assert!((sample_sd(&xs) - 1.0).abs() < 1e-12);
        assert!(sample_sd(&[5.0]).is_nan());
    }
}
