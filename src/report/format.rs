//! Reporting utilities: run summaries, pairwise tables, and JSON payloads.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use serde::Serialize;

use crate::data::SampleData;
use crate::domain::{EstimateConfig, EstimatorKind, VariantStats};
use crate::math::UncertainValue;
use crate::tau::{PairwiseSeries, TauEstimate};

/// JSON payload for a single estimate run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub true_tau_ps: f64,
    pub relative_velocity_um_per_ps: UncertainValue,
    pub measurements: Vec<MeasurementReport>,
    pub pairs: Vec<PairReport>,
    pub estimates: Vec<EstimateReport>,
}

/// One generated measurement row.
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementReport {
    pub distance_um: UncertainValue,
    pub flight_time_ps: f64,
    pub calibration: UncertainValue,
    pub unshifted: UncertainValue,
    pub shifted: UncertainValue,
}

/// One adjacent-pair row.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub pair: usize,
    pub t_lo_ps: f64,
    pub t_hi_ps: f64,
    pub unshifted_mean: UncertainValue,
    pub shifted_slope_per_ps: UncertainValue,
}

/// One estimator's pooled result.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport {
    pub estimator: EstimatorKind,
    pub tau_ps: UncertainValue,
    /// `None` when some per-pair estimate was exact and the weights
    /// saturated; the pooled uncertainty is then zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_sum: Option<f64>,
    /// Per-pair estimates in pair order (rates for rate-mean, lifetimes
    /// for lifetime-mean).
    pub per_pair: Vec<UncertainValue>,
}

/// JSON payload for a replicate study.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub true_tau_ps: f64,
    pub replicates: usize,
    pub variants: Vec<VariantStats>,
}

/// Assemble the JSON payload for a single run.
pub fn build_run_report(
    sample: &SampleData,
    flight_times: &[f64],
    pairs: &PairwiseSeries,
    estimates: &[TauEstimate],
) -> RunReport {
    let ds = &sample.dataset;

    let measurements = ds
        .distances
        .iter()
        .zip(ds.calibrations.iter())
        .zip(ds.unshifted.iter())
        .zip(ds.shifted.iter())
        .enumerate()
        .map(|(i, (((d, c), u), s))| MeasurementReport {
            distance_um: *d,
            flight_time_ps: flight_times.get(i).copied().unwrap_or(f64::NAN),
            calibration: *c,
            unshifted: *u,
            shifted: *s,
        })
        .collect();

    let pair_rows = pairs
        .unshifted_mean
        .iter()
        .zip(pairs.shifted_slope.iter())
        .enumerate()
        .map(|(k, (mean, slope))| PairReport {
            pair: k,
            t_lo_ps: flight_times.get(k).copied().unwrap_or(f64::NAN),
            t_hi_ps: flight_times.get(k + 1).copied().unwrap_or(f64::NAN),
            unshifted_mean: *mean,
            shifted_slope_per_ps: *slope,
        })
        .collect();

    let estimate_rows = estimates
        .iter()
        .map(|est| EstimateReport {
            estimator: est.estimator,
            tau_ps: est.tau,
            weight_sum: est.weight_sum.is_finite().then_some(est.weight_sum),
            per_pair: est.per_pair.clone(),
        })
        .collect();

    RunReport {
        true_tau_ps: sample.true_tau,
        relative_velocity_um_per_ps: ds.relative_velocity,
        measurements,
        pairs: pair_rows,
        estimates: estimate_rows,
    }
}

/// Assemble the JSON payload for a replicate study.
pub fn build_study_report(
    true_tau: f64,
    replicates: usize,
    stats: &[VariantStats],
) -> StudyReport {
    StudyReport {
        true_tau_ps: true_tau,
        replicates,
        variants: stats.to_vec(),
    }
}

/// Format the run header (generator settings + dataset extent).
pub fn format_run_summary(
    sample: &SampleData,
    flight_times: &[f64],
    config: &EstimateConfig,
) -> String {
    let ds = &sample.dataset;
    let mut out = String::new();

    out.push_str("=== rdds - recoil-distance lifetime estimate ===\n");
    out.push_str(&format!("True tau: {:.3} ps (synthetic)\n", sample.true_tau));
    out.push_str(&format!(
        "Velocity: {} um/ps\n",
        fmt_uncertain(ds.relative_velocity, 3)
    ));
    out.push_str(&format!(
        "Distances: n={} | d=[{:.3}, {:.3}] um | t=[{:.3}, {:.3}] ps\n",
        ds.len(),
        ds.distances.first().map(|v| v.value).unwrap_or(f64::NAN),
        ds.distances.last().map(|v| v.value).unwrap_or(f64::NAN),
        flight_times.first().copied().unwrap_or(f64::NAN),
        flight_times.last().copied().unwrap_or(f64::NAN),
    ));
    out.push_str(&format!(
        "Counts: {:.0} | noise={:.2} | seed={}\n",
        config.counts, config.noise, config.seed
    ));
    out.push_str(&format!(
        "Calibration: spread={:.3} | quoted sigma={:.3}\n",
        config.calibration_spread, config.calibration_error
    ));

    out
}

/// Format the per-pair table, one column per requested estimator.
pub fn format_pair_table(
    pairs: &PairwiseSeries,
    flight_times: &[f64],
    estimates: &[TauEstimate],
) -> String {
    let mut out = String::new();
    out.push_str("Pairwise quantities:\n");

    let mut header = format!(
        "{:>4} {:>10} {:>10} {:>22} {:>22}",
        "pair", "t_lo(ps)", "t_hi(ps)", "unshifted mean", "shifted slope(/ps)"
    );
    let mut rule = format!(
        "{:-<4} {:-<10} {:-<10} {:-<22} {:-<22}",
        "", "", "", "", ""
    );
    for est in estimates {
        let label = match est.estimator {
            EstimatorKind::RateMean => "rate(1/ps)",
            EstimatorKind::LifetimeMean => "tau(ps)",
        };
        header.push_str(&format!(" {label:>22}"));
        rule.push_str(&format!(" {:-<22}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for (k, (mean, slope)) in pairs
        .unshifted_mean
        .iter()
        .zip(pairs.shifted_slope.iter())
        .enumerate()
    {
        let mut row = format!(
            "{:>4} {:>10.3} {:>10.3} {:>22} {:>22}",
            k,
            flight_times.get(k).copied().unwrap_or(f64::NAN),
            flight_times.get(k + 1).copied().unwrap_or(f64::NAN),
            fmt_uncertain(*mean, 3),
            fmt_uncertain(*slope, 4),
        );
        for est in estimates {
            let cell = est
                .per_pair
                .get(k)
                .map(|v| fmt_uncertain(*v, 5))
                .unwrap_or_default();
            row.push_str(&format!(" {cell:>22}"));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

/// Format the pooled estimates block.
pub fn format_estimates(estimates: &[TauEstimate]) -> String {
    let mut out = String::new();
    out.push_str("Estimates:\n");
    for est in estimates {
        out.push_str(&format!(
            "  {:<14} tau = {:>12.4} ± {:>10.4} ps   (pairs={}, weight sum={})\n",
            est.estimator.display_name(),
            est.tau.value,
            est.tau.uncertainty,
            est.per_pair.len(),
            fmt_weight_sum(est.weight_sum),
        ));
    }
    out
}

/// Format the replicate-study table.
pub fn format_study_summary(true_tau: f64, replicates: usize, stats: &[VariantStats]) -> String {
    let mut out = String::new();
    out.push_str("=== rdds - replicate study ===\n");
    out.push_str(&format!(
        "Replicates: {replicates} | true tau: {true_tau:.3} ps\n\n"
    ));

    out.push_str(
        format!(
            "{:<14} {:>13} {:>12} {:>15} {:>8}\n",
            "estimator", "mean tau(ps)", "sd tau(ps)", "mean sigma(ps)", "bias"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<14} {:-<13} {:-<12} {:-<15} {:-<8}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in stats {
        let bias = (s.mean_tau - true_tau) / true_tau * 100.0;
        out.push_str(
            format!(
                "{:<14} {:>13.4} {:>12.4} {:>15.4} {:>7.2}%\n",
                s.estimator.display_name(),
                s.mean_tau,
                s.sd_tau,
                s.mean_sigma,
                bias
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_uncertain(v: UncertainValue, decimals: usize) -> String {
    format!(
        "{:.d$} ± {:.d$}",
        v.value,
        v.uncertainty,
        d = decimals
    )
}

fn fmt_weight_sum(w: f64) -> String {
    if w.is_finite() {
        format!("{w:.3}")
    } else {
        "saturated (exact inputs)".to_string()
    }
}
