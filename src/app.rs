//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - generates synthetic RDDS datasets
//! - runs the lifetime estimation pipeline
//! - prints reports (plain text or JSON)

use clap::Parser;

use crate::cli::{Command, EstimateArgs, StudyArgs};
use crate::domain::{EstimateConfig, OutputFormat};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rdds` binary.
pub fn run() -> Result<(), AppError> {
    // We want `rdds` and `rdds --tau 80` to behave like `rdds estimate ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Study(args) => handle_study(args),
    }
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(&args);
    let run = pipeline::run_estimate(&config)?;

    match config.format {
        OutputFormat::Text => {
            println!(
                "{}",
                crate::report::format_run_summary(&run.sample, &run.flight_times, &config)
            );
            if config.show_pairs {
                println!(
                    "{}",
                    crate::report::format_pair_table(&run.pairwise, &run.flight_times, &run.estimates)
                );
            }
            println!("{}", crate::report::format_estimates(&run.estimates));
        }
        OutputFormat::Json => {
            let report = crate::report::build_run_report(
                &run.sample,
                &run.flight_times,
                &run.pairwise,
                &run.estimates,
            );
            println!("{}", render_json(&report)?);
        }
    }

    Ok(())
}

fn handle_study(args: StudyArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(&args.estimate);
    let study = pipeline::run_study(&config, args.replicates)?;

    match config.format {
        OutputFormat::Text => {
            println!(
                "{}",
                crate::report::format_study_summary(study.true_tau, study.replicates, &study.stats)
            );
        }
        OutputFormat::Json => {
            let report =
                crate::report::build_study_report(study.true_tau, study.replicates, &study.stats);
            println!("{}", render_json(&report)?);
        }
    }

    Ok(())
}

fn render_json<T: serde::Serialize>(payload: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(payload)
        .map_err(|e| AppError::new(4, format!("Failed to serialise report to JSON: {e}")))
}

pub fn estimate_config_from_args(args: &EstimateArgs) -> EstimateConfig {
    EstimateConfig {
        true_tau: args.tau,
        n_distances: args.distances,
        distance_min: args.distance_min,
        distance_max: args.distance_max,
        distance_error: args.distance_error,
        velocity: args.velocity,
        velocity_error: args.velocity_error,
        counts: args.counts,
        calibration_spread: args.calibration_spread,
        calibration_error: args.calibration_error,
        noise: args.noise,
        seed: args.seed,
        variant: args.variant,
        format: args.format,
        show_pairs: !args.no_pairs,
    }
}

/// Rewrite argv so `rdds` defaults to `rdds estimate`.
///
/// Rules:
/// - `rdds`                      -> `rdds estimate`
/// - `rdds --tau 80 ...`         -> `rdds estimate --tau 80 ...`
/// - `rdds --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("estimate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "study");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "estimate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "estimate".to_string());
        return argv;
    }

    // Otherwise, leave as-is and let clap report the unknown subcommand.
    argv
}
