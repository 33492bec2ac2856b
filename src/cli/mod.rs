//! Command-line parsing for the recoil-distance lifetime estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation/math code.

use clap::{Parser, Subcommand};

use crate::domain::{OutputFormat, VariantSpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rdds", version, about = "Recoil-Distance Doppler-Shift lifetime estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic dataset, estimate the lifetime, and print the report.
    Estimate(EstimateArgs),
    /// Run many independent replicates and summarise estimator spread and bias.
    Study(StudyArgs),
}

/// Common options for dataset generation and estimation.
#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    /// True mean lifetime of the synthetic state (ps).
    #[arg(long, default_value_t = 120.0)]
    pub tau: f64,

    /// Number of target-to-stopper distances.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub distances: usize,

    /// Shortest distance (um).
    #[arg(long, default_value_t = 10.0)]
    pub distance_min: f64,

    /// Longest distance (um).
    #[arg(long, default_value_t = 2000.0)]
    pub distance_max: f64,

    /// Quoted 1-sigma distance uncertainty (um).
    #[arg(long, default_value_t = 0.5)]
    pub distance_error: f64,

    /// Mean recoil velocity (um/ps).
    #[arg(short = 'v', long, default_value_t = 5.0)]
    pub velocity: f64,

    /// 1-sigma velocity uncertainty (um/ps).
    #[arg(long, default_value_t = 0.05)]
    pub velocity_error: f64,

    /// Decays observed per distance at time zero (intensity scale).
    #[arg(long, default_value_t = 10_000.0)]
    pub counts: f64,

    /// Spread of the per-distance calibration factors around 1.
    #[arg(long, default_value_t = 0.05)]
    pub calibration_spread: f64,

    /// Quoted 1-sigma uncertainty of each calibration factor.
    #[arg(long, default_value_t = 0.01)]
    pub calibration_error: f64,

    /// Counting-noise scale (0 = exact decay curves, 1 = Poisson-like).
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Random seed for dataset synthesis.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Which estimator variant(s) to run.
    #[arg(long, value_enum, default_value_t = VariantSpec::Both)]
    pub variant: VariantSpec,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip the per-pair table in text reports.
    #[arg(long)]
    pub no_pairs: bool,
}

/// Options for a replicate study.
#[derive(Debug, Parser)]
pub struct StudyArgs {
    #[command(flatten)]
    pub estimate: EstimateArgs,

    /// Number of independent replicates.
    #[arg(short = 'r', long, default_value_t = 200)]
    pub replicates: usize,
}
