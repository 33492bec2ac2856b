//! Lifetime estimation core.
//!
//! Responsibilities:
//!
//! - derive flight times from distances and the recoil velocity
//! - normalise raw intensities with per-distance calibration factors
//! - reduce adjacent distances into pairwise means and slopes
//! - pool per-pair estimates into a lifetime via inverse-variance weighting

pub mod estimator;
pub mod flight;
pub mod normalise;
pub mod pairwise;

pub use estimator::*;
pub use flight::*;
pub use normalise::*;
pub use pairwise::*;
