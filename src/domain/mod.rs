//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`VariantSpec`, `OutputFormat`)
//! - the measured dataset model (`Dataset`)
//! - estimator identities and study statistics (`EstimatorKind`, `VariantStats`)

pub mod types;

pub use types::*;
