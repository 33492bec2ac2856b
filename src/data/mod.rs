//! Dataset acquisition: synthetic plunger measurements.

pub mod sample;

pub use sample::*;
