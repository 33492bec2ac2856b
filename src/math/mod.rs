//! Mathematical utilities: uncertainty propagation and weighted means.

pub mod uncertain;

pub use uncertain::*;
