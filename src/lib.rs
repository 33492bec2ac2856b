//! `rdds-tau` library crate.
//!
//! The binary (`rdds`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future analysis notebooks or services)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod math;
pub mod report;
pub mod tau;
