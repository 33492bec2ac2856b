//! Reporting: formatted terminal output and JSON payloads.

pub mod format;

pub use format::*;
