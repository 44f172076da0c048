//! Command-line interface for the EVSA toolkit.

pub mod cli;
pub mod report;
