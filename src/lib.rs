//! `handedness-age` library crate.
//!
//! Estimates the distribution of age at death for left- and right-handed people
//! from a handedness survey and a death-age table, using Bayes' rule.
//!
//! The binary (`handage`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or touching the network
//! - the estimator is reusable outside the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod io;
pub mod logging;
pub mod math;
pub mod model;
pub mod plot;
pub mod report;
