//! Estimation over the input models.
//!
//! Responsibilities:
//!
//! - Bayes' rule for P(age at death | handedness) per study year (`bayes`)
//! - Monte-Carlo spread of the left/right age gap for finite cohorts (`sampling`)

pub mod bayes;
pub mod sampling;

pub use bayes::*;
pub use sampling::*;
