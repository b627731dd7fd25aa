//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - handedness and the raw/derived table rows (`SurveyObservation`, `SurveyRate`, `DeathCount`)
//! - configuration (`ModelConfig`, `EstimateConfig`, `RatesConfig`, `SimulateConfig`)
//! - estimation outputs (`StudyEstimate`, `RunFile`)

pub mod types;

pub use types::*;
