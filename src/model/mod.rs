//! The two immutable input models of the estimator.
//!
//! - `SurveyRateModel`: P(LH | age of death) from birth-year-keyed survey rates
//! - `DeathAgeDistribution`: P(age of death) from a reference-year death table

pub mod deaths;
pub mod survey;

pub use deaths::*;
pub use survey::*;

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic tables shared by unit tests.
    //!
    //! The survey mirrors the published shape: ~13% left-handed for anyone
    //! surveyed at 40 or younger, falling linearly to 5% at 86.

    use super::{DeathAgeDistribution, SurveyRateModel};
    use crate::domain::{DeathCount, ModelConfig, SurveyObservation};

    pub fn synthetic_survey() -> Vec<SurveyObservation> {
        (10..=86)
            .map(|age| {
                let rate = if age <= 40 {
                    13.0
                } else {
                    13.0 - 8.0 * (age - 40) as f64 / 46.0
                };
                SurveyObservation {
                    age,
                    male: rate + 1.0,
                    female: rate - 1.0,
                }
            })
            .collect()
    }

    pub fn synthetic_survey_model() -> SurveyRateModel {
        SurveyRateModel::new(&synthetic_survey(), &ModelConfig::default()).unwrap()
    }

    /// 100 deaths at every age 0..=119 (total 12000).
    pub fn uniform_deaths() -> Vec<DeathCount> {
        (0..120).map(|age| DeathCount { age, count: 100.0 }).collect()
    }

    /// Bell-shaped deaths peaking at 78 over ages 0..=110.
    pub fn bell_deaths() -> Vec<DeathCount> {
        (0..=110)
            .map(|age| {
                let z = (age as f64 - 78.0) / 12.0;
                DeathCount {
                    age,
                    count: 1000.0 * (-z * z / 2.0).exp() + 5.0,
                }
            })
            .collect()
    }

    pub fn uniform_distribution() -> DeathAgeDistribution {
        DeathAgeDistribution::new(&uniform_deaths()).unwrap()
    }

    pub fn bell_distribution() -> DeathAgeDistribution {
        DeathAgeDistribution::new(&bell_deaths()).unwrap()
    }
}
