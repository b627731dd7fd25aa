//! Survey-based P(LH | age of death).
//!
//! The survey reports left-handedness by age at survey time. Because the
//! reporting rate depends on the *birth year* rather than on age, we re-key the
//! rows by `birth_year = reference_survey_year - age` and answer queries for any
//! study year through the same key:
//!
//! ```text
//! P(LH | A, study_year) = mean_rate(birth_year = study_year - A) / 100
//! ```
//!
//! Outside the surveyed birth years the rate is extrapolated flat, using the
//! mean of `extrapolation_sample_size` rows at the matching end of the survey.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{ModelConfig, StudyParameters, SurveyObservation, SurveyRate};
use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone)]
pub struct SurveyRateModel {
    rates: Vec<SurveyRate>,
    /// Mean rate (percent) keyed by birth year.
    by_birth_year: HashMap<i32, f64>,
    reference_year: i32,
    min_age: i32,
    max_age: i32,
    /// Extrapolated P(LH) for ages of death below the youngest covered age.
    young_edge_rate: f64,
    /// Extrapolated P(LH) for ages of death above the oldest covered age.
    old_edge_rate: f64,
}

impl SurveyRateModel {
    /// Build the model from survey rows sorted ascending by age.
    pub fn new(observations: &[SurveyObservation], config: &ModelConfig) -> ModelResult<Self> {
        let k = config.extrapolation_sample_size;
        if observations.is_empty() {
            return Err(ModelError::MalformedInput("survey table has no rows".into()));
        }
        if k == 0 || k > observations.len() {
            return Err(ModelError::MalformedInput(format!(
                "extrapolation sample size {k} must be between 1 and the survey row count {}",
                observations.len()
            )));
        }

        let mut rates = Vec::with_capacity(observations.len());
        for (idx, obs) in observations.iter().enumerate() {
            if idx > 0 && obs.age <= observations[idx - 1].age {
                return Err(ModelError::MalformedInput(format!(
                    "survey ages must be strictly increasing (age {} follows {})",
                    obs.age,
                    observations[idx - 1].age
                )));
            }
            for (label, value) in [("male", obs.male), ("female", obs.female)] {
                if !(value.is_finite() && (0.0..=100.0).contains(&value)) {
                    return Err(ModelError::MalformedInput(format!(
                        "survey {label} rate {value} at age {} is not a percentage in [0, 100]",
                        obs.age
                    )));
                }
            }
            rates.push(SurveyRate {
                age: obs.age,
                birth_year: config.reference_survey_year - obs.age,
                male_rate: obs.male,
                female_rate: obs.female,
                mean_rate: (obs.male + obs.female) / 2.0,
            });
        }

        let young_edge_rate = mean_rate(&rates[..k]) / 100.0;
        let old_edge_rate = mean_rate(&rates[rates.len() - k..]) / 100.0;
        let by_birth_year = rates.iter().map(|r| (r.birth_year, r.mean_rate)).collect();
        let min_age = rates[0].age;
        let max_age = rates[rates.len() - 1].age;

        debug!(
            rows = rates.len(),
            min_age, max_age, young_edge_rate, old_edge_rate, "built survey rate model"
        );

        Ok(Self {
            rates,
            by_birth_year,
            reference_year: config.reference_survey_year,
            min_age,
            max_age,
            young_edge_rate,
            old_edge_rate,
        })
    }

    pub fn rates(&self) -> &[SurveyRate] {
        &self.rates
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn min_age(&self) -> i32 {
        self.min_age
    }

    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    pub fn young_edge_rate(&self) -> f64 {
        self.young_edge_rate
    }

    pub fn old_edge_rate(&self) -> f64 {
        self.old_edge_rate
    }

    /// Smallest age of death whose birth year the survey covers.
    pub fn youngest_age(&self, study_year: i32) -> i32 {
        study_year - self.reference_year + self.min_age
    }

    /// Largest age of death whose birth year the survey covers.
    pub fn oldest_age(&self, study_year: i32) -> i32 {
        study_year - self.reference_year + self.max_age
    }

    /// P(LH | age of death) for a single age.
    ///
    /// A birth year inside the surveyed window but missing from the table is an
    /// `AgeOutOfRange` error rather than an extrapolated value.
    pub fn rate_for_age(&self, age: i32, study_year: i32) -> ModelResult<f64> {
        if age > self.oldest_age(study_year) {
            return Ok(self.old_edge_rate);
        }
        if age < self.youngest_age(study_year) {
            return Ok(self.young_edge_rate);
        }
        let birth_year = StudyParameters { study_year }.birth_year(age);
        self.by_birth_year
            .get(&birth_year)
            .map(|rate| rate / 100.0)
            .ok_or_else(|| ModelError::AgeOutOfRange {
                age,
                reason: format!(
                    "study year {study_year}: birth year {birth_year} is inside the surveyed range but has no survey row"
                ),
            })
    }

    /// P(LH | age of death) for each of `ages`, in order.
    pub fn rate_given_age(&self, ages: &[i32], study_year: i32) -> ModelResult<Vec<f64>> {
        ages.iter().map(|&age| self.rate_for_age(age, study_year)).collect()
    }
}

fn mean_rate(rows: &[SurveyRate]) -> f64 {
    rows.iter().map(|r| r.mean_rate).sum::<f64>() / rows.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{synthetic_survey, synthetic_survey_model};

    #[test]
    fn rows_are_keyed_by_birth_year_with_mean_rate() {
        let model = synthetic_survey_model();
        let first = model.rates()[0];
        assert_eq!(first.age, 10);
        assert_eq!(first.birth_year, 1976);
        assert!((first.mean_rate - 13.0).abs() < 1e-12);
        assert_eq!(model.rates().last().map(|r| r.birth_year), Some(1900));
    }

    #[test]
    fn coverage_window_shifts_with_study_year() {
        let model = synthetic_survey_model();
        assert_eq!(model.youngest_age(1990), 14);
        assert_eq!(model.oldest_age(1990), 90);
        assert_eq!(model.youngest_age(2018), 42);
        assert_eq!(model.oldest_age(2018), 118);
    }

    #[test]
    fn in_range_ages_use_exact_birth_year() {
        let model = synthetic_survey_model();
        // Died aged 60 in 1990 -> born 1930 -> surveyed aged 56 in 1986.
        let expected = (13.0 - 8.0 * 16.0 / 46.0) / 100.0;
        let got = model.rate_for_age(60, 1990).unwrap();
        assert!((got - expected).abs() < 1e-12, "got {got}, expected {expected}");
    }

    #[test]
    fn out_of_range_ages_use_edge_means() {
        let model = synthetic_survey_model();
        let rates = model.rate_given_age(&[0, 13, 91, 119], 1990).unwrap();
        assert_eq!(rates[0], model.young_edge_rate());
        assert_eq!(rates[1], model.young_edge_rate());
        assert_eq!(rates[2], model.old_edge_rate());
        assert_eq!(rates[3], model.old_edge_rate());

        // Young edge: survey ages 10..=19 are all in the flat 13% region.
        assert!((model.young_edge_rate() - 0.13).abs() < 1e-12);
        // Old edge: mean over survey ages 77..=86.
        let old: f64 = (77..=86).map(|s| 13.0 - 8.0 * (s - 40) as f64 / 46.0).sum::<f64>() / 1000.0;
        assert!((model.old_edge_rate() - old).abs() < 1e-12);
    }

    #[test]
    fn boundaries_are_inclusive_lookups() {
        let model = synthetic_survey_model();
        let youngest = model.rate_for_age(14, 1990).unwrap();
        let oldest = model.rate_for_age(90, 1990).unwrap();
        assert!((youngest - 0.13).abs() < 1e-12);
        assert!((oldest - 0.05).abs() < 1e-12);
    }

    #[test]
    fn birth_year_gap_is_an_error() {
        let mut rows = synthetic_survey();
        rows.retain(|r| r.age != 50);
        let model = SurveyRateModel::new(&rows, &ModelConfig::default()).unwrap();

        // Died aged 54 in 1990 -> born 1936 -> would have been surveyed at 50.
        let err = model.rate_given_age(&[53, 54, 55], 1990).unwrap_err();
        match err {
            ModelError::AgeOutOfRange { age, reason } => {
                assert_eq!(age, 54);
                assert!(reason.contains("birth year 1936"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_tables() {
        let config = ModelConfig::default();
        assert!(matches!(
            SurveyRateModel::new(&[], &config),
            Err(ModelError::MalformedInput(_))
        ));

        let mut unsorted = synthetic_survey();
        unsorted.swap(3, 4);
        assert!(matches!(
            SurveyRateModel::new(&unsorted, &config),
            Err(ModelError::MalformedInput(_))
        ));

        let mut bad_rate = synthetic_survey();
        bad_rate[5].female = 140.0;
        assert!(matches!(
            SurveyRateModel::new(&bad_rate, &config),
            Err(ModelError::MalformedInput(_))
        ));

        let short = &synthetic_survey()[..5];
        assert!(matches!(
            SurveyRateModel::new(short, &config),
            Err(ModelError::MalformedInput(_))
        ));
        let zero = ModelConfig {
            extrapolation_sample_size: 0,
            ..config
        };
        assert!(SurveyRateModel::new(&synthetic_survey(), &zero).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use crate::model::fixtures::synthetic_survey_model;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Every answer is a probability.
        #[test]
        fn prop_rates_are_probabilities(
            ages in prop::collection::vec(0i32..130, 1..200),
            study_year in 1986i32..2040,
        ) {
            let model = synthetic_survey_model();
            let rates = model.rate_given_age(&ages, study_year).unwrap();
            prop_assert_eq!(rates.len(), ages.len());
            for r in rates {
                prop_assert!((0.0..=1.0).contains(&r), "rate {} outside [0, 1]", r);
            }
        }

        /// Past the covered window the rate is flat.
        #[test]
        fn prop_constant_beyond_boundaries(study_year in 1986i32..2040, extra in 1i32..60) {
            let model = synthetic_survey_model();
            let oldest = model.oldest_age(study_year);
            let youngest = model.youngest_age(study_year);
            prop_assert_eq!(model.rate_for_age(oldest + extra, study_year).unwrap(), model.old_edge_rate());
            prop_assert_eq!(model.rate_for_age(youngest - extra, study_year).unwrap(), model.young_edge_rate());
        }

        /// Pure lookups: same input, same output.
        #[test]
        fn prop_idempotent(ages in prop::collection::vec(0i32..130, 0..50), study_year in 1986i32..2040) {
            let model = synthetic_survey_model();
            prop_assert_eq!(
                model.rate_given_age(&ages, study_year).unwrap(),
                model.rate_given_age(&ages, study_year).unwrap()
            );
        }
    }
}
