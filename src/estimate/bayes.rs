//! Bayes' rule for age at death given handedness.
//!
//! ```text
//! P(A | LH) = P(LH | A) · P(A) / P(LH)
//! P(A | RH) = (1 - P(LH | A)) · P(A) / (1 - P(LH))
//! ```
//!
//! `P(A)` and `P(LH)` share one denominator, the total count of the whole death
//! table, so each conditional distribution sums to 1 over the table's ages.

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{Handedness, StudyEstimate};
use crate::error::{ModelError, ModelResult};
use crate::math::expected_age;
use crate::model::{DeathAgeDistribution, SurveyRateModel};

/// Read-only view over the two input models.
#[derive(Debug, Clone, Copy)]
pub struct BayesEstimator<'a> {
    survey: &'a SurveyRateModel,
    deaths: &'a DeathAgeDistribution,
}

impl<'a> BayesEstimator<'a> {
    pub fn new(survey: &'a SurveyRateModel, deaths: &'a DeathAgeDistribution) -> Self {
        Self { survey, deaths }
    }

    pub fn survey(&self) -> &'a SurveyRateModel {
        self.survey
    }

    pub fn deaths(&self) -> &'a DeathAgeDistribution {
        self.deaths
    }

    /// P(LH | A) for each of `ages`.
    pub fn rate_given_age(&self, ages: &[i32], study_year: i32) -> ModelResult<Vec<f64>> {
        self.survey.rate_given_age(ages, study_year)
    }

    /// P(LH) = Σ_A P(LH | A) · N(A) / Σ_A N(A), over every age in the death table.
    pub fn overall_left_probability(&self, study_year: i32) -> ModelResult<f64> {
        let ages = self.deaths.ages();
        let rates = DVector::from_vec(self.survey.rate_given_age(&ages, study_year)?);
        let counts = DVector::from_iterator(ages.len(), self.deaths.iter().map(|(_, count)| count));
        Ok(rates.dot(&counts) / self.deaths.total())
    }

    /// P(hand) for either group.
    pub fn overall_handedness_probability(&self, study_year: i32, hand: Handedness) -> ModelResult<f64> {
        Ok(hand.apply(self.overall_left_probability(study_year)?))
    }

    /// P(A | hand) for each of `ages`.
    pub fn conditional_age_probability(
        &self,
        ages: &[i32],
        study_year: i32,
        hand: Handedness,
    ) -> ModelResult<Vec<f64>> {
        let rates = self.survey.rate_given_age(ages, study_year)?;
        let p_age = self.deaths.probabilities(ages)?;
        let p_left = self.overall_left_probability(study_year)?;
        bayes(&rates, &p_age, p_left, study_year, hand)
    }

    /// Both conditional distributions and their means for one study year.
    pub fn estimate(&self, ages: &[i32], study_year: i32) -> ModelResult<StudyEstimate> {
        let p_lh_given_age = self.survey.rate_given_age(ages, study_year)?;
        let p_age = self.deaths.probabilities(ages)?;
        let p_left = self.overall_left_probability(study_year)?;

        let p_age_given_lh = bayes(&p_lh_given_age, &p_age, p_left, study_year, Handedness::Left)?;
        let p_age_given_rh = bayes(&p_lh_given_age, &p_age, p_left, study_year, Handedness::Right)?;
        let mean_age_left = expected_age(ages, &p_age_given_lh)?;
        let mean_age_right = expected_age(ages, &p_age_given_rh)?;

        debug!(
            study_year,
            p_left, mean_age_left, mean_age_right, "estimated age at death by handedness"
        );

        Ok(StudyEstimate {
            study_year,
            ages: ages.to_vec(),
            p_lh_given_age,
            p_age,
            p_age_given_lh,
            p_age_given_rh,
            p_left,
            mean_age_left,
            mean_age_right,
        })
    }
}

fn bayes(rates: &[f64], p_age: &[f64], p_left: f64, study_year: i32, hand: Handedness) -> ModelResult<Vec<f64>> {
    let p_hand = hand.apply(p_left);
    if !(p_hand.is_finite() && p_hand > 0.0) {
        return Err(ModelError::DivisionByZero(format!(
            "P({}) = {p_hand} for study year {study_year}",
            hand.display_name()
        )));
    }

    let p_hand_given_age = DVector::from_iterator(rates.len(), rates.iter().map(|&r| hand.apply(r)));
    let p_age = DVector::from_column_slice(p_age);
    let posterior = p_hand_given_age.component_mul(&p_age) / p_hand;
    Ok(posterior.iter().copied().collect())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::DeathCount;
    use crate::model::fixtures::synthetic_survey_model;
    use proptest::prelude::*;

    fn death_table() -> impl Strategy<Value = Vec<DeathCount>> {
        (0i32..20, prop::collection::vec(0.0f64..1000.0, 1..130)).prop_map(|(start, counts)| {
            counts
                .into_iter()
                .enumerate()
                // +1 keeps the total strictly positive.
                .map(|(i, count)| DeathCount { age: start + i as i32, count: count + 1.0 })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Each conditional sums to 1 over the full table.
        #[test]
        fn prop_conditionals_normalize(rows in death_table(), study_year in 1986i32..2040) {
            let survey = synthetic_survey_model();
            let deaths = DeathAgeDistribution::new(&rows).unwrap();
            let est = BayesEstimator::new(&survey, &deaths);
            let ages = deaths.ages();
            for hand in Handedness::ALL {
                let p = est.conditional_age_probability(&ages, study_year, hand).unwrap();
                let total: f64 = p.iter().sum();
                prop_assert!((total - 1.0).abs() < 1e-9, "{:?} sums to {}", hand, total);
                prop_assert!(p.iter().all(|&v| (0.0..=1.0 + 1e-12).contains(&v)));
            }
            let p_left = est.overall_left_probability(study_year).unwrap();
            prop_assert!(p_left > 0.0 && p_left < 1.0);
        }

        /// No hidden state between calls.
        #[test]
        fn prop_estimate_idempotent(rows in death_table(), study_year in 1986i32..2040) {
            let survey = synthetic_survey_model();
            let deaths = DeathAgeDistribution::new(&rows).unwrap();
            let est = BayesEstimator::new(&survey, &deaths);
            let ages = deaths.ages();
            prop_assert_eq!(est.estimate(&ages, study_year).unwrap(), est.estimate(&ages, study_year).unwrap());
        }
    }
}
