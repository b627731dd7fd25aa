//! Summary statistics over probability-by-age arrays.
//!
//! Distributions coming out of the estimator may carry isolated undefined
//! entries at their edges, so every sum here is NaN-safe: a NaN term counts
//! as 0 instead of poisoning the whole result.

use crate::error::{ModelError, ModelResult};

/// Sum ignoring NaN terms.
pub fn nan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().filter(|v| !v.is_nan()).sum()
}

/// Mean age at death: `Σ ages[i] · probabilities[i]`.
pub fn expected_age(ages: &[i32], probabilities: &[f64]) -> ModelResult<f64> {
    ensure_aligned(ages, probabilities)?;
    Ok(nan_sum(
        ages.iter()
            .zip(probabilities)
            .map(|(&age, &p)| age as f64 * p),
    ))
}

/// Standard deviation of age at death around `expected_age`.
pub fn age_std_dev(ages: &[i32], probabilities: &[f64]) -> ModelResult<f64> {
    let mean = expected_age(ages, probabilities)?;
    let variance = nan_sum(ages.iter().zip(probabilities).map(|(&age, &p)| {
        let d = age as f64 - mean;
        d * d * p
    }));
    Ok(variance.max(0.0).sqrt())
}

fn ensure_aligned(ages: &[i32], probabilities: &[f64]) -> ModelResult<()> {
    if ages.len() != probabilities.len() {
        return Err(ModelError::MalformedInput(format!(
            "{} ages but {} probabilities",
            ages.len(),
            probabilities.len()
        )));
    }
    Ok(())
}

/// Running mean and sample variance (Welford).
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n: usize,
    mean: f64,
    m2: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.n += 1;
        let delta = value - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> usize {
        self.n
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 { f64::NAN } else { self.mean }
    }

    /// Sample standard deviation (n - 1 denominator); NaN below two values.
    pub fn std_dev(&self) -> f64 {
        if self.n > 1 {
            (self.m2 / (self.n as f64 - 1.0)).sqrt()
        } else {
            f64::NAN
        }
    }
}

/// Linear-interpolated quantile of an ascending slice, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_age_weights_ages() {
        let mean = expected_age(&[10, 20, 30], &[0.2, 0.3, 0.5]).unwrap();
        assert!((mean - 23.0).abs() < 1e-12, "got {mean}");
    }

    #[test]
    fn nan_terms_count_as_zero() {
        let mean = expected_age(&[10, 20, 30], &[f64::NAN, 0.5, 0.5]).unwrap();
        assert!((mean - 25.0).abs() < 1e-12);
        assert_eq!(nan_sum([f64::NAN, f64::NAN]), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_malformed() {
        assert!(matches!(
            expected_age(&[10, 20], &[1.0]),
            Err(ModelError::MalformedInput(_))
        ));
    }

    #[test]
    fn std_dev_of_two_point_distribution() {
        let sd = age_std_dev(&[60, 80], &[0.5, 0.5]).unwrap();
        assert!((sd - 10.0).abs() < 1e-12);
    }

    #[test]
    fn accumulator_matches_direct_formula() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut acc = Accumulator::new();
        for v in values {
            acc.add(v);
        }
        assert_eq!(acc.count(), 8);
        assert!((acc.mean() - 5.0).abs() < 1e-12);
        // Sample variance = 32 / 7.
        assert!((acc.std_dev() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(Accumulator::new().mean().is_nan());
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(3.0));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(5.0));
        assert_eq!(quantile_sorted(&sorted, 0.125), Some(1.5));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }
}
