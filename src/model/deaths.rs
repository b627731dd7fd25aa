//! Death counts by age for one reference year, and the P(A) they imply.
//!
//! Counts are keyed by age rather than by row position, so alignment with a
//! query window never depends on where the table happens to start.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::DeathCount;
use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone)]
pub struct DeathAgeDistribution {
    counts: BTreeMap<i32, f64>,
    total: f64,
    min_age: i32,
    max_age: i32,
}

impl DeathAgeDistribution {
    /// Build from cleaned rows (aggregate row removed, missing counts dropped).
    ///
    /// The ages must form one contiguous run of non-negative integers.
    pub fn new(rows: &[DeathCount]) -> ModelResult<Self> {
        let mut counts = BTreeMap::new();
        for row in rows {
            if row.age < 0 {
                return Err(ModelError::MalformedInput(format!(
                    "death table age {} is negative",
                    row.age
                )));
            }
            if !(row.count.is_finite() && row.count >= 0.0) {
                return Err(ModelError::MalformedInput(format!(
                    "death count {} at age {} must be finite and >= 0",
                    row.count, row.age
                )));
            }
            if counts.insert(row.age, row.count).is_some() {
                return Err(ModelError::MalformedInput(format!(
                    "death table lists age {} more than once",
                    row.age
                )));
            }
        }

        let (Some((&min_age, _)), Some((&max_age, _))) = (counts.first_key_value(), counts.last_key_value())
        else {
            return Err(ModelError::MalformedInput("death table has no rows".into()));
        };

        if (max_age - min_age + 1) as usize != counts.len() {
            let missing = (min_age..=max_age)
                .find(|age| !counts.contains_key(age))
                .unwrap_or(min_age);
            return Err(ModelError::MalformedInput(format!(
                "death table ages {min_age}..={max_age} are not contiguous (age {missing} missing)"
            )));
        }

        let total: f64 = counts.values().sum();
        if total <= 0.0 {
            return Err(ModelError::DivisionByZero("death table total count is 0".into()));
        }

        debug!(min_age, max_age, total, "built death age distribution");

        Ok(Self {
            counts,
            total,
            min_age,
            max_age,
        })
    }

    pub fn min_age(&self) -> i32 {
        self.min_age
    }

    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    /// Sum of counts over the whole cleaned table.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Every age in the table, ascending.
    pub fn ages(&self) -> Vec<i32> {
        self.counts.keys().copied().collect()
    }

    /// `(age, count)` pairs, ascending by age.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.counts.iter().map(|(&age, &count)| (age, count))
    }

    pub fn contains(&self, age: i32) -> bool {
        self.counts.contains_key(&age)
    }

    pub fn raw_count(&self, age: i32) -> ModelResult<f64> {
        self.counts
            .get(&age)
            .copied()
            .ok_or_else(|| ModelError::AgeOutOfRange {
                age,
                reason: format!(
                    "death table covers ages {}..={}",
                    self.min_age, self.max_age
                ),
            })
    }

    /// P(A) = N(A) / total.
    pub fn probability(&self, age: i32) -> ModelResult<f64> {
        Ok(self.raw_count(age)? / self.total)
    }

    /// P(A) for each of `ages`, in order.
    pub fn probabilities(&self, ages: &[i32]) -> ModelResult<Vec<f64>> {
        ages.iter().map(|&age| self.probability(age)).collect()
    }
}
