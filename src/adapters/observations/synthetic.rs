//! Synthetic heart-rate readings

use crate::domain::ids::LocalId;
use crate::domain::{EdgeError, ObservationRecord, Result};
use chrono::{DateTime, Duration, FixedOffset, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Latest reading lies at most this many minutes in the past
const WINDOW_MINUTES: i64 = 1440;

/// Random observation generator bounded by a maximum count per call
pub struct SyntheticSource {
    max_count: usize,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(max_count: usize) -> Self {
        Self {
            max_count,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests
    pub fn with_seed(max_count: usize, seed: u64) -> Self {
        Self {
            max_count,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// `count` readings with values uniform in `[low, high]`, each taken at
    /// a random minute within the last 24 hours
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `count` exceeds the maximum or `low > high`
    pub fn generate(
        &mut self,
        local_id: &LocalId,
        count: usize,
        low: u32,
        high: u32,
    ) -> Result<Vec<ObservationRecord>> {
        if count > self.max_count {
            return Err(EdgeError::Validation(format!(
                "observation count {count} exceeds the maximum of {}",
                self.max_count
            )));
        }
        if low > high {
            return Err(EdgeError::Validation(format!(
                "low value {low} is greater than high value {high}"
            )));
        }

        let now: DateTime<FixedOffset> = Local::now().into();
        let observations = (0..count)
            .map(|_| {
                let value = self.rng.gen_range(low..=high);
                let minutes_ago = self.rng.gen_range(0..=WINDOW_MINUTES);
                ObservationRecord::new(
                    local_id.clone(),
                    f64::from(value),
                    now - Duration::minutes(minutes_ago),
                )
            })
            .collect();

        tracing::debug!(local_id = %local_id, count, low, high, "Generated synthetic observations");
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mary() -> LocalId {
        LocalId::new("356-444-9972").unwrap()
    }

    #[test]
    fn test_generate_within_bounds() {
        let mut source = SyntheticSource::with_seed(1000, 7);
        let before: DateTime<FixedOffset> = Local::now().into();
        let observations = source.generate(&mary(), 200, 60, 120).unwrap();

        assert_eq!(observations.len(), 200);
        for obs in &observations {
            assert!((60.0..=120.0).contains(&obs.value));
            assert!(obs.effective <= Local::now());
            assert!(obs.effective >= before - Duration::minutes(WINDOW_MINUTES + 1));
            assert!(!obs.subject.is_resolved());
        }
    }

    #[test]
    fn test_generate_single_value_range() {
        let mut source = SyntheticSource::with_seed(10, 1);
        let observations = source.generate(&mary(), 3, 72, 72).unwrap();
        assert!(observations.iter().all(|o| o.value == 72.0));
    }

    #[test]
    fn test_generate_rejects_count_over_max() {
        let mut source = SyntheticSource::new(1000);
        assert!(source.generate(&mary(), 1000, 60, 120).is_ok());
        let result = source.generate(&mary(), 1001, 60, 120);
        assert!(matches!(result, Err(EdgeError::Validation(_))));
    }

    #[test]
    fn test_generate_rejects_inverted_range() {
        let mut source = SyntheticSource::new(10);
        let result = source.generate(&mary(), 1, 120, 60);
        assert!(matches!(result, Err(EdgeError::Validation(_))));
    }

    #[test]
    fn test_generate_zero() {
        let mut source = SyntheticSource::new(10);
        assert!(source.generate(&mary(), 0, 60, 120).unwrap().is_empty());
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = SyntheticSource::with_seed(10, 42);
        let mut b = SyntheticSource::with_seed(10, 42);
        let va: Vec<f64> = a.generate(&mary(), 5, 60, 160).unwrap().iter().map(|o| o.value).collect();
        let vb: Vec<f64> = b.generate(&mary(), 5, 60, 160).unwrap().iter().map(|o| o.value).collect();
        assert_eq!(va, vb);
    }
}
