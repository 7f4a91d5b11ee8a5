//! Compression quality and the descending schedule the re-encoder walks.

use crate::{ImageError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing computed quality levels.
const EPSILON: f64 = 1e-6;

/// A compression quality in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quality(f64);

impl Quality {
    /// Highest quality, the starting point of every search.
    pub const MAX: Quality = Quality(1.0);

    /// Validate and wrap a quality value.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 && value <= 1.0 + EPSILON {
            Ok(Self(value.min(1.0)))
        } else {
            Err(ImageError::InvalidQuality(format!(
                "{value} is outside (0, 1]"
            )))
        }
    }

    /// The raw value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Quality on the 1..=100 scale JPEG encoders expect.
    pub fn as_percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl TryFrom<f64> for Quality {
    type Error = ImageError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for f64 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Smallest step a schedule accepts. Keeps a search at 100 attempts or fewer.
pub const MIN_QUALITY_STEP: f64 = 0.01;

/// Linear descending schedule of quality levels.
///
/// Levels are computed from their index, not by repeated subtraction, so
/// 1.0 - 0.1 * 3 is exactly 0.7 after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySchedule {
    start: Quality,
    step: f64,
    floor: Quality,
}

impl Default for QualitySchedule {
    fn default() -> Self {
        Self {
            start: Quality::MAX,
            step: 0.1,
            floor: Quality(0.1),
        }
    }
}

impl QualitySchedule {
    /// Schedule starting at 1.0 with the given step and floor.
    pub fn new(step: f64, floor: f64) -> Result<Self> {
        let floor = Quality::new(floor)?;
        if !step.is_finite() || !(MIN_QUALITY_STEP..=1.0).contains(&step) {
            return Err(ImageError::InvalidQuality(format!(
                "step {step} is outside [{MIN_QUALITY_STEP}, 1]"
            )));
        }

        Ok(Self {
            start: Quality::MAX,
            step,
            floor,
        })
    }

    /// The step between consecutive levels.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The lowest level visited.
    pub fn floor(&self) -> Quality {
        self.floor
    }

    /// Upper bound on the number of attempts.
    pub fn max_attempts(&self) -> usize {
        let span = self.start.value() - self.floor.value();
        (span / self.step + EPSILON).floor() as usize + 1
    }

    /// Level at `index`, or `None` past the floor.
    pub fn level(&self, index: usize) -> Option<Quality> {
        if index >= self.max_attempts() {
            return None;
        }
        let raw = self.start.value() - self.step * index as f64;
        let rounded = (raw * 10_000.0).round() / 10_000.0;
        Quality::new(rounded).ok()
    }

    /// All levels from highest to lowest.
    pub fn levels(&self) -> impl Iterator<Item = Quality> + '_ {
        (0..self.max_attempts()).map_while(|index| self.level(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quality_bounds() {
        assert!(Quality::new(1.0).is_ok());
        assert!(Quality::new(0.05).is_ok());
        assert!(Quality::new(0.0).is_err());
        assert!(Quality::new(-0.1).is_err());
        assert!(Quality::new(1.5).is_err());
        assert!(Quality::new(f64::NAN).is_err());
    }

    #[test]
    fn test_as_percent() {
        assert_eq!(Quality::MAX.as_percent(), 100);
        assert_eq!(Quality::new(0.7).unwrap().as_percent(), 70);
        assert_eq!(Quality::new(0.001).unwrap().as_percent(), 1);
    }

    #[test]
    fn test_default_schedule_has_ten_levels() {
        let schedule = QualitySchedule::default();
        let levels: Vec<f64> = schedule.levels().map(Quality::value).collect();
        assert_eq!(
            levels,
            vec![1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1]
        );
        assert_eq!(schedule.max_attempts(), 10);
    }

    #[test]
    fn test_coarse_schedule() {
        let schedule = QualitySchedule::new(0.25, 0.3).unwrap();
        let levels: Vec<f64> = schedule.levels().map(Quality::value).collect();
        assert_eq!(levels, vec![1.0, 0.75, 0.5]);
    }

    #[test]
    fn test_invalid_schedule() {
        assert!(QualitySchedule::new(0.0, 0.1).is_err());
        assert!(QualitySchedule::new(1.1, 0.1).is_err());
        assert!(QualitySchedule::new(0.1, 0.0).is_err());
        assert!(QualitySchedule::new(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_tiny_step_is_rejected() {
        assert!(QualitySchedule::new(1e-12, 0.1).is_err());
        assert!(QualitySchedule::new(0.009, 0.1).is_err());

        let finest = QualitySchedule::new(MIN_QUALITY_STEP, 0.01).unwrap();
        assert_eq!(finest.max_attempts(), 100);
        assert_eq!(finest.levels().count(), 100);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: Quality = serde_json::from_str("0.5").unwrap();
        assert_eq!(ok.value(), 0.5);
        assert!(serde_json::from_str::<Quality>("2.0").is_err());
    }

    proptest! {
        #[test]
        fn prop_levels_strictly_decrease_and_stay_in_range(
            step in 0.01f64..=1.0,
            floor in 0.01f64..=1.0,
        ) {
            let schedule = QualitySchedule::new(step, floor).unwrap();
            let levels: Vec<f64> = schedule.levels().map(Quality::value).collect();

            prop_assert!(!levels.is_empty());
            prop_assert_eq!(levels[0], 1.0);
            prop_assert!(levels.len() <= schedule.max_attempts());
            for pair in levels.windows(2) {
                prop_assert!(pair[1] < pair[0]);
            }
            for level in &levels {
                prop_assert!(*level > 0.0 && *level <= 1.0);
                prop_assert!(*level >= floor - 1e-3);
            }
        }
    }
}
