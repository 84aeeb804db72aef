//! The ordered set of hours-before-deadline at which reminders fire.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

/// Largest accepted threshold: one year.
pub const MAX_THRESHOLD_HOURS: f64 = 8_760.0;

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("at least one reminder threshold is required")]
    Empty,

    #[error("'{0}' is not a number of hours")]
    NotANumber(String),

    #[error("threshold {0}h must be a positive, finite number of hours")]
    NotPositive(f64),

    #[error("threshold {0}h exceeds the {MAX_THRESHOLD_HOURS}h maximum")]
    TooLarge(f64),

    #[error("thresholds must be strictly decreasing ({0}h is not below {1}h)")]
    NotDecreasing(f64, f64),
}

/// Non-empty, strictly decreasing, positive hours, e.g. `[4, 3, 2, 1]`.
///
/// A record's next reminder is `thresholds[reminders_sent]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderThresholds {
    hours: Vec<f64>,
}

impl ReminderThresholds {
    pub fn new(hours: Vec<f64>) -> Result<Self, ThresholdError> {
        if hours.is_empty() {
            return Err(ThresholdError::Empty);
        }
        for &h in &hours {
            if !h.is_finite() || h <= 0.0 {
                return Err(ThresholdError::NotPositive(h));
            }
            if h > MAX_THRESHOLD_HOURS {
                return Err(ThresholdError::TooLarge(h));
            }
        }
        for pair in hours.windows(2) {
            if pair[1] >= pair[0] {
                return Err(ThresholdError::NotDecreasing(pair[1], pair[0]));
            }
        }
        Ok(Self { hours })
    }

    /// Number of reminders a record can ever receive.
    pub fn count(&self) -> usize {
        self.hours.len()
    }

    /// Hours before the deadline at which reminder `index` becomes due.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.hours.get(index).copied()
    }

    /// Lookahead for the candidate query: the earliest (largest) threshold.
    pub fn window(&self) -> Duration {
        Duration::milliseconds((self.hours[0] * 3_600_000.0).round() as i64)
    }

    pub fn hours(&self) -> &[f64] {
        &self.hours
    }
}

impl Default for ReminderThresholds {
    fn default() -> Self {
        Self {
            hours: vec![4.0, 3.0, 2.0, 1.0],
        }
    }
}

impl FromStr for ReminderThresholds {
    type Err = ThresholdError;

    /// Parses a comma-separated list of hours, e.g. `"4,3,2,1"` or `"6, 1.5, 0.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hours = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|_| ThresholdError::NotANumber(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(hours)
    }
}

impl fmt::Display for ReminderThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.hours.iter().map(|h| format!("{h}h")).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_four_hourly_slots() {
        let t = ReminderThresholds::default();
        assert_eq!(t.hours(), &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(t.count(), 4);
        assert_eq!(t.window(), Duration::hours(4));
    }

    #[test]
    fn test_parse_with_spaces_and_fractions() {
        let t: ReminderThresholds = "6, 1.5 ,0.25".parse().unwrap();
        assert_eq!(t.hours(), &[6.0, 1.5, 0.25]);
        assert_eq!(t.window(), Duration::hours(6));
        assert_eq!(t.get(2), Some(0.25));
        assert_eq!(t.get(3), None);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!("".parse::<ReminderThresholds>(), Err(ThresholdError::Empty));
        assert_eq!(" , ".parse::<ReminderThresholds>(), Err(ThresholdError::Empty));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "4,three".parse::<ReminderThresholds>(),
            Err(ThresholdError::NotANumber("three".to_string()))
        );
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(
            ReminderThresholds::new(vec![2.0, 0.0]),
            Err(ThresholdError::NotPositive(0.0))
        );
        assert!(ReminderThresholds::new(vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_rejects_thresholds_beyond_a_year() {
        assert_eq!(
            "1e12".parse::<ReminderThresholds>(),
            Err(ThresholdError::TooLarge(1e12))
        );
        assert!(ReminderThresholds::new(vec![8_761.0, 1.0]).is_err());
        let year: ReminderThresholds = "8760,1".parse().unwrap();
        assert_eq!(year.window(), Duration::hours(8_760));
    }

    #[test]
    fn test_rejects_increasing_or_repeated() {
        assert_eq!(
            ReminderThresholds::new(vec![3.0, 4.0]),
            Err(ThresholdError::NotDecreasing(4.0, 3.0))
        );
        assert!(ReminderThresholds::new(vec![2.0, 2.0]).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ReminderThresholds::default().to_string(), "[4h, 3h, 2h, 1h]");
    }
}
