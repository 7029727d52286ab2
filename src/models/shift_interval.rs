//! Parsed shift descriptor model.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// The result of parsing a free-text shift descriptor.
///
/// When no time range could be recovered, `start_time` and `end_time` are
/// `None` and `normalized_text` holds the cleaned input, so the row can still
/// be grouped and reported.
///
/// # Example
///
/// ```
/// use shift_billing_engine::models::ShiftInterval;
/// use chrono::NaiveTime;
///
/// let interval = ShiftInterval {
///     start_time: NaiveTime::from_hms_opt(8, 0, 0),
///     end_time: NaiveTime::from_hms_opt(11, 0, 0),
///     no_departure: false,
///     normalized_text: "08:00-11:00".to_string(),
/// };
/// assert!(interval.is_parsed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInterval {
    /// Start time of day.
    pub start_time: Option<NaiveTime>,
    /// End time of day; may be earlier than the start for overnight shifts.
    pub end_time: Option<NaiveTime>,
    /// The descriptor carried a "no departure" marker; overtime is suppressed.
    pub no_departure: bool,
    /// Canonical text used as the grouping key.
    pub normalized_text: String,
}

impl ShiftInterval {
    /// Returns an interval with no times, keeping the cleaned text.
    pub fn unparsed(normalized_text: impl Into<String>, no_departure: bool) -> Self {
        Self {
            start_time: None,
            end_time: None,
            no_departure,
            normalized_text: normalized_text.into(),
        }
    }

    /// Returns true when both start and end were recovered.
    pub fn is_parsed(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsed_has_no_times() {
        let interval = ShiftInterval::unparsed("riposo", false);
        assert!(!interval.is_parsed());
        assert_eq!(interval.normalized_text, "riposo");
    }

    #[test]
    fn test_half_parsed_is_not_parsed() {
        let interval = ShiftInterval {
            start_time: NaiveTime::from_hms_opt(8, 0, 0),
            end_time: None,
            no_departure: false,
            normalized_text: "08:00".to_string(),
        };
        assert!(!interval.is_parsed());
    }
}
