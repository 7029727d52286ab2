//! Row normalization.
//!
//! Turns a forward-filled [`RawRow`] into a [`NormalizedRow`]: the shift
//! descriptor parsed and anchored to the row's date, departures anchored
//! and rolled past midnight, the location canonicalized and the holiday flag
//! resolved. Rows missing a date, location or any usable shift are skipped
//! with a [`SkipReason`] instead of failing the run.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::config::{StartRule, TariffPolicy};
use crate::models::{RawRow, ShiftInterval};

use super::cell_values::canonical_location;
use super::holidays::HolidayCalendar;
use super::interval::overnight_correct;
use super::time_range::parse_shift_text;

/// Error text for a descriptor with no recoverable time range.
pub const UNPARSED_SHIFT_ERROR: &str = "shift text could not be parsed";

/// Error text for a row priced from a scheduled departure it does not have.
pub const MISSING_SCHEDULED_ERROR: &str = "scheduled departure unavailable";

/// Why a row was left out of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The date cell was blank or unreadable.
    #[error("row has no service date")]
    MissingDate,
    /// The location cell was blank.
    #[error("row has no location")]
    MissingLocation,
    /// No shift text, even after forward fill, and nothing to derive one from.
    #[error("row has no shift")]
    MissingShift,
}

impl SkipReason {
    /// Warning code reported for the skip.
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::MissingDate => "ROW_MISSING_DATE",
            SkipReason::MissingLocation => "ROW_MISSING_LOCATION",
            SkipReason::MissingShift => "ROW_MISSING_SHIFT",
        }
    }
}

/// A row ready for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// Service date.
    pub date: NaiveDate,
    /// Canonical airport code.
    pub location: String,
    /// Shift text after forward fill.
    pub shift_text: String,
    /// Parsed descriptor.
    pub interval: ShiftInterval,
    /// Text the row groups on.
    pub shift_key: String,
    /// Text the row is reported under.
    pub shift_label: String,
    /// Anchored start, absent when the shift could not be resolved.
    pub start_datetime: Option<NaiveDateTime>,
    /// Anchored end, never before the start.
    pub end_datetime: Option<NaiveDateTime>,
    /// Actual departures in cell order, anchored and rolled.
    pub actual_departures: Vec<NaiveDateTime>,
    /// Scheduled departures in cell order, anchored and rolled.
    pub scheduled_departures: Vec<NaiveDateTime>,
    /// Row hint or calendar says holiday, as the policy allows.
    pub holiday: bool,
    /// The interval came from the check-in time.
    pub synthesized: bool,
    /// Set when the interval could not be resolved.
    pub parse_error: Option<String>,
}

/// Normalizes one row against a partner policy.
///
/// `shift_text` is the row's text after forward fill. The interval comes
/// from, in order: the policy's scheduled-departure rule, the parsed
/// descriptor, or a check-in synthesis when the policy has one. A row whose
/// descriptor is present but unreadable is kept with a row-unique key and a
/// parse error so it surfaces as an error record.
///
/// # Errors
///
/// Returns a [`SkipReason`] when the row lacks a date, a location, or any
/// shift information at all.
pub fn normalize_row(
    row: &RawRow,
    shift_text: &str,
    policy: &TariffPolicy,
    calendar: &HolidayCalendar,
) -> Result<NormalizedRow, SkipReason> {
    let date = row.date.ok_or(SkipReason::MissingDate)?;
    if row.location.trim().is_empty() {
        return Err(SkipReason::MissingLocation);
    }
    let location = canonical_location(&row.location);
    let shift_text = shift_text.trim().to_string();
    let interval = parse_shift_text(&shift_text);
    let unparsed_key = format!("UNPARSED#{}", row.provenance.global_ordinal);

    let mut synthesized = false;
    let mut parse_error = None;
    let (start, end) = match policy.shift.start {
        StartRule::BeforeFirstScheduled { lead_minutes } => {
            if shift_text.is_empty()
                && row.scheduled_departure_candidates.is_empty()
                && row.actual_departure_candidates.is_empty()
            {
                return Err(SkipReason::MissingShift);
            }
            match row.scheduled_departure_candidates.first() {
                Some(&scheduled) => {
                    let departure = date.and_time(scheduled);
                    (
                        Some(departure - Duration::minutes(lead_minutes)),
                        Some(departure),
                    )
                }
                None => {
                    parse_error = Some(MISSING_SCHEDULED_ERROR.to_string());
                    (None, None)
                }
            }
        }
        StartRule::Parsed => match (interval.start_time, interval.end_time) {
            (Some(start_time), Some(end_time)) => {
                let start = date.and_time(start_time);
                (Some(start), Some(overnight_correct(start, date.and_time(end_time))))
            }
            _ => match (&policy.shift.checkin, row.checkin_time) {
                (Some(rule), Some(checkin)) => {
                    synthesized = true;
                    let start = date.and_time(checkin) - Duration::minutes(rule.lead_minutes);
                    (Some(start), Some(start + Duration::minutes(rule.duration_minutes)))
                }
                _ if shift_text.is_empty() => return Err(SkipReason::MissingShift),
                _ => {
                    parse_error = Some(UNPARSED_SHIFT_ERROR.to_string());
                    (None, None)
                }
            },
        },
    };

    let anchor = |times: &[NaiveTime]| -> Vec<NaiveDateTime> {
        times
            .iter()
            .map(|&time| {
                let at = date.and_time(time);
                match start {
                    Some(start) if at < start => at + Duration::days(1),
                    _ => at,
                }
            })
            .collect()
    };
    let actual_departures = anchor(&row.actual_departure_candidates);
    let scheduled_departures = anchor(&row.scheduled_departure_candidates);

    let (shift_key, shift_label) = if synthesized {
        let label = match (start, end) {
            (Some(start), Some(end)) => {
                format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
            }
            _ => String::new(),
        };
        (label.clone(), label)
    } else if interval.is_parsed() {
        (interval.normalized_text.clone(), interval.normalized_text.clone())
    } else {
        let label = placeholder_label(&interval, row);
        let key = if parse_error.is_some() || interval.normalized_text.is_empty() {
            unparsed_key
        } else {
            interval.normalized_text.clone()
        };
        (key, label)
    };

    let hinted = policy.holiday.use_row_hint && row.holiday_hint.unwrap_or(false);
    let listed = policy.holiday.use_calendar && calendar.is_holiday(date);

    Ok(NormalizedRow {
        date,
        location,
        shift_text,
        interval,
        shift_key,
        shift_label,
        start_datetime: start,
        end_datetime: end,
        actual_departures,
        scheduled_departures,
        holiday: hinted || listed,
        synthesized,
        parse_error,
    })
}

/// Label for a row without a parsed range: its cleaned text, or a marker
/// naming the departure it was found by.
fn placeholder_label(interval: &ShiftInterval, row: &RawRow) -> String {
    if !interval.normalized_text.is_empty() {
        return interval.normalized_text.clone();
    }
    if let Some(scheduled) = row.scheduled_departure_candidates.first() {
        return format!("NO_SHIFT_STD{}", scheduled.format("%H%M"));
    }
    if let Some(actual) = row.actual_departure_candidates.first() {
        return format!("NO_SHIFT_ATD{}", actual.format("%H%M"));
    }
    "NO_SHIFT".to_string()
}
