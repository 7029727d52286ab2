//! Forward fill of shift descriptors within a sheet.
//!
//! Schedules write the shift once and leave the following rows blank until
//! it changes. The fill is an explicit fold over the sheet's rows carrying
//! the last non-empty descriptor; the carried value never leaves the sheet.

use chrono::NaiveDate;

use crate::models::RawRow;

/// A row paired with its shift text after forward fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledRow<'a> {
    /// The source row, untouched.
    pub row: &'a RawRow,
    /// The row's own shift text, or the carried one when it was blank.
    pub shift_text: String,
    /// True when `shift_text` was carried from an earlier row.
    pub filled: bool,
}

/// State carried between rows of one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillState {
    last_text: Option<String>,
    last_date: Option<NaiveDate>,
}

impl FillState {
    /// Feeds one row through the fill, returning its effective shift text.
    ///
    /// With `group_by_date`, a row whose date differs from the previous
    /// row's drops the carried text before looking at its own.
    pub fn step(&mut self, row: &RawRow, group_by_date: bool) -> (String, bool) {
        if group_by_date && row.date != self.last_date {
            self.last_text = None;
        }
        self.last_date = row.date;

        let own = row.shift_text.trim();
        if own.is_empty() {
            match &self.last_text {
                Some(carried) => (carried.clone(), true),
                None => (String::new(), false),
            }
        } else {
            self.last_text = Some(own.to_string());
            (own.to_string(), false)
        }
    }
}

/// Forward-fills the shift text of one sheet's rows.
///
/// The state starts empty, so a blank first row stays blank.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::forward_fill_sheet;
/// use shift_billing_engine::models::{Provenance, ProvidedValues, RawRow};
///
/// let row = |text: &str, n: usize| RawRow {
///     date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1),
///     location: "BGY".to_string(),
///     shift_text: text.to_string(),
///     actual_departure_candidates: vec![],
///     scheduled_departure_candidates: vec![],
///     passenger_count: None,
///     secondary_operator_id: None,
///     holiday_hint: None,
///     checkin_time: None,
///     service_category: None,
///     service_note: None,
///     assistant: None,
///     provided: ProvidedValues::default(),
///     provenance: Provenance {
///         file_id: "f".to_string(),
///         sheet_id: "s".to_string(),
///         row_ordinal: n,
///         global_ordinal: n,
///     },
/// };
/// let rows = vec![row("08-11", 0), row("", 1)];
/// let filled = forward_fill_sheet(&rows, false);
/// assert_eq!(filled[1].shift_text, "08-11");
/// assert!(filled[1].filled);
/// ```
pub fn forward_fill_sheet(rows: &[RawRow], group_by_date: bool) -> Vec<FilledRow<'_>> {
    let mut state = FillState::default();
    rows.iter()
        .map(|row| {
            let (shift_text, filled) = state.step(row, group_by_date);
            FilledRow {
                row,
                shift_text,
                filled,
            }
        })
        .collect()
}
