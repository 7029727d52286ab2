//! Billing block models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Provenance, ProvidedValues};

/// Identity of a billing block.
///
/// Two rows land in the same block exactly when their keys are equal.
/// `row_disambiguator` is set only for partners that bill every row on its
/// own, which makes every key unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey {
    /// Service date.
    pub date: NaiveDate,
    /// Airport code.
    pub location: String,
    /// Normalized shift text, or a row-unique placeholder when unparsed.
    pub shift_key: String,
    /// Sub-operator, when the partner keys on it.
    pub secondary_operator_id: Option<String>,
    /// Global ordinal of the row, when merging is disabled.
    pub row_disambiguator: Option<usize>,
}

/// The unit of billing: one consolidated shift.
///
/// Created from the first row seen for its key and only merged into
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// The block's identity.
    pub key: BlockKey,
    /// Shift text after forward fill, as it appeared on the first row.
    pub shift_text: String,
    /// Display form of the shift (normalized range or a placeholder label).
    pub shift_label: String,
    /// Anchored start of the shift.
    pub start_datetime: Option<NaiveDateTime>,
    /// Anchored end of the shift, overnight-corrected.
    pub end_datetime: Option<NaiveDateTime>,
    /// Overtime is suppressed for this block.
    pub no_departure: bool,
    /// The block's date counts as a holiday.
    pub holiday: bool,
    /// Observed departures, anchored to the block date.
    pub actual_departures: Vec<NaiveDateTime>,
    /// Scheduled departures, anchored to the block date.
    pub scheduled_departures: Vec<NaiveDateTime>,
    /// First non-null passenger count seen.
    pub passenger_count: Option<u32>,
    /// Service category of the first row carrying one.
    pub service_category: Option<String>,
    /// Service note of the first row carrying one.
    pub service_note: Option<String>,
    /// Assistant of the first row carrying one.
    pub assistant: Option<String>,
    /// Values provided by the first row, for reconciliation.
    pub provided: ProvidedValues,
    /// Provenance of the row that created the block.
    pub first_source: Provenance,
    /// Number of rows merged into the block.
    pub row_count: usize,
    /// Why the shift could not be turned into an interval, if it could not.
    pub parse_error: Option<String>,
}

impl Block {
    /// Service date of the block.
    pub fn date(&self) -> NaiveDate {
        self.key.date
    }

    /// Airport code of the block.
    pub fn location(&self) -> &str {
        &self.key.location
    }

    /// Duration of the anchored interval in minutes, when both ends exist.
    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.start_datetime, self.end_datetime) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        }
    }
}
