//! Schedule row models.
//!
//! A [`RawRow`] is one schedule-table row after an upstream adapter has
//! mapped its columns. Rows arrive grouped in [`SourceSheet`]s so that the
//! file → sheet → row order, which drives forward fill and first-seen
//! provenance, is explicit.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a row came from.
///
/// `global_ordinal` counts rows across every sheet of every file in input
/// order and is the tie-breaker for all "first seen" decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Identifier of the source file.
    pub file_id: String,
    /// Identifier of the sheet within the file.
    pub sheet_id: String,
    /// Zero-based position of the row within its sheet.
    pub row_ordinal: usize,
    /// Zero-based position of the row across the whole run.
    pub global_ordinal: usize,
}

/// Values already present in the source row, used only for reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidedValues {
    /// Amount the source claims for the block.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Overtime minutes the source claims for the block.
    #[serde(default)]
    pub overtime_minutes: Option<i64>,
    /// Night minutes the source claims for the block.
    #[serde(default)]
    pub night_minutes: Option<i64>,
}

impl ProvidedValues {
    /// Returns true when at least one comparable value is present.
    pub fn any(&self) -> bool {
        self.amount.is_some() || self.overtime_minutes.is_some() || self.night_minutes.is_some()
    }
}

/// One schedule row, already column-mapped.
///
/// `date` is optional because upstream cells can be blank or unreadable; such
/// rows are excluded from aggregation rather than failing the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Calendar date of the service.
    pub date: Option<NaiveDate>,
    /// Airport code (or name, canonicalized during normalization).
    pub location: String,
    /// Free-text shift descriptor, possibly empty.
    #[serde(default)]
    pub shift_text: String,
    /// Observed departure times found in the row.
    #[serde(default)]
    pub actual_departure_candidates: Vec<NaiveTime>,
    /// Scheduled departure times found in the row.
    #[serde(default)]
    pub scheduled_departure_candidates: Vec<NaiveTime>,
    /// Passenger count, when the partner bills per boarding card.
    #[serde(default)]
    pub passenger_count: Option<u32>,
    /// Sub-operator sharing the partner's schedule.
    #[serde(default)]
    pub secondary_operator_id: Option<String>,
    /// Explicit holiday marker from the row.
    #[serde(default)]
    pub holiday_hint: Option<bool>,
    /// Check-in (call) time, used to synthesize a shift when none is given.
    #[serde(default)]
    pub checkin_time: Option<NaiveTime>,
    /// Service category text (catalog-priced partners).
    #[serde(default)]
    pub service_category: Option<String>,
    /// Free-text service note, e.g. an arrivals/transfer column.
    #[serde(default)]
    pub service_note: Option<String>,
    /// Name of the assistant who worked the row.
    #[serde(default)]
    pub assistant: Option<String>,
    /// Values the source already computed.
    #[serde(default)]
    pub provided: ProvidedValues,
    /// Where the row came from.
    pub provenance: Provenance,
}

/// The rows of one sheet, in sheet order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSheet {
    /// Identifier of the source file.
    pub file_id: String,
    /// Identifier of the sheet within the file.
    pub sheet_id: String,
    /// Rows in their original order.
    pub rows: Vec<RawRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_provided_values_any() {
        assert!(!ProvidedValues::default().any());

        let provided = ProvidedValues {
            amount: Some(Decimal::from_str("95.00").unwrap()),
            ..Default::default()
        };
        assert!(provided.any());

        let provided = ProvidedValues {
            night_minutes: Some(0),
            ..Default::default()
        };
        assert!(provided.any());
    }

    #[test]
    fn test_raw_row_deserializes_with_defaults() {
        let json = r#"{
            "date": "2025-03-01",
            "location": "BGY",
            "provenance": {
                "file_id": "march.xlsx",
                "sheet_id": "BGY",
                "row_ordinal": 0,
                "global_ordinal": 0
            }
        }"#;

        let row: RawRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.shift_text, "");
        assert!(row.actual_departure_candidates.is_empty());
        assert!(!row.provided.any());
        assert_eq!(row.provenance.sheet_id, "BGY");
    }
}
