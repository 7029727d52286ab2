//! Request types for the shift billing API.
//!
//! This module defines the JSON request structures for the `/compute`
//! endpoint. Rows arrive column-mapped but with their cells as written in
//! the schedule (text, numbers or booleans); the cell parsers turn them into
//! [`RawRow`]s.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    extract_time_candidates, is_truthy_holiday, parse_date_cell, parse_eur, parse_minutes_cell,
    parse_time_of_day,
};
use crate::models::{Provenance, ProvidedValues, RawRow, SourceSheet};

/// Request body for the `/compute` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// Partner whose tariff applies.
    pub partner: String,
    /// Holiday dates replacing the built-in calendar.
    #[serde(default)]
    pub holidays: Option<Vec<NaiveDate>>,
    /// Source files, in processing order.
    pub files: Vec<FileRequest>,
}

/// One source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRequest {
    /// File identifier, reported in provenance.
    pub file_id: String,
    /// Sheets in file order.
    pub sheets: Vec<SheetRequest>,
}

/// One sheet of a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetRequest {
    /// Sheet identifier, reported in provenance.
    pub sheet_id: String,
    /// Rows in sheet order.
    #[serde(default)]
    pub rows: Vec<RowRequest>,
}

/// A schedule cell as found in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Text cell.
    Text(String),
    /// Boolean cell.
    Flag(bool),
    /// Numeric cell.
    Number(Decimal),
}

impl CellValue {
    /// The cell as trimmed text.
    pub fn text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Flag(b) => b.to_string(),
            CellValue::Number(n) => n.normalize().to_string(),
        }
    }

    fn amount(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_eur(s),
            CellValue::Flag(_) => None,
        }
    }

    fn minutes(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) => n.trunc().to_i64(),
            CellValue::Text(s) => parse_minutes_cell(s),
            CellValue::Flag(_) => None,
        }
    }

    fn count(&self) -> Option<u32> {
        match self {
            CellValue::Number(n) => n.trunc().to_u32(),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Flag(_) => None,
        }
    }

    fn flag(&self) -> bool {
        match self {
            CellValue::Flag(b) => *b,
            CellValue::Number(n) => !n.is_zero(),
            CellValue::Text(s) => is_truthy_holiday(s),
        }
    }
}

/// One schedule row, column-mapped, with raw cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowRequest {
    /// Service date cell.
    #[serde(default)]
    pub date: Option<CellValue>,
    /// Airport code or name.
    #[serde(default)]
    pub location: Option<CellValue>,
    /// Shift descriptor.
    #[serde(default)]
    pub shift: Option<CellValue>,
    /// Actual departure cell; may hold several times.
    #[serde(default)]
    pub actual_departures: Option<CellValue>,
    /// Scheduled departure cell; may hold several times.
    #[serde(default)]
    pub scheduled_departures: Option<CellValue>,
    /// Passenger count.
    #[serde(default)]
    pub passengers: Option<CellValue>,
    /// Sub-operator.
    #[serde(default)]
    pub sub_operator: Option<CellValue>,
    /// Holiday marker.
    #[serde(default)]
    pub holiday: Option<CellValue>,
    /// Check-in time.
    #[serde(default)]
    pub checkin: Option<CellValue>,
    /// Service category.
    #[serde(default)]
    pub service_category: Option<CellValue>,
    /// Service note.
    #[serde(default)]
    pub service_note: Option<CellValue>,
    /// Assistant name.
    #[serde(default)]
    pub assistant: Option<CellValue>,
    /// Amount already computed in the source.
    #[serde(default)]
    pub provided_amount: Option<CellValue>,
    /// Overtime minutes already computed in the source.
    #[serde(default)]
    pub provided_overtime_minutes: Option<CellValue>,
    /// Night minutes already computed in the source.
    #[serde(default)]
    pub provided_night_minutes: Option<CellValue>,
}

fn text_of(cell: &Option<CellValue>) -> Option<String> {
    cell.as_ref().map(CellValue::text).filter(|s| !s.is_empty())
}

impl RowRequest {
    /// Converts the row into a [`RawRow`] at the given position.
    pub fn into_raw_row(self, provenance: Provenance) -> RawRow {
        let date = match &self.date {
            Some(CellValue::Text(s)) => parse_date_cell(s),
            _ => None,
        };
        let times = |cell: &Option<CellValue>| {
            text_of(cell)
                .map(|s| extract_time_candidates(&s))
                .unwrap_or_default()
        };

        RawRow {
            date,
            location: text_of(&self.location).unwrap_or_default(),
            shift_text: text_of(&self.shift).unwrap_or_default(),
            actual_departure_candidates: times(&self.actual_departures),
            scheduled_departure_candidates: times(&self.scheduled_departures),
            passenger_count: self.passengers.as_ref().and_then(CellValue::count),
            secondary_operator_id: text_of(&self.sub_operator),
            holiday_hint: self.holiday.as_ref().map(CellValue::flag),
            checkin_time: text_of(&self.checkin).and_then(|s| parse_time_of_day(&s)),
            service_category: text_of(&self.service_category),
            service_note: text_of(&self.service_note),
            assistant: text_of(&self.assistant),
            provided: ProvidedValues {
                amount: self.provided_amount.as_ref().and_then(CellValue::amount),
                overtime_minutes: self.provided_overtime_minutes.as_ref().and_then(CellValue::minutes),
                night_minutes: self.provided_night_minutes.as_ref().and_then(CellValue::minutes),
            },
            provenance,
        }
    }
}

impl ComputeRequest {
    /// Flattens the files into sheets, numbering rows across the whole run.
    pub fn into_sheets(self) -> Vec<SourceSheet> {
        let mut global_ordinal = 0;
        let mut sheets = Vec::new();
        for file in self.files {
            for sheet in file.sheets {
                let rows = sheet
                    .rows
                    .into_iter()
                    .enumerate()
                    .map(|(row_ordinal, row)| {
                        let provenance = Provenance {
                            file_id: file.file_id.clone(),
                            sheet_id: sheet.sheet_id.clone(),
                            row_ordinal,
                            global_ordinal,
                        };
                        global_ordinal += 1;
                        row.into_raw_row(provenance)
                    })
                    .collect();
                sheets.push(SourceSheet {
                    file_id: file.file_id.clone(),
                    sheet_id: sheet.sheet_id,
                    rows,
                });
            }
        }
        sheets
    }
}
