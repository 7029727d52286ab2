//! Parsing of individual schedule cells.
//!
//! Partners fill their sheets by hand, so dates, amounts and minute counts
//! come in several spellings. These helpers accept the spellings seen in
//! practice and return `None` for anything else; callers decide whether a
//! missing value excludes the row or is simply absent.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

static HOURS_MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}):(\d{2})(?::\d{2})?$").expect("hours:minutes pattern compiles")
});

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+").expect("amount pattern compiles"));

// Two-digit years are tried before four-digit ones: "%Y" would read "25" as year 25.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];

const HOLIDAY_MARKERS: &[&str] = &["1", "true", "t", "si", "sì", "yes", "y", "x"];

/// Airport names and the IATA codes they stand for.
pub const AIRPORT_CODES: &[(&str, &str)] = &[
    ("BERGAMO", "BGY"),
    ("ORIO", "BGY"),
    ("VERONA", "VRN"),
    ("MALPENSA", "MXP"),
    ("MILANO", "MXP"),
    ("VENEZIA", "VCE"),
    ("TREVISO", "TSF"),
    ("TORINO", "TRN"),
    ("BOLOGNA", "BLQ"),
    ("PISA", "PSA"),
    ("FIUMICINO", "FCO"),
    ("ROMA", "FCO"),
    ("NAPOLI", "NAP"),
    ("BARI", "BRI"),
    ("CATANIA", "CTA"),
    ("PALERMO", "PMO"),
    ("CAGLIARI", "CAG"),
];

/// Parses a service date.
///
/// Accepts ISO dates and day-first dates with `/`, `.` or `-`, optionally
/// followed by a time part, which is ignored.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::parse_date_cell;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 3, 7);
/// assert_eq!(parse_date_cell("07/03/2025"), expected);
/// assert_eq!(parse_date_cell("2025-03-07 00:00:00"), expected);
/// ```
pub fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let token = cell.trim().split([' ', 'T']).next()?;
    if token.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
}

/// Parses an amount written the Italian way (`1.234,56`, `€ 95,00`).
///
/// Dots are thousands separators and the comma is the decimal mark. Returns
/// the first number found after cleaning.
pub fn parse_eur(cell: &str) -> Option<Decimal> {
    let cleaned = cell
        .replace('€', "")
        .replace("EUR", "")
        .replace('.', "")
        .replace(',', ".");
    let token = AMOUNT_RE.find(cleaned.trim())?;
    Decimal::from_str(token.as_str()).ok()
}

/// Parses a minute count written as `H:MM`, `H.MM`, `H:MM:SS` or an integer.
pub fn parse_minutes_cell(cell: &str) -> Option<i64> {
    let text = cell.trim().replace('.', ":");
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = HOURS_MINUTES_RE.captures(&text) {
        let hours: i64 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: i64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(hours * 60 + minutes);
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().ok();
    }
    None
}

/// Returns true for cells that mark the day as a holiday.
///
/// Recognizes yes-like markers and any text mentioning "festivo", which is
/// how day-of-week columns flag holidays.
pub fn is_truthy_holiday(cell: &str) -> bool {
    let text = cell.trim().to_lowercase();
    HOLIDAY_MARKERS.contains(&text.as_str()) || text.contains("festivo")
}

/// Maps an airport cell to its IATA code.
///
/// Known city or airport names map to their code; anything else is
/// upper-cased and trimmed, so `bgy` and `BGY` group together.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::canonical_location;
///
/// assert_eq!(canonical_location("Bergamo"), "BGY");
/// assert_eq!(canonical_location(" vrn "), "VRN");
/// ```
pub fn canonical_location(cell: &str) -> String {
    let upper = cell.trim().to_uppercase();
    if upper.len() == 3 {
        return upper;
    }
    AIRPORT_CODES
        .iter()
        .find(|(name, _)| upper.contains(name))
        .map(|(_, code)| code.to_string())
        .unwrap_or(upper)
}
