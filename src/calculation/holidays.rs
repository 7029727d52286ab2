//! Italian public holiday calendar.
//!
//! The calendar is a pure function of the year: fixed national holidays
//! plus Easter Sunday and Easter Monday. An explicit override set, when
//! supplied, replaces the computed calendar entirely.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

/// Fixed-date national holidays as (month, day).
pub const FIXED_HOLIDAYS: &[(u32, u32)] = &[
    (1, 1),   // Capodanno
    (1, 6),   // Epifania
    (4, 25),  // Liberazione
    (5, 1),   // Festa del lavoro
    (6, 2),   // Festa della Repubblica
    (8, 15),  // Ferragosto
    (11, 1),  // Ognissanti
    (12, 8),  // Immacolata
    (12, 25), // Natale
    (12, 26), // Santo Stefano
];

/// Computes Easter Sunday for a Gregorian year.
///
/// Uses the anonymous Gregorian (Meeus/Jones/Butcher) algorithm.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::easter_sunday;
/// use chrono::NaiveDate;
///
/// assert_eq!(easter_sunday(2025), NaiveDate::from_ymd_opt(2025, 4, 20));
/// ```
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Returns the Italian public holidays of `year`.
pub fn italian_public_holidays(year: i32) -> BTreeSet<NaiveDate> {
    let mut holidays: BTreeSet<NaiveDate> = FIXED_HOLIDAYS
        .iter()
        .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .collect();
    if let Some(easter) = easter_sunday(year) {
        holidays.insert(easter);
        holidays.insert(easter + Duration::days(1));
    }
    holidays
}

/// Decides whether a date is a public holiday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    overrides: Option<BTreeSet<NaiveDate>>,
}

impl HolidayCalendar {
    /// A calendar computed from the Italian holiday rules.
    pub fn italian() -> Self {
        Self { overrides: None }
    }

    /// A calendar that only knows the given dates.
    pub fn with_overrides(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            overrides: Some(dates.into_iter().collect()),
        }
    }

    /// Returns true when `date` is a holiday under this calendar.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        match &self.overrides {
            Some(dates) => dates.contains(&date),
            None => italian_public_holidays(date.year()).contains(&date),
        }
    }

    /// Returns true when an override set is in use.
    pub fn has_overrides(&self) -> bool {
        self.overrides.is_some()
    }
}
