//! Free-text shift descriptor parsing.
//!
//! Schedules write the same shift many ways: `08-11`, `8.00–11.00`,
//! `SC3 08:00 - 11:00 no dec`, `22;30-02`. [`parse_shift_text`] turns any of
//! these into a [`ShiftInterval`] with a canonical `HH:MM-HH:MM` grouping
//! text. Parsing never fails: an unreadable descriptor comes back with no
//! times and its cleaned text.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::models::ShiftInterval;

/// Token re-inserted in normalized text when the "no departure" marker is present.
pub const NO_DEPARTURE_TOKEN: &str = "NO DEC";

/// Highest hour accepted in a descriptor; values past 23 wrap modulo 24.
pub const MAX_DESCRIPTOR_HOUR: u32 = 47;

static NO_DEPARTURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno\s*dec\b").expect("no-departure pattern compiles"));

static SHIFT_CODE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z]{1,3}\s*\d{1,3}\s+").expect("shift code pattern compiles")
});

static DOTTED_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}[:;]\d{1,2})[.;](\d{1,2}[:;]\d{1,2})").expect("dotted range compiles")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{1,2}))?\s*-\s*(\d{1,2})(?::(\d{1,2}))?\b")
        .expect("range pattern compiles")
});

static OPEN_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{1,2}))?\s*-").expect("open range pattern compiles")
});

static TIME_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{1,2}))?(?::\d{1,2})?\b").expect("time token compiles")
});

/// Collapses runs of whitespace into single spaces and trims.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a free-text shift descriptor.
///
/// Steps, in order: whitespace is collapsed, the "no departure" marker is
/// recorded and removed, a leading shift code (`SC3`, `T 12`) is dropped,
/// dash glyphs become `-`, a range written with a dot or semicolon between
/// two times becomes a dash, and `.`/`;` become `:`. The first
/// `H[:MM]-H[:MM]` range found wins. A range that opens but never closes
/// (`22:00-`) ends at midnight.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::parse_shift_text;
/// use chrono::NaiveTime;
///
/// let interval = parse_shift_text("SC3 8.00–11.30 no dec");
/// assert_eq!(interval.start_time, NaiveTime::from_hms_opt(8, 0, 0));
/// assert_eq!(interval.end_time, NaiveTime::from_hms_opt(11, 30, 0));
/// assert!(interval.no_departure);
/// assert_eq!(interval.normalized_text, "08:00-11:30 NO DEC");
/// ```
pub fn parse_shift_text(raw: &str) -> ShiftInterval {
    let text = normalize_spaces(raw);
    let no_departure = NO_DEPARTURE_RE.is_match(&text);
    let text = normalize_spaces(&NO_DEPARTURE_RE.replace_all(&text, " "));
    let text = SHIFT_CODE_PREFIX_RE.replace(&text, "").into_owned();
    let text = normalize_separators(&text);

    if let Some(caps) = RANGE_RE.captures(&text) {
        let start = time_from_parts(caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str()));
        let end = time_from_parts(caps.get(3).map(|m| m.as_str()), caps.get(4).map(|m| m.as_str()));
        if let (Some(start), Some(end), Some(whole)) = (start, end, caps.get(0)) {
            let normalized = compose_normalized(
                &text[..whole.start()],
                start,
                end,
                &text[whole.end()..],
                no_departure,
            );
            return ShiftInterval {
                start_time: Some(start),
                end_time: Some(end),
                no_departure,
                normalized_text: normalized,
            };
        }
    }

    if let Some(caps) = OPEN_RANGE_RE.captures(&text) {
        let start = time_from_parts(caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str()));
        let midnight = NaiveTime::from_hms_opt(0, 0, 0);
        if let (Some(start), Some(end), Some(whole)) = (start, midnight, caps.get(0)) {
            let normalized = compose_normalized(
                &text[..whole.start()],
                start,
                end,
                &text[whole.end()..],
                no_departure,
            );
            return ShiftInterval {
                start_time: Some(start),
                end_time: Some(end),
                no_departure,
                normalized_text: normalized,
            };
        }
    }

    let mut cleaned = text.trim().to_string();
    if no_departure {
        if !cleaned.is_empty() {
            cleaned.push(' ');
        }
        cleaned.push_str(NO_DEPARTURE_TOKEN);
    }
    ShiftInterval::unparsed(cleaned, no_departure)
}

/// Parses one time-of-day cell such as `10:15`, `10.15`, `9` or `25:10`.
///
/// Hours up to 47 are accepted and wrapped modulo 24. Returns `None` for
/// empty or unreadable cells.
pub fn parse_time_of_day(cell: &str) -> Option<NaiveTime> {
    extract_time_candidates(cell).into_iter().next()
}

/// Extracts every time-of-day token from a cell.
///
/// Cells sometimes list several departures (`10:15 / 11.40`); each valid
/// token is returned in order of appearance.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::extract_time_candidates;
/// use chrono::NaiveTime;
///
/// let times = extract_time_candidates("10:15 / 11.40");
/// assert_eq!(times, vec![
///     NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
///     NaiveTime::from_hms_opt(11, 40, 0).unwrap(),
/// ]);
/// ```
pub fn extract_time_candidates(cell: &str) -> Vec<NaiveTime> {
    let text = cell.replace(['.', ';'], ":");
    TIME_TOKEN_RE
        .captures_iter(&text)
        .filter_map(|caps| {
            time_from_parts(caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str()))
        })
        .collect()
}

fn normalize_separators(text: &str) -> String {
    let text = text.replace(['\u{2013}', '\u{2014}', '\u{2212}'], "-");
    let text = DOTTED_RANGE_RE.replace_all(&text, "$1-$2");
    text.replace(['.', ';'], ":")
}

fn time_from_parts(hour: Option<&str>, minute: Option<&str>) -> Option<NaiveTime> {
    let hour: u32 = hour?.parse().ok()?;
    let minute: u32 = match minute {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if hour > MAX_DESCRIPTOR_HOUR || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour % 24, minute, 0)
}

fn compose_normalized(
    prefix: &str,
    start: NaiveTime,
    end: NaiveTime,
    suffix: &str,
    no_departure: bool,
) -> String {
    let range = format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"));
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    let prefix = prefix.trim();
    let suffix = suffix.trim();
    if !prefix.is_empty() {
        parts.push(prefix);
    }
    parts.push(&range);
    if !suffix.is_empty() {
        parts.push(suffix);
    }
    if no_departure {
        parts.push(NO_DEPARTURE_TOKEN);
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    // ==========================================================================
    // Range shapes
    // ==========================================================================

    #[test]
    fn test_bare_hours_range() {
        let interval = parse_shift_text("08-11");
        assert_eq!(interval.start_time, t(8, 0));
        assert_eq!(interval.end_time, t(11, 0));
        assert!(!interval.no_departure);
        assert_eq!(interval.normalized_text, "08:00-11:00");
    }

    #[test]
    fn test_full_range_with_en_dash() {
        let interval = parse_shift_text("22:00\u{2013}02:00");
        assert_eq!(interval.start_time, t(22, 0));
        assert_eq!(interval.end_time, t(2, 0));
        assert_eq!(interval.normalized_text, "22:00-02:00");
    }

    #[test]
    fn test_mixed_shapes() {
        let interval = parse_shift_text("6-9:30");
        assert_eq!(interval.start_time, t(6, 0));
        assert_eq!(interval.end_time, t(9, 30));

        let interval = parse_shift_text("6:45-10");
        assert_eq!(interval.start_time, t(6, 45));
        assert_eq!(interval.end_time, t(10, 0));
    }

    #[test]
    fn test_period_between_two_times_is_a_range() {
        let interval = parse_shift_text("05:30.09:00");
        assert_eq!(interval.start_time, t(5, 30));
        assert_eq!(interval.end_time, t(9, 0));
    }

    #[test]
    fn test_semicolon_minutes() {
        let interval = parse_shift_text("13;15 - 16;45");
        assert_eq!(interval.start_time, t(13, 15));
        assert_eq!(interval.end_time, t(16, 45));
        assert_eq!(interval.normalized_text, "13:15-16:45");
    }

    #[test]
    fn test_hours_past_midnight_wrap() {
        let interval = parse_shift_text("22-26");
        assert_eq!(interval.start_time, t(22, 0));
        assert_eq!(interval.end_time, t(2, 0));

        let interval = parse_shift_text("20-24");
        assert_eq!(interval.end_time, t(0, 0));
    }

    #[test]
    fn test_hour_above_limit_is_rejected() {
        let interval = parse_shift_text("50-52");
        assert!(!interval.is_parsed());
    }

    // ==========================================================================
    // Markers, prefixes and suffixes
    // ==========================================================================

    #[test]
    fn test_no_departure_marker_variants() {
        for text in ["08-11 NO DEC", "08-11 nodec", "no  dec 08-11", "08-11 No Dec"] {
            let interval = parse_shift_text(text);
            assert!(interval.no_departure, "marker not found in {text:?}");
            assert_eq!(interval.normalized_text, "08:00-11:00 NO DEC");
        }
    }

    #[test]
    fn test_shift_code_prefix_is_stripped() {
        let interval = parse_shift_text("SC12 07:00-10:00");
        assert_eq!(interval.start_time, t(7, 0));
        assert_eq!(interval.normalized_text, "07:00-10:00");

        let interval = parse_shift_text("sc 3 07-10");
        assert_eq!(interval.normalized_text, "07:00-10:00");
    }

    #[test]
    fn test_prefix_and_suffix_are_kept() {
        let interval = parse_shift_text("BGY  05-08  charter");
        assert_eq!(interval.normalized_text, "BGY 05:00-08:00 charter");
    }

    #[test]
    fn test_open_range_ends_at_midnight() {
        let interval = parse_shift_text("21:30-");
        assert_eq!(interval.start_time, t(21, 30));
        assert_eq!(interval.end_time, t(0, 0));
        assert_eq!(interval.normalized_text, "21:30-00:00");
    }

    #[test]
    fn test_unparseable_keeps_cleaned_text() {
        let interval = parse_shift_text("  riposo   settimanale ");
        assert!(!interval.is_parsed());
        assert_eq!(interval.normalized_text, "riposo settimanale");
    }

    #[test]
    fn test_unparseable_with_marker() {
        let interval = parse_shift_text("da definire no dec");
        assert!(interval.no_departure);
        assert_eq!(interval.normalized_text, "da definire NO DEC");
    }

    #[test]
    fn test_empty_text() {
        let interval = parse_shift_text("");
        assert!(!interval.is_parsed());
        assert_eq!(interval.normalized_text, "");
    }

    // ==========================================================================
    // Cells
    // ==========================================================================

    #[test]
    fn test_parse_time_of_day_formats() {
        assert_eq!(parse_time_of_day("10:15"), t(10, 15));
        assert_eq!(parse_time_of_day("10.15"), t(10, 15));
        assert_eq!(parse_time_of_day("9"), t(9, 0));
        assert_eq!(parse_time_of_day("25:10"), t(1, 10));
        assert_eq!(parse_time_of_day("07:05:00"), t(7, 5));
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("n/d"), None);
    }

    #[test]
    fn test_extract_skips_invalid_tokens() {
        let times = extract_time_candidates("99:00 10:70 11:05");
        assert_eq!(times, vec![NaiveTime::from_hms_opt(11, 5, 0).unwrap()]);
    }

    proptest! {
        #[test]
        fn prop_separator_choice_invariance(
            h1 in 0u32..24, m1 in 0u32..60, h2 in 0u32..24, m2 in 0u32..60,
            dash in prop::sample::select(vec!["-", "\u{2013}", "\u{2014}", " - "]),
            colon in prop::sample::select(vec![":", ".", ";"]),
        ) {
            let text = format!("{h1:02}{colon}{m1:02}{dash}{h2:02}{colon}{m2:02}");
            let interval = parse_shift_text(&text);
            prop_assert_eq!(interval.start_time, NaiveTime::from_hms_opt(h1, m1, 0));
            prop_assert_eq!(interval.end_time, NaiveTime::from_hms_opt(h2, m2, 0));
            prop_assert_eq!(
                interval.normalized_text,
                format!("{h1:02}:{m1:02}-{h2:02}:{m2:02}")
            );
        }

        #[test]
        fn prop_parse_never_panics(text in ".{0,40}") {
            let _ = parse_shift_text(&text);
        }
    }
}
