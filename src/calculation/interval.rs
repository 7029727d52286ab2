//! Interval arithmetic for shifts and night windows.

use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Moves an end that precedes its start to the following day.
///
/// Applied once per block; an end already at or after the start is returned
/// unchanged.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::overnight_correct;
/// use chrono::NaiveDateTime;
///
/// let start = NaiveDateTime::parse_from_str("2025-03-01 22:00", "%Y-%m-%d %H:%M").unwrap();
/// let end = NaiveDateTime::parse_from_str("2025-03-01 02:00", "%Y-%m-%d %H:%M").unwrap();
/// let corrected = overnight_correct(start, end);
/// assert_eq!(corrected.to_string(), "2025-03-02 02:00:00");
/// ```
pub fn overnight_correct(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
    if end < start {
        end + Duration::days(1)
    } else {
        end
    }
}

/// Minutes of `[interval_start, interval_end)` inside a recurring daily window.
///
/// The window runs from `window_start` to `window_end` each day and crosses
/// midnight when `window_end < window_start` (e.g. 23:00 to 06:00). Window
/// instances are checked from the day before the interval start through the
/// day after it (and further if the interval is longer), so a shift touching
/// two nights counts both.
///
/// Returns 0 for empty or inverted intervals and for zero-length windows.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::night_overlap_minutes;
/// use chrono::{NaiveDateTime, NaiveTime};
///
/// let start = NaiveDateTime::parse_from_str("2025-03-01 22:30", "%Y-%m-%d %H:%M").unwrap();
/// let end = NaiveDateTime::parse_from_str("2025-03-01 23:30", "%Y-%m-%d %H:%M").unwrap();
/// let window_start = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
/// let window_end = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
/// assert_eq!(night_overlap_minutes(start, end, window_start, window_end), 30);
/// ```
pub fn night_overlap_minutes(
    interval_start: NaiveDateTime,
    interval_end: NaiveDateTime,
    window_start: NaiveTime,
    window_end: NaiveTime,
) -> i64 {
    if interval_end <= interval_start || window_start == window_end {
        return 0;
    }

    let crosses_midnight = window_end < window_start;
    let first_day = interval_start.date() - Duration::days(1);
    let last_day = std::cmp::max(
        interval_start.date() + Duration::days(1),
        interval_end.date(),
    );

    let mut total = 0;
    let mut day = first_day;
    while day <= last_day {
        let instance_start = day.and_time(window_start);
        let instance_end = if crosses_midnight {
            (day + Duration::days(1)).and_time(window_end)
        } else {
            day.and_time(window_end)
        };

        let overlap_start = std::cmp::max(interval_start, instance_start);
        let overlap_end = std::cmp::min(interval_end, instance_end);
        if overlap_end > overlap_start {
            total += (overlap_end - overlap_start).num_minutes();
        }
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // ==========================================================================
    // overnight_correct
    // ==========================================================================

    #[test]
    fn test_overnight_correct_adds_a_day() {
        let start = make_datetime("2025-03-01 22:00");
        let end = make_datetime("2025-03-01 02:00");
        assert_eq!(overnight_correct(start, end), make_datetime("2025-03-02 02:00"));
    }

    #[test]
    fn test_overnight_correct_keeps_ordered_pair() {
        let start = make_datetime("2025-03-01 08:00");
        let end = make_datetime("2025-03-01 11:00");
        assert_eq!(overnight_correct(start, end), end);
        assert_eq!(overnight_correct(start, start), start);
    }

    // ==========================================================================
    // night_overlap_minutes
    // ==========================================================================

    #[test]
    fn test_daytime_shift_has_no_night() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 08:00"),
            make_datetime("2025-03-01 11:00"),
            hm(23, 0),
            hm(6, 0),
        );
        assert_eq!(minutes, 0);
    }

    #[test]
    fn test_shift_crossing_midnight() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 22:00"),
            make_datetime("2025-03-02 02:00"),
            hm(23, 0),
            hm(6, 0),
        );
        assert_eq!(minutes, 180);
    }

    #[test]
    fn test_early_morning_uses_previous_night_window() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 04:00"),
            make_datetime("2025-03-01 08:00"),
            hm(23, 0),
            hm(6, 0),
        );
        assert_eq!(minutes, 120);
    }

    #[test]
    fn test_shift_touching_two_nights() {
        // 05:00 to 23:30 the same day: one hour of the previous night, half an hour of the next
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 05:00"),
            make_datetime("2025-03-01 23:30"),
            hm(23, 0),
            hm(6, 0),
        );
        assert_eq!(minutes, 90);
    }

    #[test]
    fn test_short_window_ending_at_half_past_three() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 22:00"),
            make_datetime("2025-03-02 04:00"),
            hm(23, 0),
            hm(3, 30),
        );
        assert_eq!(minutes, 270);
    }

    #[test]
    fn test_window_not_crossing_midnight() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 00:00"),
            make_datetime("2025-03-01 12:00"),
            hm(1, 0),
            hm(5, 0),
        );
        assert_eq!(minutes, 240);
    }

    #[test]
    fn test_inverted_interval_is_zero() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-02 02:00"),
            make_datetime("2025-03-01 22:00"),
            hm(23, 0),
            hm(6, 0),
        );
        assert_eq!(minutes, 0);
    }

    #[test]
    fn test_interval_spanning_several_nights() {
        let minutes = night_overlap_minutes(
            make_datetime("2025-03-01 12:00"),
            make_datetime("2025-03-04 12:00"),
            hm(22, 0),
            hm(6, 0),
        );
        assert_eq!(minutes, 3 * 8 * 60);
    }

    fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
        (0i64..(60 * 24 * 60)).prop_map(|minutes| {
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + Duration::minutes(minutes)
        })
    }

    proptest! {
        #[test]
        fn prop_overnight_correct_never_precedes_start(
            start in arb_datetime(),
            end_minute in 0u32..(24 * 60),
        ) {
            let end = start.date().and_time(hm(end_minute / 60, end_minute % 60));
            let corrected = overnight_correct(start, end);
            prop_assert!(corrected >= start);
            prop_assert!(corrected - start < Duration::days(1));
            if end >= start {
                prop_assert_eq!(corrected, end);
            }
            prop_assert_eq!(overnight_correct(start, corrected), corrected);
        }

        #[test]
        fn prop_night_overlap_is_monotone_in_end(
            start in arb_datetime(),
            length in 0i64..(60 * 30),
            extension in 0i64..(60 * 30),
            ws in 0u32..24,
            we in 0u32..24,
        ) {
            let end = start + Duration::minutes(length);
            let longer = end + Duration::minutes(extension);
            let window_start = hm(ws, 0);
            let window_end = hm(we, 0);
            let base = night_overlap_minutes(start, end, window_start, window_end);
            let extended = night_overlap_minutes(start, longer, window_start, window_end);
            prop_assert!(extended >= base);
            prop_assert!(base <= length);
        }
    }
}
