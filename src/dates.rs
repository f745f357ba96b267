use chrono::{FixedOffset, NaiveDate, Utc};

/// Parses a date-only string (`YYYY-MM-DD`). Returns `None` on any failure;
/// callers treat that as a validation error.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Today's calendar date at a fixed offset from UTC. Offsets outside the
/// representable range fall back to UTC.
pub fn today_with_offset(offset_minutes: i32) -> NaiveDate {
    match FixedOffset::east_opt(offset_minutes.saturating_mul(60)) {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Utc::now().date_naive(),
    }
}

/// Signed whole days from `today` until `date`.
/// Positive = days remaining, negative = days overdue.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn parses_plain_and_padded_dates() {
        assert_eq!(parse_calendar_date("2026-08-06"), Some(d(2026, 8, 6)));
        assert_eq!(parse_calendar_date("  2026-01-31  "), Some(d(2026, 1, 31)));
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("06/08/2026"), None);
        assert_eq!(parse_calendar_date("2026-13-01"), None);
        assert_eq!(parse_calendar_date("2026-02-30"), None);
        assert_eq!(parse_calendar_date("soon"), None);
    }

    #[test]
    fn days_until_is_signed() {
        let today = d(2026, 8, 6);
        assert_eq!(days_until(d(2026, 8, 6), today), 0);
        assert_eq!(days_until(d(2026, 8, 16), today), 10);
        assert_eq!(days_until(d(2026, 7, 31), today), -6);
        assert_eq!(days_until(d(2027, 8, 6), today), 365);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        // +15h is not a legal fixed offset; the fallback must still return
        // a date rather than panic.
        let _ = today_with_offset(15 * 60);
        let _ = today_with_offset(i32::MAX);
    }
}
