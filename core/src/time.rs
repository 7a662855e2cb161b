use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Display pattern used for every date cell in exported reports.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses the date shapes the backend and its forms produce.
///
/// Date-only inputs resolve to midnight UTC, which is how the backend stores them.
/// Returns `None` for anything unparseable instead of failing.
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // 1. Full timestamps ("2024-01-15T08:30:00.000Z", "+02:00" offsets)
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    // 2. Naive timestamps, read as UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt.and_utc());
        }
    }

    // 3. Plain dates
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(input, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    parse_datetime(input).map(|dt| dt.date_naive())
}

/// (month, year) bucket of a date string, month is 1-based.
pub fn month_key(input: &str) -> Option<(u32, i32)> {
    parse_date(input).map(|d| (d.month(), d.year()))
}

/// Seconds since epoch, with epoch standing in for missing or unparseable dates.
pub fn timestamp_or_epoch(input: Option<&str>) -> i64 {
    input
        .and_then(parse_datetime)
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

pub fn format_display_date(input: &str) -> Option<String> {
    parse_date(input).map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
}
