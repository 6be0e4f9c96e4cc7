use chrono::{DateTime, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartDateFormat {
    Year,       // 2024
    MonthYear,  // Jan 2024
    DayMonth,   // 12 Jan
    HourMin,    // 10:30
    HourMinSec, // 10:30:15
}

impl SmartDateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            SmartDateFormat::Year => "%Y",
            SmartDateFormat::MonthYear => "%b %Y",
            SmartDateFormat::DayMonth => "%d %b",
            SmartDateFormat::HourMin => "%H:%M",
            SmartDateFormat::HourMinSec => "%H:%M:%S",
        }
    }
}

/// Picks a label format for a visible span given in milliseconds.
pub fn determine_date_format(span_ms: f64) -> SmartDateFormat {
    const MINUTE: f64 = 60_000.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;
    const MONTH: f64 = 30.0 * DAY;
    const YEAR: f64 = 365.0 * DAY;

    if span_ms > YEAR * 2.0 {
        SmartDateFormat::Year
    } else if span_ms > MONTH * 2.0 {
        SmartDateFormat::MonthYear
    } else if span_ms > DAY * 1.5 {
        SmartDateFormat::DayMonth
    } else if span_ms > MINUTE * 5.0 {
        SmartDateFormat::HourMin
    } else {
        SmartDateFormat::HourMinSec
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into epoch milliseconds (UTC).
pub fn parse_date(input: &str) -> Option<i64> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Formats epoch milliseconds with a strftime pattern. Out-of-range instants print the raw number.
pub fn format_millis(ms: i64, pattern: &str) -> String {
    match Utc.timestamp_millis_opt(ms) {
        chrono::LocalResult::Single(dt) => dt.format(pattern).to_string(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.format(pattern).to_string(),
        chrono::LocalResult::None => ms.to_string(),
    }
}
