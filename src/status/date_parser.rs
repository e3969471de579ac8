use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Sheet-style layouts Google exports for a date-time cell, interpreted as local time.
const LOCAL_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse the last-updated cell. Accepts RFC 3339 (what the write endpoint
/// stamps) and the common spreadsheet display layouts.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    LOCAL_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(s, fmt).ok()?;
        Local.from_local_datetime(&naive).earliest()
    })
}

/// `HH:MM:SS` in local time when `raw` parses, otherwise `raw` unchanged.
pub fn format_time_of_day(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}
