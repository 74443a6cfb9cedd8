use crate::record::{str_field, LogRecord, TIMESTAMP_FIELD};
use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

pub fn parse_filter_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Calendar date of an ISO-8601 timestamp, taken in the timestamp's own offset.
pub fn timestamp_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) { return Some(dt.date_naive()); }
    // `%z` has no `Z` spelling, so a UTC designator becomes an explicit offset.
    let zoned = match s.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => s.to_string(),
    };
    for f in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, f) { return Some(dt.date_naive()); }
    }
    for f in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) { return Some(dt.date()); }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Keep records whose `@timestamp` falls on `date`.
///
/// An unparseable `date` disables filtering (with an error logged) unless
/// `strict` is set, in which case it is returned as an error.
pub fn filter_by_date(records: Vec<LogRecord>, date: Option<&str>, strict: bool) -> anyhow::Result<Vec<LogRecord>> {
    let Some(raw) = date.filter(|d| !d.is_empty()) else { return Ok(records) };
    let Some(day) = parse_filter_date(raw) else {
        if strict { return Err(anyhow!("invalid date {:?}, expected YYYY-MM-DD", raw)); }
        log::error!("Invalid date {:?}, expected YYYY-MM-DD; date filter ignored", raw);
        return Ok(records);
    };
    let total = records.len();
    let kept: Vec<LogRecord> = records
        .into_iter()
        .filter(|r| str_field(r, TIMESTAMP_FIELD).and_then(timestamp_date) == Some(day))
        .collect();
    log::debug!("Date filter {}: kept {} of {} record(s)", day, kept.len(), total);
    Ok(kept)
}
