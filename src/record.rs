use serde_json::{Map, Value};

/// One access-log entry. No schema is enforced; consumers read fields defensively.
pub type LogRecord = Map<String, Value>;

pub const TIMESTAMP_FIELD: &str = "@timestamp";
pub const URL_FIELD: &str = "url";
/// Older array-form exports name the route `endpoint` instead of `url`.
pub const LEGACY_ENDPOINT_FIELD: &str = "endpoint";
pub const RESPONSE_TIME_FIELD: &str = "response_time";
pub const USER_AGENT_FIELD: &str = "http_user_agent";

pub fn str_field<'a>(rec: &'a LogRecord, key: &str) -> Option<&'a str> {
    rec.get(key).and_then(|v| v.as_str())
}

/// Numeric value of `key`. Strings that look like numbers are not coerced.
pub fn number_field(rec: &LogRecord, key: &str) -> Option<f64> {
    match rec.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

/// Endpoint of a record: `url`, falling back to the legacy `endpoint` key. Empty strings count as absent.
pub fn endpoint(rec: &LogRecord) -> Option<&str> {
    let url = str_field(rec, URL_FIELD).filter(|s| !s.is_empty());
    url.or_else(|| str_field(rec, LEGACY_ENDPOINT_FIELD).filter(|s| !s.is_empty()))
}
