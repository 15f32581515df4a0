//! Time-field resolution. Anything that cannot be read as a point in time
//! resolves to `None`, which callers treat as "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use meshmemo_core::models::{resolve_path, Metadata};
use serde_json::Value;

/// Epoch values above this are taken as milliseconds.
const EPOCH_MILLIS_CUTOFF: f64 = 1e11;

/// Parse a metadata value as a UTC timestamp.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, and epoch
/// numbers in seconds or milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s.trim()),
        Value::Number(n) => {
            let raw = n.as_f64()?;
            if !raw.is_finite() || raw < 0.0 {
                return None;
            }
            let millis = if raw > EPOCH_MILLIS_CUTOFF { raw } else { raw * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The timestamp at `time_field`, falling back to `created_at`.
pub fn resolve_timestamp(
    metadata: &Metadata,
    time_field: &str,
    created_at: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    resolve_path(metadata, time_field)
        .and_then(parse_timestamp)
        .or(created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp(&json!("2024-03-01T12:00:00+02:00")).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn parses_plain_date_and_datetime() {
        assert_eq!(parse_timestamp(&json!("2024-03-01")).unwrap().day(), 1);
        assert!(parse_timestamp(&json!("2024-03-01 08:30:00")).is_some());
    }

    #[test]
    fn parses_epoch_seconds_and_millis() {
        let secs = parse_timestamp(&json!(1_700_000_000)).unwrap();
        let millis = parse_timestamp(&json!(1_700_000_000_000u64)).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_timestamp(&json!("yesterday-ish")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
        assert!(parse_timestamp(&json!(-5)).is_none());
    }

    #[test]
    fn resolve_falls_back_to_created_at() {
        let created = Utc::now();
        let meta = json!({"meta": {"when": "not a date"}}).as_object().cloned().unwrap();
        assert_eq!(resolve_timestamp(&meta, "meta.when", Some(created)), Some(created));
        assert_eq!(resolve_timestamp(&meta, "meta.when", None), None);
    }

    #[test]
    fn resolve_reads_dotted_field() {
        let meta = json!({"meta": {"when": "2024-01-02"}}).as_object().cloned().unwrap();
        let ts = resolve_timestamp(&meta, "meta.when", None).unwrap();
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 2);
    }
}
