//! Coercion of loose input values to declared field types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::config::NullConfig;

/// Naive timestamp layouts accepted in addition to RFC 3339, read as UTC
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Returns the string payload unless the value counts as missing
fn present<'a>(value: &'a Value, nulls: &NullConfig) -> Option<Option<&'a str>> {
    match value {
        Value::Null => None,
        Value::String(s) if nulls.is_null(s) => None,
        Value::String(s) => Some(Some(s.trim())),
        _ => Some(None),
    }
}

pub(crate) fn text(value: &Value, nulls: &NullConfig) -> Option<String> {
    match (present(value, nulls)?, value) {
        (Some(s), _) => Some(s.to_string()),
        (None, Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn real(value: &Value, nulls: &NullConfig) -> Option<f64> {
    let parsed = match (present(value, nulls)?, value) {
        (Some(s), _) => s.parse::<f64>().ok(),
        (None, Value::Number(n)) => n.as_f64(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

pub(crate) fn integer(value: &Value, nulls: &NullConfig) -> Option<i64> {
    match (present(value, nulls)?, value) {
        (Some(s), _) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().and_then(whole)),
        (None, Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        _ => None,
    }
}

pub(crate) fn boolean(value: &Value, nulls: &NullConfig) -> Option<bool> {
    match (present(value, nulls)?, value) {
        (Some(s), _) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        (None, Value::Bool(b)) => Some(*b),
        (None, Value::Number(n)) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn instant(value: &Value, nulls: &NullConfig) -> Option<DateTime<Utc>> {
    match (present(value, nulls)?, value) {
        (Some(s), _) => parse_instant(s),
        (None, Value::Number(n)) => {
            let millis = n.as_i64().or_else(|| n.as_f64().and_then(whole))?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

/// Parse epoch milliseconds or an RFC 3339 / ISO 8601 timestamp; offset-less
/// forms are taken as UTC
pub(crate) fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Integral value of a float, if it has no fractional part and fits in i64
fn whole(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}
