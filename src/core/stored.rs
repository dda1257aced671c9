//! Lenient field readers for records loaded from storage.
//!
//! Stored data may come from older versions or other front ends. Each reader
//! maps what it finds onto a valid value instead of failing the whole record.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use super::validate;

/// A UUID, or a fresh one when the stored id is in some other format
/// (older data used millisecond timestamps).
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let parsed = match &raw {
        Value::String(s) => Uuid::parse_str(s.trim()).ok(),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        let id = Uuid::new_v4();
        log::debug!("Replacing stored id {} with {}", raw, id);
        id
    }))
}

/// Naive local time, or an RFC 3339 instant (`...Z`) converted to local time.
pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Local).naive_local())
    })
}

/// Goal target: any number or numeric string, at least 1.
pub fn target<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(validate::target(count(Value::deserialize(deserializer)?).unwrap_or(1)))
}

/// Goal progress: never negative. The upper bound depends on the target and
/// is applied once the whole record is read.
pub fn current<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(validate::current(
        count(Value::deserialize(deserializer)?).unwrap_or(0),
        u32::MAX,
    ))
}

/// `YYYY-MM-DD`; blank, null or malformed values mean no deadline.
pub fn optional_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<chrono::NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(validate::date))
}

/// Blank stored text means absent.
pub fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(validate::optional_text(Option::<String>::deserialize(deserializer)?))
}

fn count(raw: Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => validate::parse_int(&s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn timestamps_accept_naive_and_rfc3339() {
        let naive = NaiveDate::from_ymd_opt(2026, 2, 23)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2026-02-23T14:00:00"), Some(naive));
        let utc = DateTime::parse_from_rfc3339("2026-02-23T14:00:00.000Z").unwrap();
        assert_eq!(
            parse_timestamp("2026-02-23T14:00:00.000Z"),
            Some(utc.with_timezone(&Local).naive_local())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn counts_accept_numbers_and_numeric_strings() {
        assert_eq!(count(serde_json::json!(4)), Some(4));
        assert_eq!(count(serde_json::json!(-3)), Some(-3));
        assert_eq!(count(serde_json::json!(2.7)), Some(2));
        assert_eq!(count(serde_json::json!("12")), Some(12));
        assert_eq!(count(serde_json::json!(null)), None);
    }
}
