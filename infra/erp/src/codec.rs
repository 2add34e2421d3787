//! Conversions between the server's tagged JSON values and plain JSON.
//!
//! The server tags non-JSON types with `__class__`:
//! `{"__class__": "date", "year": 2024, "month": 3, "day": 1}`,
//! `{"__class__": "datetime", ...}`, `{"__class__": "Decimal", "decimal": "12.50"}`,
//! `{"__class__": "bytes", "base64": "..."}`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value, json};

const CLASS: &str = "__class__";

/// Wire encoding of a date argument.
#[must_use]
pub fn date(value: NaiveDate) -> Value {
    use chrono::Datelike;
    json!({ "__class__": "date", "year": value.year(), "month": value.month(), "day": value.day() })
}

/// Replaces tagged values, recursively, by strings:
/// dates become `YYYY-MM-DD`, datetimes `YYYY-MM-DDTHH:MM:SS`, decimals their text
/// and bytes their base64 payload. Anything unrecognised is kept as is.
#[must_use]
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => match decode_tagged(&map) {
            Some(plain) => plain,
            None => Value::Object(map.into_iter().map(|(k, v)| (k, normalize(v))).collect()),
        },
        other => other,
    }
}

/// Reads a date from either a tagged value or an ISO `YYYY-MM-DD` string.
#[must_use]
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(text) => NaiveDate::parse_from_str(text.get(..10).unwrap_or(text.as_str()), "%Y-%m-%d").ok(),
        Value::Object(map) => match map.get(CLASS).and_then(Value::as_str) {
            Some("date" | "datetime") => ymd(map),
            _ => None,
        },
        _ => None,
    }
}

fn decode_tagged(map: &Map<String, Value>) -> Option<Value> {
    let class = map.get(CLASS)?.as_str()?;
    match class {
        "date" => ymd(map).map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        "datetime" => {
            let date = ymd(map)?;
            let time = NaiveTime::from_hms_opt(
                field_u32(map, "hour").unwrap_or(0),
                field_u32(map, "minute").unwrap_or(0),
                field_u32(map, "second").unwrap_or(0),
            )?;
            Some(Value::String(NaiveDateTime::new(date, time).format("%Y-%m-%dT%H:%M:%S").to_string()))
        },
        "time" => {
            let time = NaiveTime::from_hms_opt(
                field_u32(map, "hour").unwrap_or(0),
                field_u32(map, "minute").unwrap_or(0),
                field_u32(map, "second").unwrap_or(0),
            )?;
            Some(Value::String(time.format("%H:%M:%S").to_string()))
        },
        "Decimal" => match map.get("decimal")? {
            Value::String(text) => Some(Value::String(text.clone())),
            Value::Number(number) => Some(Value::String(number.to_string())),
            _ => None,
        },
        "bytes" => map.get("base64").and_then(Value::as_str).map(|b| Value::String(b.to_owned())),
        _ => None,
    }
}

fn ymd(map: &Map<String, Value>) -> Option<NaiveDate> {
    let year = i32::try_from(map.get("year")?.as_i64()?).ok()?;
    NaiveDate::from_ymd_opt(year, field_u32(map, "month")?, field_u32(map, "day")?)
}

fn field_u32(map: &Map<String, Value>, key: &str) -> Option<u32> {
    map.get(key).and_then(Value::as_u64).and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_flattened_to_iso_strings() {
        let wire = json!({"__class__": "date", "year": 2024, "month": 3, "day": 9});
        assert_eq!(normalize(wire), json!("2024-03-09"));
    }

    #[test]
    fn datetimes_keep_seconds_precision() {
        let wire = json!({
            "__class__": "datetime", "year": 2024, "month": 12, "day": 31,
            "hour": 23, "minute": 5, "second": 7, "microsecond": 120
        });
        assert_eq!(normalize(wire), json!("2024-12-31T23:05:07"));
    }

    #[test]
    fn decimals_and_bytes_become_strings() {
        assert_eq!(normalize(json!({"__class__": "Decimal", "decimal": "12.50"})), json!("12.50"));
        assert_eq!(normalize(json!({"__class__": "bytes", "base64": "aGk="})), json!("aGk="));
    }

    #[test]
    fn nested_values_are_normalized() {
        let wire = json!([{
            "id": 1,
            "esale_price": {"__class__": "Decimal", "decimal": "99"},
            "sessions": [{"training_start_date": {"__class__": "date", "year": 2025, "month": 1, "day": 2}}]
        }]);
        assert_eq!(
            normalize(wire),
            json!([{"id": 1, "esale_price": "99", "sessions": [{"training_start_date": "2025-01-02"}]}])
        );
    }

    #[test]
    fn unknown_classes_are_untouched() {
        let wire = json!({"__class__": "timedelta", "seconds": 3});
        assert_eq!(normalize(wire.clone()), wire);
    }

    #[test]
    fn date_encoding_is_read_back() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(parse_date(&date(day)), Some(day));
        assert_eq!(parse_date(&json!("2025-06-30")), Some(day));
        assert_eq!(parse_date(&json!("2025-06-30T10:00:00")), Some(day));
        assert_eq!(parse_date(&json!("yesterday")), None);
    }
}
