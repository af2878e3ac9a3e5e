//! Conversion between generated values and `mysql_async` values.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike};
use fill_core::GeneratedValue;
use mysql_async::Value;

/// Bind a generated value as a positional parameter.
pub fn to_mysql(value: &GeneratedValue) -> Value {
    match value {
        GeneratedValue::Null => Value::NULL,
        GeneratedValue::Bool(b) => Value::Int(i64::from(*b)),
        GeneratedValue::Int64(i) => Value::Int(*i),
        GeneratedValue::Float64(f) => Value::Double(*f),
        GeneratedValue::String(s) => Value::Bytes(s.as_bytes().to_vec()),
        GeneratedValue::Uuid(u) => Value::Bytes(u.to_string().into_bytes()),
        GeneratedValue::DateTime(dt) => Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            0,
        ),
        GeneratedValue::Time(t) => Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            0,
        ),
    }
}

/// Read a value fetched from the database, e.g. a foreign key candidate.
pub fn from_mysql(value: Value) -> GeneratedValue {
    match value {
        Value::NULL => GeneratedValue::Null,
        Value::Int(i) => GeneratedValue::Int64(i),
        Value::UInt(u) => GeneratedValue::Int64(u as i64),
        Value::Float(f) => GeneratedValue::Float64(f64::from(f)),
        Value::Double(f) => GeneratedValue::Float64(f),
        Value::Bytes(bytes) => GeneratedValue::String(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
                .and_then(|d| {
                    d.and_hms_micro_opt(
                        u32::from(hour),
                        u32::from(minute),
                        u32::from(second),
                        micros,
                    )
                })
                .map(|dt| GeneratedValue::DateTime(DateTime::from_naive_utc_and_offset(dt, chrono::Utc)))
                .unwrap_or(GeneratedValue::Null)
        }
        Value::Time(_, _, hour, minute, second, micros) => NaiveTime::from_hms_micro_opt(
            u32::from(hour),
            u32::from(minute),
            u32::from(second),
            micros,
        )
        .map(GeneratedValue::Time)
        .unwrap_or(GeneratedValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_mysql_scalars() {
        assert_eq!(to_mysql(&GeneratedValue::Null), Value::NULL);
        assert_eq!(to_mysql(&GeneratedValue::Bool(true)), Value::Int(1));
        assert_eq!(to_mysql(&GeneratedValue::Int64(-5)), Value::Int(-5));
        assert_eq!(
            to_mysql(&GeneratedValue::from("abc")),
            Value::Bytes(b"abc".to_vec())
        );
    }

    #[test]
    fn test_to_mysql_datetime() {
        let dt = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            to_mysql(&GeneratedValue::DateTime(dt)),
            Value::Date(2024, 3, 9, 14, 5, 7, 0)
        );
    }

    #[test]
    fn test_from_mysql_foreign_key_values() {
        assert_eq!(from_mysql(Value::UInt(7)), GeneratedValue::Int64(7));
        assert_eq!(
            from_mysql(Value::Bytes(b"FR".to_vec())),
            GeneratedValue::from("FR")
        );
        match from_mysql(Value::Date(2020, 1, 2, 3, 4, 5, 0)) {
            GeneratedValue::DateTime(dt) => assert_eq!(dt.year(), 2020),
            other => panic!("Expected DateTime, got {other:?}"),
        }
    }
}
