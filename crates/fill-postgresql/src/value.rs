//! SQL literal rendering of generated values.
//!
//! Literals are untyped and coerced by the server to the column type.

use fill_core::GeneratedValue;

/// Quote a string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\0', "").replace('\'', "''"))
}

/// Render a generated value as a SQL literal.
pub fn to_literal(value: &GeneratedValue) -> String {
    match value {
        GeneratedValue::Null => "NULL".to_string(),
        GeneratedValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        GeneratedValue::Int64(i) => i.to_string(),
        GeneratedValue::Float64(f) if f.is_finite() => f.to_string(),
        GeneratedValue::Float64(f) => quote_literal(&f.to_string()),
        GeneratedValue::String(s) => quote_literal(s),
        GeneratedValue::Uuid(u) => quote_literal(&u.to_string()),
        GeneratedValue::DateTime(dt) => {
            quote_literal(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        GeneratedValue::Time(t) => quote_literal(&t.format("%H:%M:%S").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Utc};

    #[test]
    fn test_scalar_literals() {
        assert_eq!(to_literal(&GeneratedValue::Null), "NULL");
        assert_eq!(to_literal(&GeneratedValue::Bool(false)), "FALSE");
        assert_eq!(to_literal(&GeneratedValue::Int64(-12)), "-12");
        assert_eq!(to_literal(&GeneratedValue::Float64(1.5)), "1.5");
        assert_eq!(to_literal(&GeneratedValue::Float64(f64::NAN)), "'NaN'");
    }

    #[test]
    fn test_string_literal_escapes_quotes() {
        assert_eq!(to_literal(&GeneratedValue::from("O'Brien")), "'O''Brien'");
        assert_eq!(to_literal(&GeneratedValue::from("{1,2}")), "'{1,2}'");
    }

    #[test]
    fn test_temporal_literals() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            to_literal(&GeneratedValue::DateTime(dt)),
            "'2024-03-09 14:05:07'"
        );
        let t = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(to_literal(&GeneratedValue::Time(t)), "'08:30:00'");
    }
}
