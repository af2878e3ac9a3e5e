//! Value representations produced by generators and consumed by connectors.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Raw generated value before engine-specific conversion.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedValue {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit floating point
    Float64(f64),

    /// String value
    String(String),

    /// UUID value
    Uuid(Uuid),

    /// Date/time in UTC
    DateTime(DateTime<Utc>),

    /// Time of day
    Time(NaiveTime),
}

impl GeneratedValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value from a settings file into a generated value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int64(i),
                None => Self::Float64(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::String(s.clone()),
            other => Self::String(other.to_string()),
        }
    }

    /// Stable textual key used to compare values for uniqueness.
    pub fn unique_key(&self) -> String {
        match self {
            Self::Null => "\0null".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for GeneratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
        }
    }
}

impl From<i64> for GeneratedValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<&str> for GeneratedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for GeneratedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// A generated row: column values in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, GeneratedValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append a column value.
    pub fn push(&mut self, column: impl Into<String>, value: GeneratedValue) {
        self.values.push((column.into(), value));
    }

    /// Get the value of a column generated earlier in this row.
    pub fn get(&self, column: &str) -> Option<&GeneratedValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &GeneratedValue> {
        self.values.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneratedValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, GeneratedValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, GeneratedValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        assert_eq!(
            GeneratedValue::from_json(&serde_json::json!(3)),
            GeneratedValue::Int64(3)
        );
        assert_eq!(
            GeneratedValue::from_json(&serde_json::json!(1.5)),
            GeneratedValue::Float64(1.5)
        );
        assert_eq!(
            GeneratedValue::from_json(&serde_json::json!("paid")),
            GeneratedValue::String("paid".to_string())
        );
        assert!(GeneratedValue::from_json(&serde_json::Value::Null).is_null());
    }

    #[test]
    fn test_row_lookup_keeps_order() {
        let mut row = Row::new();
        row.push("id", GeneratedValue::Int64(1));
        row.push("name", "alice".into());

        assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("alice"));
        assert!(row.get("missing").is_none());
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_display_datetime() {
        let dt = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(
            GeneratedValue::DateTime(dt).to_string(),
            "1970-01-01 00:00:00"
        );
    }

    #[test]
    fn test_unique_key_distinguishes_null() {
        assert_ne!(
            GeneratedValue::Null.unique_key(),
            GeneratedValue::String("NULL".to_string()).unique_key()
        );
    }
}
