//! Dynamic SQL values.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single scalar passed to or read from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer column (narrowed by the connector when binding)
    BigInt(i64),
    /// Any floating point column
    Double(f64),
    /// Text, including opaque values stored as text
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::BigInt(_) => "INTEGER",
            Value::Double(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BYTEA",
            Value::Timestamp(_) => "TIMESTAMP",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::BigInt(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::BigInt(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::BigInt(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Decode a [`Value`] into a Rust type.
///
/// `column` is only used for error reporting.
pub trait FromValue: Sized {
    fn from_value(value: &Value, column: &str) -> Result<Self>;
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> Error {
    Error::Conversion {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _column: &str) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch(column, "BOOLEAN", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::BigInt(v) => Ok(*v),
            other => Err(mismatch(column, "INTEGER", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::BigInt(v) => i32::try_from(*v).map_err(|_| Error::Conversion {
                column: column.to_string(),
                expected: "INTEGER (32-bit)",
                found: "out of range INTEGER",
            }),
            other => Err(mismatch(column, "INTEGER", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| mismatch(column, "REAL", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch(column, "TEXT", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(mismatch(column, "BYTEA", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            other => Err(mismatch(column, "TIMESTAMP", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value, column).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".to_string()));
    }

    #[test]
    fn decode_optional_null() {
        let v: Option<i64> = FromValue::from_value(&Value::Null, "id").unwrap();
        assert_eq!(v, None);
        let v: Option<i64> = FromValue::from_value(&Value::BigInt(4), "id").unwrap();
        assert_eq!(v, Some(4));
    }

    #[test]
    fn decode_mismatch_names_column() {
        let err = <i64 as FromValue>::from_value(&Value::Text("x".into()), "age").unwrap_err();
        match err {
            Error::Conversion {
                column,
                expected,
                found,
            } => {
                assert_eq!(column, "age");
                assert_eq!(expected, "INTEGER");
                assert_eq!(found, "TEXT");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integers_widen_to_real() {
        let v: f64 = FromValue::from_value(&Value::BigInt(3), "score").unwrap();
        assert!((v - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_scalars() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::BigInt(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Value::from("a")).unwrap(), "\"a\"");

        let parsed: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::BigInt(3),
                Value::Double(2.5),
                Value::Text("x".into()),
            ]
        );
    }

    #[test]
    fn i32_rejects_out_of_range() {
        let res = <i32 as FromValue>::from_value(&Value::BigInt(i64::MAX), "n");
        assert!(res.is_err());
    }
}
