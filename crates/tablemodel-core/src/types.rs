//! Semantic field types and their storage column types.

use crate::value::Value;

/// Semantic type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Real,
    Text,
    Boolean,
    Binary,
    Timestamp,
    /// Anything without a dedicated column type; stored as text
    Opaque,
}

impl FieldType {
    /// Default PostgreSQL column type for this semantic type.
    pub const fn sql_name(self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Real => "REAL",
            FieldType::Text | FieldType::Opaque => "TEXT",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Binary => "BYTEA",
            FieldType::Timestamp => "TIMESTAMP",
        }
    }

    /// Whether a non-null value is acceptable for a field of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (FieldType::Integer, Value::BigInt(_)) => true,
            (FieldType::Real, Value::Double(_) | Value::BigInt(_)) => true,
            (FieldType::Text, Value::Text(_)) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Binary, Value::Bytes(_)) => true,
            (FieldType::Timestamp, Value::Timestamp(_)) => true,
            (FieldType::Opaque, _) => true,
            _ => false,
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Real)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_mapping() {
        assert_eq!(FieldType::Integer.sql_name(), "INTEGER");
        assert_eq!(FieldType::Real.sql_name(), "REAL");
        assert_eq!(FieldType::Text.sql_name(), "TEXT");
        assert_eq!(FieldType::Boolean.sql_name(), "BOOLEAN");
        assert_eq!(FieldType::Binary.sql_name(), "BYTEA");
        assert_eq!(FieldType::Timestamp.sql_name(), "TIMESTAMP");
        assert_eq!(FieldType::Opaque.sql_name(), "TEXT");
    }

    #[test]
    fn accepts_matching_values() {
        assert!(FieldType::Integer.accepts(&Value::BigInt(1)));
        assert!(!FieldType::Integer.accepts(&Value::Text("1".into())));
        assert!(FieldType::Real.accepts(&Value::BigInt(1)));
        assert!(FieldType::Opaque.accepts(&Value::Bool(true)));
        assert!(FieldType::Boolean.accepts(&Value::Null));
    }
}
