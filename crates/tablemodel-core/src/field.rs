//! Field specifications.

use std::fmt;

use crate::types::FieldType;
use crate::value::Value;

/// Default for a field, computed once per instantiation.
#[derive(Clone)]
pub enum DefaultValue {
    /// Fixed value, cloned for each instance
    Static(Value),
    /// Zero-argument generator, called for each instance and never memoized
    Factory(fn() -> Value),
}

impl DefaultValue {
    /// Produce a fresh default.
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Static(v) => v.clone(),
            DefaultValue::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Static(v) => f.debug_tuple("Static").field(v).finish(),
            DefaultValue::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Explicit storage hints for a column.
///
/// When present, the hints replace the derived column definition: the
/// override type (if any) replaces the mapped type, and `constraints`
/// replaces the implicit `NULL` / `NOT NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageHints {
    pub data_type: Option<&'static str>,
    pub constraints: Vec<&'static str>,
}

/// Validation rules checked before a write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
}

impl FieldRules {
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
    }
}

/// Metadata about one model field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field and column name
    pub name: &'static str,
    pub field_type: FieldType,
    /// Whether the field may be absent (NULL)
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub hints: Option<StorageHints>,
    pub rules: FieldRules,
    /// Whether a secondary lookup index is created for this column
    pub indexed: bool,
}

impl FieldSpec {
    /// Create a non-nullable field with no default and no hints.
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            default: None,
            hints: None,
            rules: FieldRules::default(),
            indexed: false,
        }
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn real(name: &'static str) -> Self {
        Self::new(name, FieldType::Real)
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn binary(name: &'static str) -> Self {
        Self::new(name, FieldType::Binary)
    }

    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    /// Set nullable flag.
    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set a fixed default.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Static(value.into()));
        self
    }

    /// Set a default generator.
    pub fn default_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = Some(DefaultValue::Factory(factory));
        self
    }

    /// Override the storage column type.
    pub fn data_type(mut self, data_type: &'static str) -> Self {
        self.hints.get_or_insert_with(StorageHints::default).data_type = Some(data_type);
        self
    }

    /// Replace the implicit nullability constraint with explicit ones.
    pub fn constraints(mut self, constraints: &[&'static str]) -> Self {
        self.hints.get_or_insert_with(StorageHints::default).constraints = constraints.to_vec();
        self
    }

    /// Create a secondary index on this column.
    pub fn indexed(mut self, value: bool) -> Self {
        self.indexed = value;
        self
    }

    pub fn min(mut self, value: f64) -> Self {
        self.rules.min = Some(value);
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        self.rules.max = Some(value);
        self
    }

    pub fn min_length(mut self, value: usize) -> Self {
        self.rules.min_length = Some(value);
        self
    }

    pub fn max_length(mut self, value: usize) -> Self {
        self.rules.max_length = Some(value);
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.rules.pattern = Some(pattern);
        self
    }

    /// Fresh default for this field, if it has one.
    pub fn produce_default(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::produce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Value {
        use std::sync::atomic::{AtomicI64, Ordering};
        static NEXT: AtomicI64 = AtomicI64::new(0);
        Value::BigInt(NEXT.fetch_add(1, Ordering::SeqCst))
    }

    #[test]
    fn factory_runs_per_call() {
        let field = FieldSpec::integer("n").default_factory(counter);
        let a = field.produce_default().unwrap();
        let b = field.produce_default().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hints_accumulate() {
        let field = FieldSpec::integer("id")
            .data_type("SERIAL")
            .constraints(&["PRIMARY KEY"]);
        let hints = field.hints.unwrap();
        assert_eq!(hints.data_type, Some("SERIAL"));
        assert_eq!(hints.constraints, vec!["PRIMARY KEY"]);
    }

    #[test]
    fn plain_field_has_no_hints() {
        let field = FieldSpec::text("name").max_length(20);
        assert!(field.hints.is_none());
        assert!(!field.nullable);
        assert!(!field.rules.is_empty());
    }
}
