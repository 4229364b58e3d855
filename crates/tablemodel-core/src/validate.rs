//! Runtime validation of model values against their field specifications.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

use crate::error::ValidationError;
use crate::field::FieldSpec;
use crate::model::ModelDescription;
use crate::value::Value;

/// Compiled patterns, shared for the lifetime of the program.
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Check if a string matches a regex pattern.
///
/// An invalid pattern never matches (and is logged).
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid regex pattern in validation, treating as non-match"
            );
            false
        }
    }
}

/// Check a single value against its field, recording failures.
pub fn validate_value(field: &FieldSpec, value: &Value, errors: &mut ValidationError) {
    let name = field.name;

    if value.is_null() {
        if !field.nullable {
            errors.add_required(name);
        }
        return;
    }

    if !field.field_type.accepts(value) {
        errors.add_type(name, field.field_type.sql_name(), value.type_name());
        return;
    }

    let rules = &field.rules;
    if let Some(n) = value.as_f64().filter(|_| field.field_type.is_numeric()) {
        if let Some(min) = rules.min.filter(|min| n < *min) {
            errors.add_min(name, min, n);
        }
        if let Some(max) = rules.max.filter(|max| n > *max) {
            errors.add_max(name, max, n);
        }
    }

    if let Value::Text(s) = value {
        let len = s.chars().count();
        if let Some(min) = rules.min_length.filter(|min| len < *min) {
            errors.add_min_length(name, min, len);
        }
        if let Some(max) = rules.max_length.filter(|max| len > *max) {
            errors.add_max_length(name, max, len);
        }
        if let Some(pattern) = rules.pattern {
            if !matches_pattern(s, pattern) {
                errors.add_pattern(name, pattern);
            }
        }
    }
}

/// Validate a full set of model values.
///
/// NULL values of non-nullable fields are first replaced by the field's
/// default, when it has one. Values for names the description does not know
/// are left untouched. All failures are reported together.
pub fn validate_row(
    description: &ModelDescription,
    values: &mut [(&'static str, Value)],
) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();

    for field in description.fields() {
        let Some(slot) = values.iter_mut().find(|(name, _)| *name == field.name) else {
            if !field.nullable && field.default.is_none() {
                errors.add_required(field.name);
            }
            continue;
        };

        if slot.1.is_null() && !field.nullable {
            if let Some(default) = field.produce_default() {
                slot.1 = default;
            }
        }

        validate_value(field, &slot.1, &mut errors);
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;

    fn description() -> ModelDescription {
        ModelDescription::builder("Account")
            .field(FieldSpec::text("email").pattern(r"^[^@\s]+@[^@\s]+\.[a-z]{2,}$"))
            .field(FieldSpec::integer("age").min(0.0).max(150.0))
            .field(FieldSpec::text("nick").nullable(true).min_length(2).max_length(8))
            .field(FieldSpec::text("status").default_value("active"))
            .build()
    }

    #[test]
    fn test_matches_email_pattern() {
        let email_pattern = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

        assert!(matches_pattern("test@example.com", email_pattern));
        assert!(!matches_pattern("invalid", email_pattern));
    }

    #[test]
    fn test_invalid_pattern_returns_false() {
        assert!(!matches_pattern("anything", r"[unclosed"));
    }

    #[test]
    fn valid_row_passes() {
        let mut values = vec![
            ("email", Value::from("a@b.io")),
            ("age", Value::from(30)),
            ("nick", Value::Null),
            ("status", Value::from("idle")),
        ];
        assert!(validate_row(&description(), &mut values).is_ok());
    }

    #[test]
    fn null_non_nullable_takes_default() {
        let mut values = vec![
            ("email", Value::from("a@b.io")),
            ("age", Value::from(30)),
            ("nick", Value::Null),
            ("status", Value::Null),
        ];
        validate_row(&description(), &mut values).unwrap();
        assert_eq!(values[3].1, Value::from("active"));
    }

    #[test]
    fn collects_every_failure() {
        let mut values = vec![
            ("email", Value::from("nope")),
            ("age", Value::from(-4)),
            ("nick", Value::from("a-very-long-nick")),
            ("status", Value::from(3)),
        ];
        let err = validate_row(&description(), &mut values).unwrap_err();

        let kinds: Vec<_> = err.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::Pattern,
                ValidationErrorKind::Min,
                ValidationErrorKind::MaxLength,
                ValidationErrorKind::Type,
            ]
        );
    }

    #[test]
    fn missing_required_field_is_reported() {
        let mut values = vec![("email", Value::from("a@b.io"))];
        let err = validate_row(&description(), &mut values).unwrap_err();
        assert_eq!(err.for_field("age").count(), 1);
        assert_eq!(err.for_field("status").count(), 0);
    }
}
