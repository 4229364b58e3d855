//! Structured filter predicates.
//!
//! Filters are a closed set: every predicate is one of the [`Predicate`]
//! variants, and the builder matches on them exhaustively. Filters parsed
//! from JSON reject unknown operator keys instead of ignoring them.

use serde_json::Value as Json;
use tablemodel_core::{Error, Result, Value};

/// Wildcard accepted in `Like` patterns; translated to SQL `%`.
pub const WILDCARD: char = '*';

/// One condition on a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field = value` (`IS NULL` for NULL)
    Equals(Value),
    /// `field LIKE pattern`, with `*` as wildcard
    Like(String),
    /// `low <= field <= high`, inclusive on both ends
    Range(Value, Value),
    /// `field IN (...)`
    In(Vec<Value>),
    /// `field > value`
    GreaterThan(Value),
    /// `field < value`
    LessThan(Value),
}

/// A predicate bound to a column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub predicate: Predicate,
}

impl Filter {
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Predicate::Equals(value.into()))
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, Predicate::Like(pattern.into()))
    }

    pub fn range(field: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::new(field, Predicate::Range(low.into(), high.into()))
    }

    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            field,
            Predicate::In(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Predicate::GreaterThan(value.into()))
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Predicate::LessThan(value.into()))
    }

    /// Parse filters from a JSON object.
    ///
    /// Each key is a column; its value is either a scalar (equality) or an
    /// object with exactly one operator key: `like`, `range`, `in`, `gt`, `lt`.
    ///
    /// ```
    /// use tablemodel_query::Filter;
    ///
    /// let filters = Filter::from_json(&serde_json::json!({
    ///     "name": {"like": "Spider*"},
    ///     "age": {"range": [18, 40]},
    /// }))
    /// .unwrap();
    /// assert_eq!(filters.len(), 2);
    /// ```
    pub fn from_json(json: &Json) -> Result<Vec<Filter>> {
        let Json::Object(map) = json else {
            return Err(Error::InvalidFilter {
                field: String::new(),
                message: "filters must be a JSON object".to_string(),
            });
        };
        map.iter()
            .map(|(field, spec)| parse_predicate(field, spec).map(|p| Filter::new(field, p)))
            .collect()
    }
}

fn invalid(field: &str, message: impl Into<String>) -> Error {
    Error::InvalidFilter {
        field: field.to_string(),
        message: message.into(),
    }
}

fn parse_predicate(field: &str, spec: &Json) -> Result<Predicate> {
    let Json::Object(ops) = spec else {
        return scalar(field, spec).map(Predicate::Equals);
    };

    let mut entries = ops.iter();
    let (op, arg) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => return Err(invalid(field, "empty operator object")),
        (Some(_), Some(_)) => return Err(invalid(field, "expected exactly one operator")),
    };

    match op.as_str() {
        "like" => match arg {
            Json::String(pattern) => Ok(Predicate::Like(pattern.clone())),
            _ => Err(invalid(field, "like expects a string pattern")),
        },
        "range" => match arg {
            Json::Array(bounds) if bounds.len() == 2 => Ok(Predicate::Range(
                scalar(field, &bounds[0])?,
                scalar(field, &bounds[1])?,
            )),
            _ => Err(invalid(field, "range expects [low, high]")),
        },
        "in" => match arg {
            Json::Array(items) => items
                .iter()
                .map(|item| scalar(field, item))
                .collect::<Result<Vec<_>>>()
                .map(Predicate::In),
            _ => Err(invalid(field, "in expects an array")),
        },
        "gt" => scalar(field, arg).map(Predicate::GreaterThan),
        "lt" => scalar(field, arg).map(Predicate::LessThan),
        other => Err(invalid(field, format!("unknown operator {other:?}"))),
    }
}

fn scalar(field: &str, json: &Json) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::BigInt)
            .or_else(|| n.as_f64().map(Value::Double))
            .ok_or_else(|| invalid(field, format!("unsupported number {n}"))),
        Json::String(s) => Ok(Value::Text(s.clone())),
        Json::Array(_) | Json::Object(_) => Err(invalid(field, "expected a scalar value")),
    }
}

/// Translate the `*` wildcard into SQL `%`.
pub fn like_pattern(pattern: &str) -> String {
    pattern.replace(WILDCARD, "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_operator() {
        let filters = Filter::from_json(&json!({
            "a": 1,
            "b": {"like": "x*"},
            "c": {"range": [1, 2.5]},
            "d": {"in": ["p", "q"]},
            "e": {"gt": 3},
            "f": {"lt": null},
        }))
        .unwrap();

        assert_eq!(
            filters,
            vec![
                Filter::eq("a", 1),
                Filter::like("b", "x*"),
                Filter::range("c", 1, 2.5),
                Filter::is_in("d", ["p", "q"]),
                Filter::gt("e", 3),
                Filter::lt("f", Value::Null),
            ]
        );
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = Filter::from_json(&json!({"age": {"between": [1, 2]}})).unwrap_err();
        match err {
            Error::InvalidFilter { field, message } => {
                assert_eq!(field, "age");
                assert!(message.contains("between"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_operators_are_rejected() {
        assert!(Filter::from_json(&json!({"a": {}})).is_err());
        assert!(Filter::from_json(&json!({"a": {"gt": 1, "lt": 5}})).is_err());
        assert!(Filter::from_json(&json!({"a": {"range": [1]}})).is_err());
        assert!(Filter::from_json(&json!({"a": {"like": 5}})).is_err());
        assert!(Filter::from_json(&json!({"a": [1, 2]})).is_err());
        assert!(Filter::from_json(&json!([1])).is_err());
    }

    #[test]
    fn wildcard_translation() {
        assert_eq!(like_pattern("abc*"), "abc%");
        assert_eq!(like_pattern("*a*c"), "%a%c");
        assert_eq!(like_pattern("plain"), "plain");
    }
}
