//! Database rows keyed by column name.

use std::sync::Arc;

use crate::error::Result;
use crate::value::{FromValue, Value};

/// One result row with its column names.
///
/// The column list is shared between all rows of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Pair a column list with raw values positionally.
    ///
    /// Extra values beyond the column list are dropped; missing ones read as NULL.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.truncate(columns.len());
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs, such as [`Model::to_row`] output.
    ///
    /// [`Model::to_row`]: crate::Model::to_row
    pub fn from_pairs<N: Into<String>>(pairs: impl IntoIterator<Item = (N, Value)>) -> Self {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(n, v)| (n.into(), v)).unzip();
        Self::new(columns.into(), values)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value at a position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Raw value for a column; absent columns read as NULL.
    pub fn value(&self, name: &str) -> &Value {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.values.get(idx))
            .unwrap_or(&Value::Null)
    }

    /// Decode a column into a Rust type.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(self.value(name), name)
    }

    /// Iterate `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().chain(std::iter::repeat(&Value::Null)))
    }
}
