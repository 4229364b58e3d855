//! Options for multi-row lookups.

use serde::{Deserialize, Deserializer};
use tablemodel_query::Filter;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Filters, sort directive and pagination for [`Table::find_many`](crate::Table::find_many).
///
/// Can be deserialized from JSON such as
/// `{"offset": 20, "count": 10, "sort": "-age", "filters": {"name": {"like": "A*"}}}`;
/// every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Find {
    pub offset: Option<u64>,
    pub count: Option<u64>,
    pub sort: Option<String>,
    #[serde(deserialize_with = "filters_from_json")]
    pub filters: Vec<Filter>,
}

fn filters_from_json<'de, D>(deserializer: D) -> Result<Vec<Filter>, D::Error>
where
    D: Deserializer<'de>,
{
    let json = serde_json::Value::deserialize(deserializer)?;
    if json.is_null() {
        return Ok(Vec::new());
    }
    Filter::from_json(&json).map_err(serde::de::Error::custom)
}

impl Find {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Sort by a column; prefix with `-` for descending order.
    pub fn sort(mut self, directive: impl Into<String>) -> Self {
        self.sort = Some(directive.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }
}

impl From<Vec<Filter>> for Find {
    fn from(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }
}
