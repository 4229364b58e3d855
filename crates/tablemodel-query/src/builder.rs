//! Statement builders for one table.
//!
//! Every builder is a pure function of its inputs and returns SQL text plus
//! the ordered bound parameters. Column names come from the table metadata and
//! are validated; all values are bound. The only literals interpolated into
//! the text are the integer `LIMIT` / `OFFSET` values.

use tablemodel_core::{Dialect, Error, ID_COLUMN, Result, TableMeta, Value};

use crate::filter::{Filter, Predicate, like_pattern};

/// Marker prefix for descending sort directives.
pub const DESCENDING_MARKER: char = '-';

/// SQL text with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Parse a sort directive (`"name"` or `"-name"`) into column and direction.
pub fn parse_sort(directive: &str) -> (&str, Direction) {
    match directive.strip_prefix(DESCENDING_MARKER) {
        Some(column) => (column, Direction::Desc),
        None => (directive, Direction::Asc),
    }
}

/// Join non-empty fragments with single spaces.
fn compose(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds statements against one table.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    table: &'a TableMeta,
    dialect: Dialect,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(table: &'a TableMeta) -> Self {
        Self {
            table,
            dialect: Dialect::default(),
        }
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn table(&self) -> &'a TableMeta {
        self.table
    }

    /// `WHERE` clause for a flat conjunction of filters.
    ///
    /// Placeholders are numbered from `first_param`. No filters yield an empty
    /// clause and no parameters. Filters on unknown columns are rejected.
    pub fn where_clause(&self, filters: &[Filter], first_param: usize) -> Result<(String, Vec<Value>)> {
        if filters.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut fragments = Vec::with_capacity(filters.len());
        let mut params = Vec::new();
        let mut next = first_param;
        let mut bind = |value: Value, params: &mut Vec<Value>| {
            params.push(value);
            let placeholder = self.dialect.placeholder(next);
            next += 1;
            placeholder
        };

        for filter in filters {
            let field = filter.field.as_str();
            if !self.table.has_column(field) {
                return Err(Error::InvalidFilter {
                    field: field.to_string(),
                    message: format!("unknown column for table {}", self.table.name()),
                });
            }

            let fragment = match &filter.predicate {
                Predicate::Equals(Value::Null) => format!("{field} IS NULL"),
                Predicate::Equals(value) => {
                    format!("{field} = {}", bind(value.clone(), &mut params))
                }
                Predicate::Like(pattern) => {
                    let p = bind(Value::Text(like_pattern(pattern)), &mut params);
                    format!("{field} LIKE {p}")
                }
                Predicate::Range(low, high) => {
                    let lo = bind(low.clone(), &mut params);
                    let hi = bind(high.clone(), &mut params);
                    format!("{field} >= {lo} AND {field} <= {hi}")
                }
                Predicate::In(values) if values.is_empty() => "FALSE".to_string(),
                Predicate::In(values) => {
                    let placeholders: Vec<String> = values
                        .iter()
                        .map(|v| bind(v.clone(), &mut params))
                        .collect();
                    format!("{field} IN ({})", placeholders.join(", "))
                }
                Predicate::GreaterThan(value) => {
                    format!("{field} > {}", bind(value.clone(), &mut params))
                }
                Predicate::LessThan(value) => {
                    format!("{field} < {}", bind(value.clone(), &mut params))
                }
            };
            fragments.push(fragment);
        }

        Ok((format!("WHERE {}", fragments.join(" AND ")), params))
    }

    /// `ORDER BY` clause; fails if the column is unknown.
    pub fn order_by(&self, sort: Option<&str>) -> Result<String> {
        let Some(directive) = sort.filter(|s| !s.is_empty()) else {
            return Ok(String::new());
        };

        let (column, direction) = parse_sort(directive);
        if !self.table.has_column(column) {
            return Err(Error::InvalidSort {
                column: column.to_string(),
            });
        }
        Ok(format!("ORDER BY {column} {}", direction.as_sql()))
    }

    /// `LIMIT` and `OFFSET` fragments, each empty when absent.
    pub fn pagination(offset: Option<u64>, count: Option<u64>) -> (String, String) {
        let limit = count.map(|c| format!("LIMIT {c}")).unwrap_or_default();
        let offset = offset.map(|o| format!("OFFSET {o}")).unwrap_or_default();
        (limit, offset)
    }

    /// `SELECT * ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
    ///
    /// The sort directive is checked before anything else is built.
    pub fn select_many(
        &self,
        filters: &[Filter],
        sort: Option<&str>,
        offset: Option<u64>,
        count: Option<u64>,
    ) -> Result<Statement> {
        let order = self.order_by(sort)?;
        let (clause, params) = self.where_clause(filters, 1)?;
        let (limit, offset) = Self::pagination(offset, count);

        let from = format!("SELECT * FROM {}", self.table.name());
        let sql = compose(&[&from, &clause, &order, &limit, &offset]);
        tracing::trace!(sql = %sql, params = params.len(), "Built SELECT");
        Ok(Statement::new(sql, params))
    }

    /// `SELECT COUNT(*) ... WHERE ...`
    pub fn count(&self, filters: &[Filter]) -> Result<Statement> {
        let (clause, params) = self.where_clause(filters, 1)?;
        let from = format!("SELECT COUNT(*) FROM {}", self.table.name());
        Ok(Statement::new(compose(&[&from, &clause]), params))
    }

    /// Values for every column in table order; missing columns bind NULL.
    fn ordered_values(&self, values: &[(&str, Value)]) -> Vec<(String, Value)> {
        self.table
            .columns()
            .iter()
            .map(|column| {
                let value = values
                    .iter()
                    .find(|(name, _)| name == column)
                    .map_or(Value::Null, |(_, v)| v.clone());
                (column.clone(), value)
            })
            .collect()
    }

    /// Plain `INSERT` or identifier-keyed upsert.
    ///
    /// A plain insert drops the identifier column when its value is NULL so
    /// storage assigns it, and returns the assigned identifier. An upsert keeps
    /// every column and updates every column on conflict.
    pub fn insert_or_upsert(&self, values: &[(&str, Value)], upsert: bool) -> Statement {
        let mut pairs = self.ordered_values(values);
        let has_id = self.table.has_column(ID_COLUMN);
        if !upsert {
            pairs.retain(|(name, value)| !(name == ID_COLUMN && value.is_null()));
        }

        let columns: Vec<&str> = pairs.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders: Vec<String> = (1..=pairs.len())
            .map(|i| self.dialect.placeholder(i))
            .collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.name(),
            columns.join(", "),
            placeholders.join(", ")
        );

        if upsert {
            let updates: Vec<String> = columns
                .iter()
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect();
            sql.push_str(&format!(
                " ON CONFLICT ({ID_COLUMN}) DO UPDATE SET {}",
                updates.join(", ")
            ));
        } else if has_id {
            sql.push_str(&format!(" RETURNING {ID_COLUMN}"));
        }

        let params = pairs.into_iter().map(|(_, v)| v).collect();
        Statement::new(sql, params)
    }

    pub fn insert(&self, values: &[(&str, Value)]) -> Statement {
        self.insert_or_upsert(values, false)
    }

    pub fn upsert(&self, values: &[(&str, Value)]) -> Statement {
        self.insert_or_upsert(values, true)
    }

    /// `DELETE ... WHERE id = ?`
    pub fn delete_by_id(&self, id: Value) -> Statement {
        let sql = format!(
            "DELETE FROM {} WHERE {ID_COLUMN} = {}",
            self.table.name(),
            self.dialect.placeholder(1)
        );
        Statement::new(sql, vec![id])
    }
}
