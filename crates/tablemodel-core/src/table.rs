//! Derived table metadata.

use std::sync::Arc;

/// Everything derived from a model description for one table.
///
/// Immutable once synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    name: String,
    columns: Arc<[String]>,
    create_sql: String,
    index_sql: Vec<String>,
}

impl TableMeta {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        create_sql: String,
        index_sql: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into(),
            create_sql,
            index_sql,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in model order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Shared handle to the column list, for building rows.
    pub fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// `CREATE TABLE IF NOT EXISTS ...`
    pub fn create_sql(&self) -> &str {
        &self.create_sql
    }

    /// `CREATE INDEX IF NOT EXISTS ...` statements.
    pub fn index_sql(&self) -> &[String] {
        &self.index_sql
    }

    /// Create statement followed by the index statements.
    pub fn schema_statements(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.create_sql.as_str()).chain(self.index_sql.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_statements_start_with_create() {
        let meta = TableMeta::new(
            "heroes",
            vec!["id".into(), "slug".into()],
            "CREATE TABLE IF NOT EXISTS heroes (id SERIAL PRIMARY KEY, slug TEXT)".into(),
            vec!["CREATE INDEX IF NOT EXISTS idx_heroes_slug ON heroes (slug)".into()],
        );
        let stmts: Vec<_> = meta.schema_statements().collect();
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].starts_with("CREATE TABLE"));
        assert!(meta.has_column("slug"));
        assert!(!meta.has_column("name"));
    }
}
