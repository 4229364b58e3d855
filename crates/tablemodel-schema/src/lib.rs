//! Table definitions derived from model descriptions.
//!
//! `tablemodel-schema` is the schema synthesizer: it maps resolved fields to
//! column definitions and produces an idempotent `CREATE TABLE IF NOT EXISTS`
//! statement plus secondary index statements.
//!
//! Re-running synthesis against an existing, matching table is a no-op.
//! Schema evolution is not handled: a mismatched existing table is left as is.

pub mod ddl;
pub mod naming;

use tablemodel_core::{
    Dialect, Error, ModelDescription, Result, TableMeta, is_valid_identifier,
};

/// Synthesizes [`TableMeta`] for model descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBuilder {
    dialect: Dialect,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Derive table metadata.
    ///
    /// `table_name` overrides both the description's explicit name and the
    /// pluralized model name.
    pub fn synthesize(
        &self,
        description: &ModelDescription,
        table_name: Option<&str>,
    ) -> Result<TableMeta> {
        let name = table_name
            .map(str::to_string)
            .or_else(|| description.table_name().map(str::to_string))
            .unwrap_or_else(|| naming::table_name(description.name()));

        if !is_valid_identifier(&name) {
            return Err(Error::Schema {
                message: format!("invalid table name: {name:?}"),
            });
        }

        let fields = description.fields();
        if fields.is_empty() {
            return Err(Error::Schema {
                message: format!("model {} has no fields", description.name()),
            });
        }
        if let Some(bad) = fields.iter().find(|f| !is_valid_identifier(f.name)) {
            return Err(Error::Schema {
                message: format!("invalid column name: {:?}", bad.name),
            });
        }

        let create_sql = ddl::create_table(&name, fields, self.dialect);
        let index_sql = ddl::create_indexes(&name, fields);

        tracing::debug!(
            table = %name,
            sql = %create_sql,
            indexes = index_sql.len(),
            "Synthesized table schema"
        );

        let columns = fields.iter().map(|f| f.name.to_string()).collect();
        Ok(TableMeta::new(name, columns, create_sql, index_sql))
    }
}

/// Synthesize PostgreSQL table metadata with the default table name.
pub fn synthesize(description: &ModelDescription) -> Result<TableMeta> {
    SchemaBuilder::new().synthesize(description, None)
}
