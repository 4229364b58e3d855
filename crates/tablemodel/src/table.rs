//! The table gateway.
//!
//! A [`Table`] binds one [`Model`] type to one storage table through a
//! [`Connector`]. Constructing it synthesizes the schema and issues the
//! idempotent create statements; every operation afterwards is a single
//! autocommitted statement.

use std::marker::PhantomData;

use tablemodel_core::{
    Connector, Dialect, Error, Model, QueryError, QueryErrorKind, Result, Row, TableMeta,
    ValidationError, Value, now, validate_row,
};
use tablemodel_query::{Filter, QueryBuilder};
use tablemodel_schema::SchemaBuilder;
use tracing::Span;

use crate::find::Find;

/// Outcome of a write that may be rejected by validation.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Write {
    /// The statement was executed
    Applied,
    /// The instance failed validation; nothing was sent to storage
    Rejected(ValidationError),
}

impl Write {
    pub fn is_applied(&self) -> bool {
        matches!(self, Write::Applied)
    }

    /// Validation failures, if the write was rejected.
    pub fn rejection(&self) -> Option<&ValidationError> {
        match self {
            Write::Applied => None,
            Write::Rejected(errors) => Some(errors),
        }
    }

    /// Turn a rejection into an [`Error::Validation`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Write::Applied => Ok(()),
            Write::Rejected(errors) => Err(Error::Validation(errors)),
        }
    }
}

/// Validated values ready to be written, or why they were rejected.
type Validated = std::result::Result<Vec<(&'static str, Value)>, ValidationError>;

/// Options for constructing a [`Table`].
#[derive(Debug)]
pub struct TableBuilder<M> {
    table_name: Option<String>,
    dialect: Dialect,
    span: Option<Span>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for TableBuilder<M> {
    fn default() -> Self {
        Self {
            table_name: None,
            dialect: Dialect::default(),
            span: None,
            _model: PhantomData,
        }
    }
}

impl<M: Model> TableBuilder<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this table name instead of the model's.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Span entered around every operation of the table.
    ///
    /// Defaults to an `info`-level `table` span carrying the table name.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Synthesize the schema and create the table if it does not exist.
    ///
    /// Failure to create the table is returned as is; nothing is retried.
    pub fn build<C: Connector>(self, mut connector: C) -> Result<Table<M, C>> {
        let meta = SchemaBuilder::new()
            .dialect(self.dialect)
            .synthesize(M::description(), self.table_name.as_deref())?;
        let span = self
            .span
            .unwrap_or_else(|| tracing::info_span!("table", name = %meta.name()));

        {
            let _entered = span.enter();
            for statement in meta.schema_statements() {
                connector.execute(statement, &[])?;
            }
            tracing::debug!(columns = meta.columns().len(), "Table ready");
        }

        Ok(Table {
            connector,
            meta,
            dialect: self.dialect,
            span,
            _model: PhantomData,
        })
    }
}

/// Typed CRUD and query access to one table.
#[derive(Debug)]
pub struct Table<M, C> {
    connector: C,
    meta: TableMeta,
    dialect: Dialect,
    span: Span,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, C: Connector> Table<M, C> {
    /// Create the gateway with default options.
    pub fn new(connector: C) -> Result<Self> {
        TableBuilder::new().build(connector)
    }

    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    /// Release the gateway and return its connector.
    pub fn into_connector(self) -> C {
        self.connector
    }

    /// Release the gateway and close its connector.
    pub fn close(self) -> Result<()> {
        self.connector.close()
    }

    fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.meta).dialect(self.dialect)
    }

    fn decode(&self, rows: Vec<Vec<Value>>) -> Result<Vec<M>> {
        let columns = self.meta.shared_columns();
        rows.into_iter()
            .map(|values| M::from_row(&Row::new(columns.clone(), values)))
            .collect()
    }

    /// All rows matching the filters, sorted and paginated.
    ///
    /// Rows are loaded eagerly. An unknown sort column fails before any
    /// statement is issued.
    pub fn find_many(&mut self, find: &Find) -> Result<Vec<M>> {
        let _span = self.span.clone().entered();
        let statement = self.query().select_many(
            &find.filters,
            find.sort.as_deref(),
            find.offset,
            find.count,
        )?;
        let rows = self.connector.fetch(&statement.sql, &statement.params)?;
        tracing::debug!(rows = rows.len(), "Found rows");
        self.decode(rows)
    }

    /// First row matching the filters.
    pub fn find_one(&mut self, filters: &[Filter]) -> Result<Option<M>> {
        let find = Find::from(filters.to_vec()).count(1);
        Ok(self.find_many(&find)?.into_iter().next())
    }

    /// Number of rows matching the filters.
    pub fn count(&mut self, filters: &[Filter]) -> Result<u64> {
        let _span = self.span.clone().entered();
        let statement = self.query().count(filters)?;
        let rows = self.connector.fetch(&statement.sql, &statement.params)?;

        let Some(value) = rows.first().and_then(|row| row.first()) else {
            return Ok(0);
        };
        value
            .as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| {
                Error::Query(QueryError::new(
                    QueryErrorKind::Fetch,
                    format!("COUNT returned {}", value.type_name()),
                    statement.sql,
                ))
            })
    }

    /// Validate an instance and write the defaults validation filled in back
    /// into it, so the instance matches what is stored.
    fn validate(
        instance: &mut M,
        operation: &'static str,
    ) -> Result<Validated> {
        let mut values = instance.to_row();
        if let Err(errors) = validate_row(M::description(), &mut values) {
            tracing::warn!(%errors, operation, "Rejected write");
            return Ok(Err(errors));
        }
        *instance = M::from_row(&Row::from_pairs(values.iter().cloned()))?;
        Ok(Ok(values))
    }

    /// Insert a new instance.
    ///
    /// Both timestamps are stamped with the current time before validation.
    /// Defaults filled in by validation are written back to the instance, and
    /// on success so is the identifier assigned by storage.
    pub fn add(&mut self, instance: &mut M) -> Result<Write> {
        let _span = self.span.clone().entered();
        let stamp = now();
        let meta = instance.meta_mut();
        meta.date_created = stamp;
        meta.date_last_edit = stamp;

        let values = match Self::validate(instance, "add")? {
            Ok(values) => values,
            Err(errors) => return Ok(Write::Rejected(errors)),
        };

        let statement = self.query().insert(&values);
        let rows = self.connector.fetch(&statement.sql, &statement.params)?;
        if let Some(id) = rows.first().and_then(|row| row.first()).and_then(Value::as_i64) {
            instance.meta_mut().id = Some(id);
            tracing::debug!(id, "Added");
        }
        Ok(Write::Applied)
    }

    /// Insert or overwrite an instance keyed on its identifier.
    ///
    /// The last-edit timestamp is stamped first. An instance without an
    /// identifier is rejected.
    pub fn replace(&mut self, instance: &mut M) -> Result<Write> {
        let _span = self.span.clone().entered();
        instance.meta_mut().date_last_edit = now();

        if instance.meta().id.is_none() {
            let mut errors = ValidationError::new();
            errors.add_required(tablemodel_core::ID_COLUMN);
            tracing::warn!(%errors, "Rejected replace");
            return Ok(Write::Rejected(errors));
        }

        let values = match Self::validate(instance, "replace")? {
            Ok(values) => values,
            Err(errors) => return Ok(Write::Rejected(errors)),
        };

        let statement = self.query().upsert(&values);
        self.connector.execute(&statement.sql, &statement.params)?;
        Ok(Write::Applied)
    }

    /// Delete an instance by identifier, returning the number of rows removed.
    ///
    /// An instance without an identifier matches nothing.
    pub fn delete(&mut self, instance: &M) -> Result<u64> {
        let _span = self.span.clone().entered();
        let id = instance.meta().id;
        if id.is_none() {
            tracing::warn!("Deleting an instance without identifier; nothing will match");
        }

        let statement = self.query().delete_by_id(Value::from(id));
        let affected = self.connector.execute(&statement.sql, &statement.params)?;
        tracing::debug!(affected, "Deleted");
        Ok(affected)
    }

    /// One page of results; pages are numbered from 1.
    ///
    /// `find` supplies filters and sort; its offset and count are replaced.
    pub fn page(&mut self, number: u64, size: u64, find: &Find) -> Result<Vec<M>> {
        if number == 0 {
            return Err(Error::InvalidPage {
                message: "page number should be 1 or higher".to_string(),
            });
        }
        check_page_size(size)?;

        let offset = (number - 1).checked_mul(size).ok_or_else(|| Error::InvalidPage {
            message: format!("page {number} of size {size} is out of range"),
        })?;
        let find = Find {
            offset: Some(offset),
            count: Some(size),
            ..find.clone()
        };
        self.find_many(&find)
    }

    /// Number of pages of `size` rows needed for all matching rows.
    pub fn page_count(&mut self, size: u64, filters: &[Filter]) -> Result<u64> {
        check_page_size(size)?;
        Ok(self.count(filters)?.div_ceil(size))
    }
}

fn check_page_size(size: u64) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidPage {
            message: "page size should be 1 or higher".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_outcomes() {
        assert!(Write::Applied.is_applied());
        assert!(Write::Applied.rejection().is_none());
        assert!(Write::Applied.into_result().is_ok());

        let mut errors = ValidationError::new();
        errors.add_required("name");
        let rejected = Write::Rejected(errors.clone());
        assert!(!rejected.is_applied());
        assert_eq!(rejected.rejection(), Some(&errors));
        assert!(matches!(rejected.into_result(), Err(Error::Validation(e)) if e == errors));
    }

    #[test]
    fn page_size_must_be_positive() {
        assert!(check_page_size(1).is_ok());
        assert!(matches!(check_page_size(0), Err(Error::InvalidPage { .. })));
    }
}
