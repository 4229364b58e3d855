//! Core types and traits for TableModel.
//!
//! `tablemodel-core` is the **foundation layer** shared by every other crate.
//!
//! # Role In The Architecture
//!
//! - **Model layer**: `FieldSpec`, `ModelDescription` and the `Model` trait describe
//!   records declaratively; `resolve` flattens base and derived field layers.
//! - **Data model**: `Value`, `Row` and `TableMeta` are shared by the schema, query and
//!   driver crates.
//! - **Contract layer**: `Connector` is what the table gateway needs from storage.
//! - **Validation**: field rules are checked before writes reach storage.
//!
//! # Who Uses This Crate
//!
//! - `tablemodel-schema` turns a `ModelDescription` into a `TableMeta`.
//! - `tablemodel-query` builds statements against a `TableMeta`.
//! - `tablemodel-postgres` implements `Connector`.
//! - `tablemodel` drives all of the above through its `Table` gateway.

pub mod connector;
pub mod dialect;
pub mod error;
pub mod field;
pub mod identifiers;
pub mod model;
pub mod row;
pub mod table;
pub mod types;
pub mod validate;
pub mod value;

pub use connector::{Connector, RawRow};
pub use dialect::Dialect;
pub use error::{
    ConnectionError, ConnectionErrorKind, Error, FieldValidationError, QueryError,
    QueryErrorKind, Result, ValidationError, ValidationErrorKind,
};
pub use field::{DefaultValue, FieldRules, FieldSpec, StorageHints};
pub use identifiers::{is_valid_identifier, to_snake_case};
pub use model::{
    CREATED_COLUMN, ID_COLUMN, LAST_EDIT_COLUMN, Model, ModelDescription,
    ModelDescriptionBuilder, ObjectMeta, SLUG_COLUMN, fresh_slug, now, resolve,
};
pub use row::Row;
pub use table::TableMeta;
pub use types::FieldType;
pub use validate::{matches_pattern, validate_row, validate_value};
pub use value::{FromValue, Value};
