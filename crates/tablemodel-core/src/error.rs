//! Error types for TableModel.
//!
//! Construction-time failures (connect, initial schema creation) and statement
//! failures propagate as [`Error`]. Validation failures on write paths are
//! reported through [`ValidationError`] without aborting the caller.

use std::fmt;

/// Boxed cause chained onto connection and statement errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The primary error type for all TableModel operations.
#[derive(Debug)]
pub enum Error {
    /// Establishing or keeping the storage connection failed
    Connection(ConnectionError),
    /// Executing or fetching a statement failed
    Query(QueryError),
    /// A model instance failed its field rules
    Validation(ValidationError),
    /// A sort directive named a column the table does not have
    InvalidSort { column: String },
    /// A page number or page size outside the accepted range
    InvalidPage { message: String },
    /// A filter predicate is malformed or names an unknown column
    InvalidFilter { field: String, message: String },
    /// A model description cannot be turned into a table definition
    Schema { message: String },
    /// A stored value cannot be decoded into the model's field type
    Conversion {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Anything else
    Custom(String),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<BoxError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Authentication failed
    Authentication,
    /// Connection was closed or dropped
    Disconnected,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
    /// The statement that failed, whitespace-normalized
    pub sql: Option<String>,
    /// SQLSTATE reported by the server, when available
    pub sqlstate: Option<String>,
    pub source: Option<BoxError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax or semantic error reported for the statement
    Statement,
    /// Constraint violation (unique, not null, foreign key)
    Constraint,
    /// Result rows could not be read
    Fetch,
    /// Anything the driver could not classify
    Database,
}

impl QueryError {
    /// Create a statement error for the given SQL.
    pub fn new(kind: QueryErrorKind, message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sql: Some(sql.into()),
            sqlstate: None,
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the SQLSTATE code.
    pub fn with_sqlstate(mut self, code: impl Into<String>) -> Self {
        self.sqlstate = Some(code.into());
        self
    }
}

/// Aggregated field rule failures for one model instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationError {
    pub errors: Vec<FieldValidationError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Required,
    Type,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors recorded for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    fn push(&mut self, field: &str, kind: ValidationErrorKind, message: String) {
        self.errors.push(FieldValidationError {
            field: field.to_string(),
            kind,
            message,
        });
    }

    pub fn add_required(&mut self, field: &str) {
        self.push(
            field,
            ValidationErrorKind::Required,
            format!("{field} is required"),
        );
    }

    pub fn add_type(&mut self, field: &str, expected: &str, found: &str) {
        self.push(
            field,
            ValidationErrorKind::Type,
            format!("{field} must be {expected}, got {found}"),
        );
    }

    pub fn add_min(&mut self, field: &str, min: f64, actual: f64) {
        self.push(
            field,
            ValidationErrorKind::Min,
            format!("{field} must be at least {min}, got {actual}"),
        );
    }

    pub fn add_max(&mut self, field: &str, max: f64, actual: f64) {
        self.push(
            field,
            ValidationErrorKind::Max,
            format!("{field} must be at most {max}, got {actual}"),
        );
    }

    pub fn add_min_length(&mut self, field: &str, min: usize, actual: usize) {
        self.push(
            field,
            ValidationErrorKind::MinLength,
            format!("{field} must have at least {min} characters, got {actual}"),
        );
    }

    pub fn add_max_length(&mut self, field: &str, max: usize, actual: usize) {
        self.push(
            field,
            ValidationErrorKind::MaxLength,
            format!("{field} must have at most {max} characters, got {actual}"),
        );
    }

    pub fn add_pattern(&mut self, field: &str, pattern: &str) {
        self.push(
            field,
            ValidationErrorKind::Pattern,
            format!("{field} does not match pattern {pattern}"),
        );
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "connection error: {}", e.message),
            Error::Query(e) => {
                write!(f, "statement error: {}", e.message)?;
                if let Some(sql) = &e.sql {
                    write!(f, " (sql: {sql})")?;
                }
                Ok(())
            }
            Error::Validation(e) => write!(f, "validation error: {e}"),
            Error::InvalidSort { column } => write!(f, "invalid sort column: {column}"),
            Error::InvalidPage { message } => write!(f, "invalid page: {message}"),
            Error::InvalidFilter { field, message } => {
                write!(f, "invalid filter on {field}: {message}")
            }
            Error::Schema { message } => write!(f, "schema error: {message}"),
            Error::Conversion {
                column,
                expected,
                found,
            } => write!(
                f,
                "cannot decode column {column}: expected {expected}, found {found}"
            ),
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
