//! SQL dialect differences the builders care about.

use crate::types::FieldType;

/// Target SQL dialect.
///
/// Statements are written for PostgreSQL. For SQLite the placeholders, the
/// binary column type and the auto-increment `SERIAL` type are translated;
/// `RETURNING` and `ON CONFLICT .. DO UPDATE` need SQLite 3.35 or later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => format!("?{index}"),
        }
    }

    /// Column type for a semantic field type.
    pub const fn column_type(self, field_type: FieldType) -> &'static str {
        match (self, field_type) {
            (Dialect::Sqlite, FieldType::Binary) => "BLOB",
            (_, other) => other.sql_name(),
        }
    }

    /// Translate an explicit storage type override.
    ///
    /// SQLite only auto-assigns ids to an `INTEGER PRIMARY KEY` column.
    pub fn storage_type(self, data_type: &'static str) -> &'static str {
        match self {
            Dialect::Sqlite if data_type.eq_ignore_ascii_case("SERIAL") => "INTEGER",
            Dialect::Sqlite if data_type.eq_ignore_ascii_case("BYTEA") => "BLOB",
            _ => data_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Sqlite.placeholder(3), "?3");
    }

    #[test]
    fn binary_column_type() {
        assert_eq!(Dialect::Postgres.column_type(FieldType::Binary), "BYTEA");
        assert_eq!(Dialect::Sqlite.column_type(FieldType::Binary), "BLOB");
        assert_eq!(Dialect::Sqlite.column_type(FieldType::Integer), "INTEGER");
    }

    #[test]
    fn serial_overrides() {
        assert_eq!(Dialect::Postgres.storage_type("SERIAL"), "SERIAL");
        assert_eq!(Dialect::Sqlite.storage_type("SERIAL"), "INTEGER");
        assert_eq!(Dialect::Sqlite.storage_type("bytea"), "BLOB");
        assert_eq!(Dialect::Sqlite.storage_type("TIMESTAMP"), "TIMESTAMP");
    }
}
