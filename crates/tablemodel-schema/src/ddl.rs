//! DDL text for one table.

use tablemodel_core::{Dialect, FieldSpec};

/// Column definition: `<name> <type> <constraints...>`.
///
/// Storage hints, when present, replace the derived definition outright: the
/// override type replaces the mapped type and the hint constraints replace the
/// implicit `NULL` / `NOT NULL`.
pub fn column_definition(field: &FieldSpec, dialect: Dialect) -> String {
    let mapped = dialect.column_type(field.field_type);

    let (column_type, constraints): (&str, Vec<&str>) = match &field.hints {
        Some(hints) => (
            hints.data_type.map_or(mapped, |t| dialect.storage_type(t)),
            hints.constraints.clone(),
        ),
        None if field.nullable => (mapped, vec!["NULL"]),
        None => (mapped, vec!["NOT NULL"]),
    };

    let mut def = format!("{} {}", field.name, column_type);
    for constraint in constraints {
        def.push(' ');
        def.push_str(constraint);
    }
    def
}

/// `CREATE TABLE IF NOT EXISTS` for the given fields, in order.
pub fn create_table(table: &str, fields: &[FieldSpec], dialect: Dialect) -> String {
    let columns: Vec<String> = fields
        .iter()
        .map(|f| column_definition(f, dialect))
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, columns.join(", "))
}

/// Name of the secondary index on `column`.
pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{table}_{column}")
}

/// `CREATE INDEX IF NOT EXISTS` for every indexed field.
pub fn create_indexes(table: &str, fields: &[FieldSpec]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| f.indexed)
        .map(|f| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                index_name(table, f.name),
                table,
                f.name
            )
        })
        .collect()
}
