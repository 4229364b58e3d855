//! Bridging between [`Value`] and PostgreSQL wire types.
//!
//! Parameters adapt to the type the server inferred for each placeholder, so
//! a `BigInt` bound to an `INTEGER` column is sent as a 4-byte integer.
//! Result columns are decoded by their declared type.

use std::error::Error as StdError;

use bytes::BytesMut;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tablemodel_core::{Error, QueryError, QueryErrorKind, RawRow, Result, Value};

type BoxError = Box<dyn StdError + Sync + Send>;

/// A borrowed [`Value`] bound as a statement parameter.
#[derive(Debug)]
pub struct PgParam<'a>(pub &'a Value);

impl ToSql for PgParam<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::BigInt(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Double(d) => match *ty {
                Type::FLOAT4 => (*d as f32).to_sql(ty, out),
                _ => d.to_sql(ty, out),
            },
            Value::Text(s) => s.as_str().to_sql(ty, out),
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMPTZ => ts
                    .and_local_timezone(Local)
                    .single()
                    .ok_or_else(|| BoxError::from(format!("ambiguous local time {ts}")))?
                    .to_sql(ty, out),
                _ => ts.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Wrap parameters for the driver.
pub fn bind(params: &[Value]) -> Vec<PgParam<'_>> {
    params.iter().map(PgParam).collect()
}

fn fetch_error(sql: &str, column: &str, source: impl Into<tablemodel_core::error::BoxError>) -> Error {
    Error::Query(
        QueryError::new(
            QueryErrorKind::Fetch,
            format!("cannot read column {column}"),
            sql,
        )
        .with_source(source),
    )
}

/// Decode one column of a result row by its declared type.
///
/// Text-like and unrecognized types are read as text.
pub fn decode_column(row: &postgres::Row, idx: usize, sql: &str) -> Result<Value> {
    let column = &row.columns()[idx];

    macro_rules! get {
        ($t:ty, $map:expr) => {
            row.try_get::<_, Option<$t>>(idx)
                .map(|v| v.map($map).unwrap_or(Value::Null))
                .map_err(|e| fetch_error(sql, column.name(), e))
        };
    }

    match *column.type_() {
        Type::BOOL => get!(bool, Value::Bool),
        Type::INT2 => get!(i16, |v| Value::BigInt(i64::from(v))),
        Type::INT4 => get!(i32, |v| Value::BigInt(i64::from(v))),
        Type::INT8 => get!(i64, Value::BigInt),
        Type::OID => get!(u32, |v| Value::BigInt(i64::from(v))),
        Type::FLOAT4 => get!(f32, |v| Value::Double(f64::from(v))),
        Type::FLOAT8 => get!(f64, Value::Double),
        Type::BYTEA => get!(Vec<u8>, Value::Bytes),
        Type::TIMESTAMP => get!(NaiveDateTime, Value::Timestamp),
        Type::TIMESTAMPTZ => get!(DateTime<Local>, |v: DateTime<Local>| Value::Timestamp(
            v.naive_local()
        )),
        Type::DATE => get!(NaiveDate, |v: NaiveDate| Value::Timestamp(
            v.and_time(NaiveTime::MIN)
        )),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get!(String, Value::Text)
        }
        ref other => Err(fetch_error(
            sql,
            column.name(),
            format!("unsupported column type {other}"),
        )),
    }
}

/// Decode a full result row, columns in `SELECT` order.
pub fn decode_row(row: &postgres::Row, sql: &str) -> Result<RawRow> {
    (0..row.len())
        .map(|idx| decode_column(row, idx, sql))
        .collect()
}
