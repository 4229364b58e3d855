//! Live-server tests; skipped unless `TABLEMODEL_TEST_POSTGRES_URL` is set.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tablemodel_core::error::QueryErrorKind;
use tablemodel_core::{Connector, Error, FieldSpec, ModelDescription, ObjectMeta, Value};
use tablemodel_postgres::{PgConfig, PgConnector};
use tablemodel_query::{Filter, QueryBuilder};
use tablemodel_schema::SchemaBuilder;

const POSTGRES_URL_ENV: &str = "TABLEMODEL_TEST_POSTGRES_URL";

fn postgres_test_config() -> Option<PgConfig> {
    let raw = std::env::var(POSTGRES_URL_ENV).ok()?;
    match PgConfig::from_url(&raw) {
        Ok(cfg) => Some(cfg.connect_timeout(Duration::from_secs(10))),
        Err(e) => {
            eprintln!("skipping Postgres integration tests: {POSTGRES_URL_ENV} is invalid: {e}");
            None
        }
    }
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos()
}

fn test_table_name(prefix: &str) -> String {
    format!("{prefix}_{}", unique_suffix())
}

#[test]
fn postgres_connect_select_1() {
    let Some(cfg) = postgres_test_config() else {
        eprintln!("skipping Postgres integration tests: set {POSTGRES_URL_ENV}");
        return;
    };

    let mut conn = PgConnector::connect(cfg).expect("connect");
    let rows = conn.fetch("SELECT 1::INT4, 'one'::TEXT", &[]).expect("select");
    assert_eq!(rows, vec![vec![Value::BigInt(1), Value::Text("one".into())]]);
    conn.close().expect("close");
}

#[test]
fn postgres_synthesized_table_roundtrip() {
    let Some(cfg) = postgres_test_config() else {
        eprintln!("skipping Postgres integration tests: set {POSTGRES_URL_ENV}");
        return;
    };

    let mut conn = PgConnector::connect(cfg).expect("connect");
    let desc = ModelDescription::builder("Hero")
        .extend(ObjectMeta::fields())
        .field(FieldSpec::text("name"))
        .field(FieldSpec::integer("age").nullable(true))
        .build();
    let table = test_table_name("tablemodel_pg_heroes");
    let meta = SchemaBuilder::new()
        .synthesize(&desc, Some(&table))
        .expect("synthesize");

    for stmt in meta.schema_statements() {
        conn.execute(stmt, &[]).expect("create");
    }
    // idempotent
    for stmt in meta.schema_statements() {
        conn.execute(stmt, &[]).expect("re-create");
    }

    let qb = QueryBuilder::new(&meta);
    let meta_values = ObjectMeta::new();
    let mut values = meta_values.to_row();
    values.push(("name", Value::from("Ann")));
    values.push(("age", Value::from(30)));
    let insert = qb.insert(&values);
    let rows = conn.fetch(&insert.sql, &insert.params).expect("insert");
    let id = rows[0][0].as_i64().expect("returned id");
    assert!(id > 0);

    let select = qb
        .select_many(&[Filter::like("name", "A*")], Some("-id"), None, None)
        .expect("select");
    let rows = conn.fetch(&select.sql, &select.params).expect("fetch");
    assert_eq!(rows.len(), 1);
    let row = tablemodel_core::Row::new(meta.shared_columns(), rows[0].clone());
    assert_eq!(row.get_named::<i64>("id").unwrap(), id);
    assert_eq!(row.get_named::<String>("name").unwrap(), "Ann");
    assert_eq!(row.get_named::<i32>("age").unwrap(), 30);
    assert_eq!(
        row.get_named::<chrono::NaiveDateTime>("date_created").unwrap(),
        meta_values.date_created
    );

    let delete = qb.delete_by_id(Value::BigInt(id));
    assert_eq!(conn.execute(&delete.sql, &delete.params).expect("delete"), 1);

    conn.execute(&format!("DROP TABLE IF EXISTS {table}"), &[])
        .expect("drop");
}

#[test]
fn postgres_errors_carry_sql_and_sqlstate() {
    let Some(cfg) = postgres_test_config() else {
        eprintln!("skipping Postgres integration tests: set {POSTGRES_URL_ENV}");
        return;
    };

    let mut conn = PgConnector::connect(cfg).expect("connect");
    let err = conn
        .fetch("SELECT *\n  FROM  tablemodel_missing_table", &[])
        .unwrap_err();
    match err {
        Error::Query(q) => {
            assert_eq!(q.kind, QueryErrorKind::Statement);
            assert_eq!(q.sql.as_deref(), Some("SELECT * FROM tablemodel_missing_table"));
            assert_eq!(q.sqlstate.as_deref(), Some("42P01"));
            assert!(q.source.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn postgres_missing_database_fails_to_connect() {
    let Some(cfg) = postgres_test_config() else {
        eprintln!("skipping Postgres integration tests: set {POSTGRES_URL_ENV}");
        return;
    };

    let cfg = cfg.database(format!("tablemodel_missing_db_{}", unique_suffix()));
    assert!(matches!(
        PgConnector::connect(cfg),
        Err(Error::Connection(_))
    ));
}
