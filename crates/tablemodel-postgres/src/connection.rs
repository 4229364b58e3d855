//! Blocking PostgreSQL connector.

use postgres::error::SqlState;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tablemodel_core::{
    ConnectionError, ConnectionErrorKind, Connector, Error, QueryError, QueryErrorKind, RawRow,
    Result, Value,
};

use crate::config::PgConfig;
use crate::value::{bind, decode_row};

/// Collapse every run of whitespace into a single space.
///
/// Statements are logged and reported in this form.
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One autocommitted PostgreSQL session.
pub struct PgConnector {
    client: Client,
    config: PgConfig,
}

impl std::fmt::Debug for PgConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnector")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("database", &self.config.database)
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl PgConnector {
    /// Open a connection.
    pub fn connect(config: PgConfig) -> Result<Self> {
        tracing::debug!(
            addr = %config.socket_addr(),
            database = %config.database,
            user = %config.user,
            "Connecting to PostgreSQL"
        );

        let client = config
            .to_driver()
            .connect(NoTls)
            .map_err(|e| connect_error(&config, e))?;

        tracing::info!(addr = %config.socket_addr(), database = %config.database, "Connected");
        Ok(Self { client, config })
    }

    /// Parse a `postgres://` URL and connect.
    pub fn connect_url(url: &str) -> Result<Self> {
        Self::connect(PgConfig::from_url(url)?)
    }

    pub fn config(&self) -> &PgConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

fn connect_error(config: &PgConfig, e: postgres::Error) -> Error {
    let kind = match e.code() {
        Some(code)
            if *code == SqlState::INVALID_PASSWORD
                || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION =>
        {
            ConnectionErrorKind::Authentication
        }
        _ => ConnectionErrorKind::Connect,
    };
    tracing::error!(addr = %config.socket_addr(), error = %e, "Connection failed");
    Error::Connection(ConnectionError {
        kind,
        message: format!("failed to connect to {}: {e}", config.socket_addr()),
        source: Some(Box::new(e)),
    })
}

/// Wrap a driver failure with the statement that caused it.
fn statement_error(sql: &str, e: postgres::Error) -> Error {
    if e.is_closed() {
        return Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Disconnected,
            message: format!("connection closed while running: {sql}"),
            source: Some(Box::new(e)),
        });
    }

    let (kind, message, code) = match e.as_db_error() {
        Some(db) => {
            let code = db.code().code().to_string();
            let kind = match code.get(..2) {
                Some("23") => QueryErrorKind::Constraint,
                Some("42") => QueryErrorKind::Statement,
                _ => QueryErrorKind::Database,
            };
            (kind, db.message().to_string(), Some(code))
        }
        None => (QueryErrorKind::Database, e.to_string(), None),
    };

    tracing::error!(sql = %sql, error = %message, "Statement failed");
    let mut err = QueryError::new(kind, message, sql).with_source(e);
    if let Some(code) = code {
        err = err.with_sqlstate(code);
    }
    Error::Query(err)
}

impl Connector for PgConnector {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let sql = normalize_sql(sql);
        tracing::info!(sql = %sql, params = params.len(), "Executing");

        let bound = bind(params);
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let affected = self
            .client
            .execute(sql.as_str(), &refs)
            .map_err(|e| statement_error(&sql, e))?;

        tracing::debug!(affected, "Executed");
        Ok(affected)
    }

    fn fetch(&mut self, sql: &str, params: &[Value]) -> Result<Vec<RawRow>> {
        let sql = normalize_sql(sql);
        tracing::info!(sql = %sql, params = params.len(), "Fetching");

        let bound = bind(params);
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = self
            .client
            .query(sql.as_str(), &refs)
            .map_err(|e| statement_error(&sql, e))?;

        tracing::debug!(rows = rows.len(), "Fetched");
        rows.iter().map(|row| decode_row(row, &sql)).collect()
    }

    fn close(self) -> Result<()> {
        let addr = self.config.socket_addr();
        tracing::debug!(addr = %addr, "Closing connection");
        self.client.close().map_err(|e| {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Disconnected,
                message: format!("failed to close connection to {addr}: {e}"),
                source: Some(Box::new(e)),
            })
        })
    }
}
