//! The storage connector contract.

use crate::error::Result;
use crate::value::Value;

/// Raw result row: scalars in `SELECT` column order.
pub type RawRow = Vec<Value>;

/// Executes parameterized statements against one connection.
///
/// Calls are blocking and autocommitted; at most one statement is in flight
/// per connector. Callers needing concurrency open one connector each.
pub trait Connector {
    /// Execute a statement, returning the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute a statement and collect all result rows.
    fn fetch(&mut self, sql: &str, params: &[Value]) -> Result<Vec<RawRow>>;

    /// Close the connection.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

impl<C: Connector + ?Sized> Connector for &mut C {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        (**self).execute(sql, params)
    }

    fn fetch(&mut self, sql: &str, params: &[Value]) -> Result<Vec<RawRow>> {
        (**self).fetch(sql, params)
    }

    /// The borrowed connection stays open; its owner closes it.
    fn close(self) -> Result<()> {
        Ok(())
    }
}
