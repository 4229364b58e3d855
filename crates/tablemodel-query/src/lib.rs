//! Statement construction for tablemodel.
//!
//! `tablemodel-query` turns filters, sort directives and pagination into
//! parameterized SQL against a synthesized table. Nothing here touches a
//! connection; the output is always a [`Statement`] of SQL text plus bound
//! values.

pub mod builder;
pub mod filter;

pub use builder::{DESCENDING_MARKER, Direction, QueryBuilder, Statement, parse_sort};
pub use filter::{Filter, Predicate, WILDCARD, like_pattern};
