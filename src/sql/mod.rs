//! SQL generation module.
//!
//! This module provides the typed statement builder and its compiler:
//!
//! - [`expr`] - Expression AST and builder DSL
//! - [`table`] - FROM sources and nested statements
//! - [`query`] - SELECT statement builder
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - Identifier quoting and operator spelling

mod compiler;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod query;
pub mod table;
pub mod token;
pub mod value;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{CustomDialect, Dialect, SqlDialect};
pub use error::{BuildError, BuildResult};
pub use expr::{
    avg, col, count, max, min, not, raw, sum, value, Aggregate, BinaryExpr, Column, Expr, ExprExt,
    Operator, RawExpr,
};
pub use query::{OrderBy, Query, Selectable, Selector, SortDir};
pub use table::{all, any, exists, not_exists, some, Subquery, SubqueryExpr, Table, TableReference};
pub use token::{Token, TokenStream};
pub use value::Value;
