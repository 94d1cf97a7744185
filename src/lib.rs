//! # ormql
//!
//! A typed SQL expression compiler. Statements are described as trees of
//! columns, literals, predicates, arithmetic, aggregates and subqueries over
//! application entities, then compiled into SQL text plus the positional
//! arguments bound to its `?` placeholders.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────┐     ┌─────────────────────────────┐
//! │  Selector (fluent builder) │     │  QueryDocument (JSON)       │
//! └────────────────────────────┘     └─────────────────────────────┘
//!               │                                  │ [lowering]
//!               ▼                                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │           Compiler  ◄── MetadataResolver (Registry)           │
//! └───────────────────────────────────────────────────────────────┘
//!               │ tokens
//!               ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │        TokenStream::render(dialect) -> Query { sql, args }    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use ormql::prelude::*;
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn metadata() -> EntityMetadata {
//!         EntityMetadata::new("user").fields(&["Id", "FirstName", "Age"])
//!     }
//! }
//!
//! let q = Db::default()
//!     .select::<User>()
//!     .filter(col("Age").gt(18))
//!     .build()?;
//! assert_eq!(q.sql, "SELECT * FROM `user` WHERE `age` > ?;");
//! ```

pub mod config;
pub mod db;
pub mod document;
pub mod metadata;
pub mod sql;

// Re-export SQL submodules at crate level for convenience
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::db::Db;
    pub use crate::dialect::{CustomDialect, Dialect, SqlDialect};
    pub use crate::expr::{
        // Constructors
        avg,
        col,
        count,
        max,
        min,
        not,
        raw,
        sum,
        value,
        // Types
        Aggregate,
        Column,
        Expr,
        ExprExt,
        Operator,
        RawExpr,
    };
    pub use crate::metadata::{Entity, EntityKey, EntityMetadata, MetadataResolver, Registry};
    pub use crate::query::{OrderBy, Query, Selectable, Selector, SortDir};
    pub use crate::sql::error::{BuildError, BuildResult};
    pub use crate::sql::table::{
        all, any, exists, not_exists, some, Subquery, SubqueryExpr, Table, TableReference,
    };
    pub use crate::sql::value::Value;
}

// Also export at crate root for convenience
pub use db::Db;
pub use query::Query;
pub use sql::error::BuildError;
