//! SQL Dialect definitions and formatting rules.
//!
//! A dialect decides two things for the compiler:
//!
//! - Identifier quoting: `` ` `` (MySQL), `"` (PostgreSQL/SQLite)
//! - Operator spelling: `<>` vs `!=`, and so on
//!
//! The compilation algorithm never changes between dialects; only the text
//! a token serializes to does.
//!
//! # Usage
//!
//! ```ignore
//! use ormql::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::MySql;
//! let quoted = dialect.quote_identifier("user");  // `user`
//! ```

mod custom;
pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;

pub use custom::CustomDialect;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use super::expr::Operator;

/// SQL dialect trait - defines how identifiers and operators are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &str;

    /// Character used to quote identifiers.
    fn quote_char(&self) -> char;

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_with(self.quote_char(), ident)
    }

    /// Text written for an operator.
    fn operator_text(&self, op: Operator) -> &str {
        helpers::operator_text_ansi(op)
    }
}

/// Built-in SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::Sqlite => &Sqlite,
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &str {
        self.dialect().name()
    }

    fn quote_char(&self) -> char {
        self.dialect().quote_char()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn operator_text(&self, op: Operator) -> &str {
        self.dialect().operator_text(op)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}
