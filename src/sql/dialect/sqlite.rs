//! SQLite SQL dialect.

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::Operator;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn operator_text(&self, op: Operator) -> &str {
        helpers::operator_text_sqlite(op)
    }
}
