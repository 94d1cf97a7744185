//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use crate::sql::expr::Operator;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote an identifier with an arbitrary quote character, doubling any
/// embedded occurrence of it.
pub fn quote_with(quote: char, ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push(quote);
    for c in ident.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    quote_with('`', ident)
}

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, SQLite
pub fn quote_double(ident: &str) -> String {
    quote_with('"', ident)
}

// =============================================================================
// Operators
// =============================================================================

/// ANSI spelling of every operator.
pub fn operator_text_ansi(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "=",
        Operator::Ne => "<>",
        Operator::Lt => "<",
        Operator::Lte => "<=",
        Operator::Gt => ">",
        Operator::Gte => ">=",
        Operator::Like => "LIKE",
        Operator::NotLike => "NOT LIKE",
        Operator::In => "IN",
        Operator::NotIn => "NOT IN",
        Operator::And => "AND",
        Operator::Or => "OR",
        Operator::Not => "NOT",
        Operator::IsNull => "IS NULL",
        Operator::IsNotNull => "IS NOT NULL",
        Operator::Add => "+",
        Operator::Sub => "-",
        Operator::Mul => "*",
        Operator::Div => "/",
        Operator::Mod => "%",
    }
}

/// SQLite spells inequality `!=`.
pub fn operator_text_sqlite(op: Operator) -> &'static str {
    match op {
        Operator::Ne => "!=",
        other => operator_text_ansi(other),
    }
}
