//! Configurable dialect.
//!
//! Starts from one of the built-in dialects and overrides the quote
//! character and/or individual operator spellings. Built from the
//! `[dialect]` table of the configuration file.

use std::collections::HashMap;

use super::{helpers, Dialect, SqlDialect};
use crate::sql::expr::Operator;

/// A dialect assembled at runtime.
#[derive(Debug, Clone)]
pub struct CustomDialect {
    name: String,
    base: Dialect,
    quote: Option<char>,
    operators: HashMap<Operator, String>,
}

impl CustomDialect {
    pub fn new(name: impl Into<String>, base: Dialect) -> Self {
        Self {
            name: name.into(),
            base,
            quote: None,
            operators: HashMap::new(),
        }
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_operator(mut self, op: Operator, text: impl Into<String>) -> Self {
        self.operators.insert(op, text.into());
        self
    }
}

impl SqlDialect for CustomDialect {
    fn name(&self) -> &str {
        &self.name
    }

    fn quote_char(&self) -> char {
        self.quote.unwrap_or_else(|| self.base.quote_char())
    }

    fn quote_identifier(&self, ident: &str) -> String {
        match self.quote {
            Some(q) => helpers::quote_with(q, ident),
            None => self.base.quote_identifier(ident),
        }
    }

    fn operator_text(&self, op: Operator) -> &str {
        match self.operators.get(&op) {
            Some(text) => text.as_str(),
            None => self.base.operator_text(op),
        }
    }
}
