//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings. Placeholder tokens carry the value bound to
//! them, so rendering a stream yields the SQL text and its positional
//! arguments in one pass and the two can never drift apart.

use super::dialect::SqlDialect;
use super::expr::Operator;
use super::query::Query;
use super::value::Value;

/// SQL Token - every element the compiler emits.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    As,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    Limit,
    Offset,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,
    Semicolon,
    Space,

    // === Dynamic Content ===
    /// Identifier (table, column, alias), quoted by the dialect
    Ident(String),
    /// Operator, spelled by the dialect
    Op(Operator),
    /// Aggregate/function name, rendered as-is
    FunctionName(String),
    /// `?` placeholder plus the value bound to it
    Param(Value),
    /// Already-rendered SQL with its own arguments (cached subqueries)
    Fragment(Query),

    // === Escape Hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// **Never pass user input to this variant.** Values belong in
    /// [`Token::Param`].
    Raw(String),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    pub fn serialize(&self, dialect: &dyn SqlDialect) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::As => "AS".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Having => "HAVING".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),
            Token::Offset => "OFFSET".into(),

            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Semicolon => ";".into(),
            Token::Space => " ".into(),

            Token::Ident(name) => dialect.quote_identifier(name),
            Token::Op(op) => dialect.operator_text(*op).into(),
            Token::FunctionName(name) => name.clone(),
            Token::Param(_) => "?".into(),
            Token::Fragment(q) => q.sql.clone(),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be rendered to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Serialize all tokens to a SQL string, dropping bound values.
    pub fn serialize(&self, dialect: &dyn SqlDialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    /// Render to SQL text plus the positional arguments, in placeholder order.
    pub fn render(&self, dialect: &dyn SqlDialect) -> Query {
        let mut sql = String::new();
        let mut args = Vec::new();
        for token in &self.tokens {
            sql.push_str(&token.serialize(dialect));
            match token {
                Token::Param(v) => args.push(v.clone()),
                Token::Fragment(q) => args.extend(q.args.iter().cloned()),
                _ => {}
            }
        }
        Query { sql, args }
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
    pub fn ident(&mut self, name: &str) -> &mut Self {
        self.push(Token::Ident(name.into()))
    }
    pub fn param(&mut self, value: Value) -> &mut Self {
        self.push(Token::Param(value))
    }
}
