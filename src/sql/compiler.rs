//! Recursive expression compiler.
//!
//! Walks an [`Expr`] tree and emits tokens. Column references are resolved
//! to physical names here, against the statement's primary entity or the
//! table a column is bound to.

use std::sync::Arc;

use super::error::{BuildError, BuildResult};
use super::expr::{Aggregate, BinaryExpr, Column, Expr, ExprExt, RawExpr};
use super::table::{Subquery, TableReference};
use super::token::{Token, TokenStream};
use crate::metadata::{EntityMetadata, MetadataResolver};

/// Node kinds sharing the binary shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryKind {
    Predicate,
    Math,
}

pub(crate) struct Compiler<'a> {
    resolver: &'a dyn MetadataResolver,
    primary: Arc<EntityMetadata>,
    tokens: TokenStream,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(resolver: &'a dyn MetadataResolver, primary: Arc<EntityMetadata>) -> Self {
        Self {
            resolver,
            primary,
            tokens: TokenStream::new(),
        }
    }

    pub(crate) fn primary(&self) -> &EntityMetadata {
        &self.primary
    }

    pub(crate) fn tokens(&mut self) -> &mut TokenStream {
        &mut self.tokens
    }

    pub(crate) fn finish(self) -> TokenStream {
        self.tokens
    }

    /// Fold `preds` left to right with AND and compile the result.
    pub(crate) fn compile_predicates(&mut self, preds: &[Expr]) -> BuildResult<()> {
        let folded = preds.iter().cloned().reduce(|acc, p| acc.and(p));
        match folded {
            Some(expr) => self.compile_expr(&expr),
            None => Ok(()),
        }
    }

    pub(crate) fn compile_expr(&mut self, expr: &Expr) -> BuildResult<()> {
        match expr {
            Expr::Column(c) => self.compile_column(c, false),
            Expr::Value(v) => {
                self.tokens.param(v.clone());
                Ok(())
            }
            Expr::Raw(r) => {
                self.tokens.lparen();
                self.compile_raw(r);
                self.tokens.rparen();
                Ok(())
            }
            Expr::Predicate(b) => self.compile_binary(b, BinaryKind::Predicate),
            Expr::Math(b) => self.compile_binary(b, BinaryKind::Math),
            Expr::Aggregate(a) => self.compile_aggregate(a, false),
            Expr::Subquery(s) => self.compile_subquery(s),
            Expr::SubqueryExpr(s) => {
                self.tokens.push(Token::Raw(s.keyword.clone()));
                self.compile_subquery(&s.subquery)
            }
        }
    }

    /// Operand of a binary node: compound operands are parenthesized, leaves never.
    fn compile_operand(&mut self, expr: &Expr) -> BuildResult<()> {
        match expr {
            Expr::Predicate(_) | Expr::Math(_) => {
                self.tokens.lparen();
                self.compile_expr(expr)?;
                self.tokens.rparen();
                Ok(())
            }
            _ => self.compile_expr(expr),
        }
    }

    fn compile_binary(&mut self, node: &BinaryExpr, kind: BinaryKind) -> BuildResult<()> {
        let op = node.op;
        if op.is_arithmetic() != (kind == BinaryKind::Math) {
            return Err(BuildError::UnsupportedExpressionType(format!(
                "operator '{}' in {:?} node",
                op.key(),
                kind
            )));
        }

        match (&node.right, op.is_unary()) {
            (Some(right), false) => {
                self.compile_operand(&node.left)?;
                self.tokens.space().push(Token::Op(op)).space();
                self.compile_operand(right)
            }
            (None, true) if op.is_prefix() => {
                self.tokens.push(Token::Op(op)).space();
                self.compile_operand(&node.left)
            }
            (None, true) => {
                self.compile_operand(&node.left)?;
                self.tokens.space().push(Token::Op(op));
                Ok(())
            }
            (None, false) => Err(BuildError::UnsupportedExpressionType(format!(
                "operator '{}' without right operand",
                op.key()
            ))),
            (Some(_), true) => Err(BuildError::UnsupportedExpressionType(format!(
                "unary operator '{}' with right operand",
                op.key()
            ))),
        }
    }

    /// `[qualifier.]column[ AS alias]`
    pub(crate) fn compile_column(&mut self, column: &Column, use_alias: bool) -> BuildResult<()> {
        self.compile_field(column.table.as_ref(), &column.name)?;
        if use_alias {
            self.compile_as(column.alias.as_deref());
        }
        Ok(())
    }

    /// `FUNC(column)[ AS alias]`
    pub(crate) fn compile_aggregate(&mut self, agg: &Aggregate, use_alias: bool) -> BuildResult<()> {
        self.tokens
            .push(Token::FunctionName(agg.function.clone()))
            .lparen();
        self.compile_field(agg.table.as_ref(), &agg.field)?;
        self.tokens.rparen();
        if use_alias {
            self.compile_as(agg.alias.as_deref());
        }
        Ok(())
    }

    /// Raw text and its arguments, unparenthesized.
    pub(crate) fn compile_raw(&mut self, raw: &RawExpr) {
        self.tokens.push(Token::Fragment(raw.clone().into()));
    }

    /// `(inner sql)`, built on first use and reused afterwards.
    pub(crate) fn compile_subquery(&mut self, sub: &Subquery) -> BuildResult<()> {
        let compiled = sub.compiled()?;
        self.tokens
            .lparen()
            .push(Token::Fragment(compiled.clone()))
            .rparen();
        Ok(())
    }

    pub(crate) fn compile_as(&mut self, alias: Option<&str>) {
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            self.tokens.space().push(Token::As).space().ident(alias);
        }
    }

    fn compile_field(&mut self, table: Option<&TableReference>, field: &str) -> BuildResult<()> {
        let column = self.column_name(table, field)?;
        if let Some(qualifier) = table.and_then(|t| t.qualifier()) {
            self.tokens.ident(qualifier).push(Token::Dot);
        }
        self.tokens.ident(&column);
        Ok(())
    }

    fn column_name(&self, table: Option<&TableReference>, field: &str) -> BuildResult<String> {
        match table {
            None => Ok(self.primary.require_column(field)?.to_string()),
            Some(TableReference::Table(t)) => {
                let meta = self.resolver.resolve(&t.entity)?;
                Ok(meta.require_column(field)?.to_string())
            }
            Some(TableReference::Subquery(s)) => {
                let columns = s.columns();
                if !columns.is_empty() && !columns.iter().any(|c| c == field) {
                    return Err(BuildError::UnknownField(field.into()));
                }
                let meta = s.metadata()?;
                Ok(meta.require_column(field)?.to_string())
            }
        }
    }
}
