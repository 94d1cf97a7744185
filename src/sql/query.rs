//! Statement builder - construct SELECT statements with a fluent API.
//!
//! A [`Selector`] accumulates clause configuration and compiles it in one
//! pass with [`Selector::build`]. Clause order is fixed regardless of the
//! order the builder methods were called in:
//!
//! ```text
//! SELECT <cols> FROM <table> [WHERE ..] [GROUP BY ..] [HAVING ..]
//!     [ORDER BY ..] [LIMIT ?] [OFFSET ?];
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::compiler::Compiler;
use super::error::{BuildError, BuildResult};
use super::expr::{Aggregate, Column, Expr, RawExpr};
use super::table::{Subquery, TableReference};
use super::token::Token;
use super::value::Value;
use crate::db::Db;
use crate::metadata::{EntityKey, EntityMetadata, MetadataResolver};

// =============================================================================
// Output
// =============================================================================

/// Compiled statement: SQL text plus positional arguments, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Value>,
}

impl From<RawExpr> for Query {
    fn from(raw: RawExpr) -> Self {
        Self {
            sql: raw.sql,
            args: raw.args,
        }
    }
}

// =============================================================================
// Select list
// =============================================================================

/// An item of the SELECT list.
#[derive(Debug, Clone)]
pub enum Selectable {
    Column(Column),
    Aggregate(Aggregate),
    /// Written verbatim, without parentheses
    Raw(RawExpr),
}

impl From<Column> for Selectable {
    fn from(c: Column) -> Self {
        Selectable::Column(c)
    }
}

impl From<Aggregate> for Selectable {
    fn from(a: Aggregate) -> Self {
        Selectable::Aggregate(a)
    }
}

impl From<RawExpr> for Selectable {
    fn from(r: RawExpr) -> Self {
        Selectable::Raw(r)
    }
}

// =============================================================================
// Order By
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortDir {
    type Err = String;

    /// Directions are case-sensitive: exactly `ASC` or `DESC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(SortDir::Asc),
            "DESC" => Ok(SortDir::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// ORDER BY item.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: Column,
    pub dir: SortDir,
}

impl OrderBy {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            dir: SortDir::Asc,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            dir: SortDir::Desc,
        }
    }
}

// =============================================================================
// Selector
// =============================================================================

#[derive(Debug, Clone, Default)]
enum FromClause {
    /// Quoted table of the statement's entity
    #[default]
    Entity,
    /// Caller-supplied text, written verbatim
    Named(String),
    Reference(TableReference),
}

/// SELECT statement builder.
///
/// Methods consume and return the builder; [`build`](Self::build) borrows it,
/// so one configuration can be compiled any number of times.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until built"]
pub struct Selector {
    db: Db,
    entity: Option<EntityKey>,
    columns: Vec<Selectable>,
    from: FromClause,
    filters: Vec<Expr>,
    group_by: Vec<Column>,
    having: Vec<Expr>,
    order_by: Vec<OrderBy>,
    limit: i64,
    offset: i64,
}

impl Selector {
    /// A statement over `entity`; `None` fails at build time with `NilEntity`.
    pub fn new(db: Db, entity: Option<EntityKey>) -> Self {
        Self {
            db,
            entity,
            columns: Vec::new(),
            from: FromClause::Entity,
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: 0,
            offset: 0,
        }
    }

    /// Replace the SELECT list. Empty selects `*`.
    pub fn select(mut self, items: Vec<Selectable>) -> Self {
        self.columns = items;
        self
    }

    /// Append one SELECT item.
    pub fn column(mut self, item: impl Into<Selectable>) -> Self {
        self.columns.push(item.into());
        self
    }

    /// FROM text written verbatim. Empty restores the entity's quoted table.
    pub fn from(mut self, table: &str) -> Self {
        self.from = if table.is_empty() {
            FromClause::Entity
        } else {
            FromClause::Named(table.into())
        };
        self
    }

    pub fn from_table(mut self, table: impl Into<TableReference>) -> Self {
        self.from = FromClause::Reference(table.into());
        self
    }

    /// Add a WHERE predicate; predicates are ANDed in call order.
    pub fn filter(mut self, predicate: impl Into<Expr>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    pub fn where_all(mut self, predicates: impl IntoIterator<Item = Expr>) -> Self {
        self.filters.extend(predicates);
        self
    }

    pub fn group_by(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.group_by.extend(columns);
        self
    }

    pub fn having(mut self, predicate: impl Into<Expr>) -> Self {
        self.having.push(predicate.into());
        self
    }

    pub fn having_all(mut self, predicates: impl IntoIterator<Item = Expr>) -> Self {
        self.having.extend(predicates);
        self
    }

    pub fn order_by(mut self, items: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order_by.extend(items);
        self
    }

    /// Non-positive values omit the clause.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Non-positive values omit the clause.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Wrap this statement for use as an expression or FROM source.
    pub fn as_subquery(self, alias: &str) -> Subquery {
        Subquery::new(self, Vec::new(), Some(alias.to_string()))
    }

    /// Like [`as_subquery`](Self::as_subquery), restricting which fields
    /// outer columns may reference.
    pub fn as_subquery_with(self, columns: &[&str], alias: &str) -> Subquery {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        Subquery::new(self, columns, Some(alias.to_string()))
    }

    pub(crate) fn metadata(&self) -> BuildResult<Arc<EntityMetadata>> {
        let entity = self.entity.as_ref().ok_or(BuildError::NilEntity)?;
        self.db.registry().resolve(entity)
    }

    /// Compile the statement.
    ///
    /// The first error aborts the build; no partial SQL is returned.
    pub fn build(&self) -> BuildResult<Query> {
        let primary = self.metadata()?;
        let mut c = Compiler::new(&**self.db.registry(), primary);

        c.tokens().push(Token::Select).space();
        self.build_columns(&mut c)?;

        c.tokens().space().push(Token::From).space();
        self.build_from(&mut c)?;

        if !self.filters.is_empty() {
            c.tokens().space().push(Token::Where).space();
            c.compile_predicates(&self.filters)?;
        }

        if !self.group_by.is_empty() {
            c.tokens().space().push(Token::GroupBy).space();
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    c.tokens().comma();
                }
                c.compile_column(column, false)?;
            }
        }

        if !self.having.is_empty() {
            c.tokens().space().push(Token::Having).space();
            c.compile_predicates(&self.having)?;
        }

        if !self.order_by.is_empty() {
            c.tokens().space().push(Token::OrderBy).space();
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    c.tokens().comma();
                }
                c.compile_column(&item.column, false)?;
                let dir = match item.dir {
                    SortDir::Asc => Token::Asc,
                    SortDir::Desc => Token::Desc,
                };
                c.tokens().space().push(dir);
            }
        }

        if self.limit > 0 {
            c.tokens()
                .space()
                .push(Token::Limit)
                .space()
                .param(Value::Int(self.limit));
        }

        if self.offset > 0 {
            c.tokens()
                .space()
                .push(Token::Offset)
                .space()
                .param(Value::Int(self.offset));
        }

        c.tokens().push(Token::Semicolon);

        let query = c.finish().render(self.db.dialect());
        debug!(
            entity = ?self.entity.as_ref().map(|e| e.name.as_str()),
            dialect = self.db.dialect().name(),
            sql_len = query.sql.len(),
            args = query.args.len(),
            "built statement"
        );
        Ok(query)
    }

    fn build_columns(&self, c: &mut Compiler<'_>) -> BuildResult<()> {
        if self.columns.is_empty() {
            c.tokens().push(Token::Star);
            return Ok(());
        }
        for (i, item) in self.columns.iter().enumerate() {
            if i > 0 {
                c.tokens().comma();
            }
            match item {
                Selectable::Column(col) => c.compile_column(col, true)?,
                Selectable::Aggregate(agg) => c.compile_aggregate(agg, true)?,
                Selectable::Raw(raw) => c.compile_raw(raw),
            }
        }
        Ok(())
    }

    fn build_from(&self, c: &mut Compiler<'_>) -> BuildResult<()> {
        match &self.from {
            FromClause::Entity => {
                let table = c.primary().table_name.clone();
                c.tokens().ident(&table);
            }
            FromClause::Named(name) => {
                c.tokens().push(Token::Raw(name.clone()));
            }
            FromClause::Reference(TableReference::Table(t)) => {
                let meta = self.db.registry().resolve(&t.entity)?;
                c.tokens().ident(&meta.table_name);
                c.compile_as(t.alias.as_deref());
            }
            FromClause::Reference(TableReference::Subquery(s)) => {
                let alias = s.alias().ok_or(BuildError::MissingSubqueryAlias)?;
                c.compile_subquery(s)?;
                c.compile_as(Some(alias));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
