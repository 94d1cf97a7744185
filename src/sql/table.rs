//! Table references: FROM-clause sources and nested statements.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use super::error::{BuildError, BuildResult};
use super::expr::{Aggregate, Column};
use super::query::{Query, Selector};
use crate::metadata::{Entity, EntityKey, EntityMetadata};

/// A FROM-clause source.
#[derive(Debug, Clone)]
pub enum TableReference {
    Table(Table),
    Subquery(Subquery),
}

impl TableReference {
    /// Qualifier written before columns resolved against this source.
    ///
    /// Only non-empty aliases qualify; an unaliased table leaves columns bare.
    pub fn qualifier(&self) -> Option<&str> {
        let alias = match self {
            TableReference::Table(t) => t.alias.as_deref(),
            TableReference::Subquery(s) => s.alias(),
        };
        alias.filter(|a| !a.is_empty())
    }

    pub fn col(&self, name: &str) -> Column {
        Column::new(name).of(self.clone())
    }
}

impl From<Table> for TableReference {
    fn from(t: Table) -> Self {
        TableReference::Table(t)
    }
}

impl From<Subquery> for TableReference {
    fn from(s: Subquery) -> Self {
        TableReference::Subquery(s)
    }
}

/// A base table, identified by its entity.
#[derive(Debug, Clone)]
pub struct Table {
    pub entity: EntityKey,
    pub alias: Option<String>,
}

impl Table {
    pub fn of<T: Entity>() -> Self {
        Self::new(EntityKey::of::<T>())
    }

    pub fn named(entity: &str) -> Self {
        Self::new(EntityKey::named(entity))
    }

    pub fn new(entity: EntityKey) -> Self {
        Self {
            entity,
            alias: None,
        }
    }

    /// Empty clears the alias.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = non_empty(Some(alias.to_string()));
        self
    }

    /// Column of this table.
    pub fn col(&self, name: &str) -> Column {
        Column::new(name).of(self.clone())
    }

    /// Aggregate over a column of this table.
    pub fn aggregate(&self, function: &str, field: &str) -> Aggregate {
        Aggregate::new(function, field).of(self.clone())
    }
}

/// A nested statement.
///
/// Clones share the compiled-SQL cell, so a subquery referenced from several
/// places is built once and every reference emits the same text and
/// arguments. The cell is initialised exactly once even under concurrent
/// builds.
#[derive(Debug, Clone)]
pub struct Subquery {
    selector: Arc<Selector>,
    columns: Vec<String>,
    alias: Option<String>,
    compiled: Arc<OnceCell<Query>>,
}

impl Subquery {
    /// An empty alias counts as none; FROM position then fails to build.
    pub fn new(selector: Selector, columns: Vec<String>, alias: Option<String>) -> Self {
        Self {
            selector: Arc::new(selector),
            columns,
            alias: non_empty(alias),
            compiled: Arc::new(OnceCell::new()),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Output columns when restricted; empty means every inner field.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column of this subquery, qualified by its alias.
    pub fn col(&self, name: &str) -> Column {
        Column::new(name).of(self.clone())
    }

    /// Metadata of the inner statement's entity.
    pub fn metadata(&self) -> BuildResult<Arc<EntityMetadata>> {
        self.selector.metadata()
    }

    /// Whether any reference has compiled this subquery yet.
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Inner SQL without its terminator, plus its arguments.
    pub fn compiled(&self) -> BuildResult<&Query> {
        if let Some(q) = self.compiled.get() {
            trace!(alias = ?self.alias, "subquery cache hit");
            return Ok(q);
        }
        self.compiled.get_or_try_init(|| {
            trace!(alias = ?self.alias, "subquery cache miss");
            let mut q = self.selector.build()?;
            if q.sql.ends_with(';') {
                q.sql.pop();
            }
            Ok::<_, BuildError>(q)
        })
    }
}

fn non_empty(alias: Option<String>) -> Option<String> {
    alias.filter(|a| !a.is_empty())
}

/// A subquery behind a keyword, e.g. `EXISTS (SELECT ...)`.
///
/// The keyword is written as-is, including its trailing space.
#[derive(Debug, Clone)]
pub struct SubqueryExpr {
    pub keyword: String,
    pub subquery: Subquery,
}

impl SubqueryExpr {
    pub fn new(keyword: &str, subquery: Subquery) -> Self {
        Self {
            keyword: keyword.into(),
            subquery,
        }
    }
}

/// EXISTS (subquery)
pub fn exists(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr::new("EXISTS ", sub)
}

/// NOT EXISTS (subquery)
pub fn not_exists(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr::new("NOT EXISTS ", sub)
}

/// ANY (subquery)
pub fn any(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr::new("ANY ", sub)
}

/// ALL (subquery)
pub fn all(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr::new("ALL ", sub)
}

/// SOME (subquery)
pub fn some(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr::new("SOME ", sub)
}
