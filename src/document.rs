//! JSON query documents.
//!
//! A document describes one statement plus a table of named subqueries:
//!
//! ```json
//! {
//!   "entity": "user",
//!   "select": [{ "column": { "name": "Id" } }],
//!   "where": [
//!     { "binary": { "op": "in",
//!                   "left": { "column": { "name": "Id" } },
//!                   "right": { "subquery": "orders" } } }
//!   ],
//!   "limit": 10,
//!   "subqueries": {
//!     "orders": { "entity": "order_detail", "alias": "orders",
//!                 "select": [{ "column": { "name": "OrderId" } }] }
//!   }
//! }
//! ```
//!
//! Every reference to the same name lowers to the same [`Subquery`] node, so
//! the statement is compiled once however often it is used.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::Db;
use crate::metadata::EntityKey;
use crate::sql::error::BuildError;
use crate::sql::expr::{Aggregate, BinaryExpr, Column, Expr, Operator, RawExpr};
use crate::sql::query::{OrderBy, Query, Selectable, Selector, SortDir};
use crate::sql::table::{Subquery, SubqueryExpr, Table, TableReference};
use crate::sql::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read query document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid query document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown subquery: {0}")]
    UnknownSubquery(String),

    #[error("Subquery '{0}' references itself")]
    SubqueryCycle(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}

// =============================================================================
// Document model
// =============================================================================

/// Top-level document: a statement plus its named subqueries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueryDocument {
    #[serde(flatten)]
    pub statement: StatementDoc,

    #[serde(default)]
    pub subqueries: BTreeMap<String, SubqueryDoc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StatementDoc {
    pub entity: Option<String>,
    pub select: Vec<SelectDoc>,
    pub from: Option<FromDoc>,
    #[serde(rename = "where")]
    pub filters: Vec<ExprDoc>,
    pub group_by: Vec<ColumnDoc>,
    pub having: Vec<ExprDoc>,
    pub order_by: Vec<OrderDoc>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubqueryDoc {
    #[serde(flatten)]
    pub statement: StatementDoc,

    #[serde(default)]
    pub alias: Option<String>,

    /// Restricts which fields outer columns may reference.
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectDoc {
    Column(ColumnDoc),
    Aggregate(AggregateDoc),
    Raw(RawDoc),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnDoc {
    pub name: String,
    #[serde(default)]
    pub table: Option<TableDoc>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregateDoc {
    pub function: String,
    pub field: String,
    #[serde(default)]
    pub table: Option<TableDoc>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawDoc {
    pub sql: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TableDoc {
    Subquery {
        subquery: String,
    },
    Entity {
        entity: String,
        #[serde(default)]
        alias: Option<String>,
    },
}

/// FROM source: verbatim text or a table reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FromDoc {
    Text(String),
    Table(TableDoc),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderDoc {
    pub column: ColumnDoc,
    #[serde(default = "default_dir")]
    pub dir: String,
}

fn default_dir() -> String {
    "ASC".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprDoc {
    Column(ColumnDoc),
    Value(Value),
    Raw(RawDoc),
    Aggregate(AggregateDoc),
    /// Predicate or arithmetic node, chosen by the operator.
    Binary {
        op: String,
        left: Box<ExprDoc>,
        #[serde(default)]
        right: Option<Box<ExprDoc>>,
    },
    Subquery(String),
    /// Keyword such as `EXISTS` or `NOT EXISTS` before a subquery.
    Keyword {
        keyword: String,
        subquery: String,
    },
}

impl QueryDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Lower the document to a statement builder.
    pub fn to_selector(&self, db: &Db) -> Result<Selector, DocumentError> {
        let mut lowering = Lowering {
            db,
            docs: &self.subqueries,
            built: HashMap::new(),
            pending: Vec::new(),
        };
        let selector = lowering.statement(&self.statement)?;
        debug!(subqueries = lowering.built.len(), "lowered query document");
        Ok(selector)
    }

    pub fn render(&self, db: &Db) -> Result<Query, DocumentError> {
        Ok(self.to_selector(db)?.build()?)
    }
}

// =============================================================================
// Lowering
// =============================================================================

struct Lowering<'a> {
    db: &'a Db,
    docs: &'a BTreeMap<String, SubqueryDoc>,
    built: HashMap<String, Subquery>,
    pending: Vec<String>,
}

impl Lowering<'_> {
    fn statement(&mut self, doc: &StatementDoc) -> Result<Selector, DocumentError> {
        let entity = doc.entity.as_deref().map(EntityKey::named);
        let mut selector = Selector::new(self.db.clone(), entity);

        let mut items = Vec::with_capacity(doc.select.len());
        for item in &doc.select {
            items.push(match item {
                SelectDoc::Column(c) => Selectable::Column(self.column(c)?),
                SelectDoc::Aggregate(a) => Selectable::Aggregate(self.aggregate(a)?),
                SelectDoc::Raw(r) => Selectable::Raw(raw(r)),
            });
        }
        selector = selector.select(items);

        selector = match &doc.from {
            None => selector,
            Some(FromDoc::Text(text)) => selector.from(text),
            Some(FromDoc::Table(t)) => selector.from_table(self.table(t)?),
        };

        let filters = self.exprs(&doc.filters)?;
        let group_by = doc
            .group_by
            .iter()
            .map(|c| self.column(c))
            .collect::<Result<Vec<_>, _>>()?;
        let having = self.exprs(&doc.having)?;

        let mut order_by = Vec::with_capacity(doc.order_by.len());
        for item in &doc.order_by {
            let dir = item
                .dir
                .parse::<SortDir>()
                .map_err(|_| DocumentError::UnknownSortDirection(item.dir.clone()))?;
            order_by.push(OrderBy {
                column: self.column(&item.column)?,
                dir,
            });
        }

        Ok(selector
            .where_all(filters)
            .group_by(group_by)
            .having_all(having)
            .order_by(order_by)
            .limit(doc.limit)
            .offset(doc.offset))
    }

    fn subquery(&mut self, name: &str) -> Result<Subquery, DocumentError> {
        if let Some(sub) = self.built.get(name) {
            return Ok(sub.clone());
        }
        if self.pending.iter().any(|p| p == name) {
            return Err(DocumentError::SubqueryCycle(name.into()));
        }
        let doc = self
            .docs
            .get(name)
            .ok_or_else(|| DocumentError::UnknownSubquery(name.into()))?;

        self.pending.push(name.into());
        let selector = self.statement(&doc.statement)?;
        self.pending.pop();

        let sub = Subquery::new(selector, doc.columns.clone(), doc.alias.clone());
        self.built.insert(name.into(), sub.clone());
        Ok(sub)
    }

    fn table(&mut self, doc: &TableDoc) -> Result<TableReference, DocumentError> {
        Ok(match doc {
            TableDoc::Subquery { subquery } => TableReference::Subquery(self.subquery(subquery)?),
            TableDoc::Entity { entity, alias } => {
                let table = Table::named(entity);
                TableReference::Table(match alias {
                    Some(alias) => table.alias(alias),
                    None => table,
                })
            }
        })
    }

    fn column(&mut self, doc: &ColumnDoc) -> Result<Column, DocumentError> {
        let table = doc.table.as_ref().map(|t| self.table(t)).transpose()?;
        Ok(Column {
            name: doc.name.clone(),
            table,
            alias: doc.alias.clone(),
        })
    }

    fn aggregate(&mut self, doc: &AggregateDoc) -> Result<Aggregate, DocumentError> {
        let table = doc.table.as_ref().map(|t| self.table(t)).transpose()?;
        Ok(Aggregate {
            function: doc.function.to_uppercase(),
            field: doc.field.clone(),
            table,
            alias: doc.alias.clone(),
        })
    }

    fn exprs(&mut self, docs: &[ExprDoc]) -> Result<Vec<Expr>, DocumentError> {
        docs.iter().map(|d| self.expr(d)).collect()
    }

    fn expr(&mut self, doc: &ExprDoc) -> Result<Expr, DocumentError> {
        Ok(match doc {
            ExprDoc::Column(c) => Expr::Column(self.column(c)?),
            ExprDoc::Value(v) => Expr::Value(v.clone()),
            ExprDoc::Raw(r) => Expr::Raw(raw(r)),
            ExprDoc::Aggregate(a) => Expr::Aggregate(self.aggregate(a)?),
            ExprDoc::Binary { op, left, right } => {
                let op = op
                    .parse::<Operator>()
                    .map_err(|_| DocumentError::UnknownOperator(op.clone()))?;
                let node = BinaryExpr {
                    left: Box::new(self.expr(left)?),
                    op,
                    right: match right {
                        Some(r) => Some(Box::new(self.expr(r)?)),
                        None => None,
                    },
                };
                if op.is_arithmetic() {
                    Expr::Math(node)
                } else {
                    Expr::Predicate(node)
                }
            }
            ExprDoc::Subquery(name) => Expr::Subquery(self.subquery(name)?),
            ExprDoc::Keyword { keyword, subquery } => {
                let keyword = format!("{} ", keyword.trim().to_uppercase());
                Expr::SubqueryExpr(SubqueryExpr::new(&keyword, self.subquery(subquery)?))
            }
        })
    }
}

fn raw(doc: &RawDoc) -> RawExpr {
    RawExpr {
        sql: doc.sql.clone(),
        args: doc.args.clone(),
    }
}
