//! Expression AST - the core of SQL expression building.
//!
//! This module provides a closed, strongly-typed AST for the expressions a
//! statement can be built from. The compiler matches on [`Expr`]
//! exhaustively, so a new node kind cannot be added without teaching every
//! consumer about it.

use super::table::{Subquery, SubqueryExpr, TableReference};
use super::value::Value;

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Field reference, resolved to a physical column at build time
    Column(Column),

    /// Literal bound as a positional argument
    Value(Value),

    /// Verbatim SQL with its own arguments
    Raw(RawExpr),

    /// Boolean node: comparison or logical connective
    Predicate(BinaryExpr),

    /// Arithmetic node
    Math(BinaryExpr),

    /// Aggregate function over a single field
    Aggregate(Aggregate),

    /// Nested statement: (SELECT ...)
    Subquery(Subquery),

    /// Nested statement behind a keyword: EXISTS (SELECT ...)
    SubqueryExpr(SubqueryExpr),
}

/// A logical field reference.
///
/// `name` is the entity's field name, not the column name; the compiler looks
/// it up in the metadata of `table` (or of the statement's entity when `table`
/// is `None`).
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub table: Option<TableReference>,
    pub alias: Option<String>,
}

impl Column {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            table: None,
            alias: None,
        }
    }

    /// Alias emitted when the column appears in the SELECT list.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Resolve this column against `table` instead of the statement's entity.
    pub fn of(mut self, table: impl Into<TableReference>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Raw SQL fragment.
///
/// **Never build the text from user input.** Values go in `args`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Aggregate call such as `AVG(age)`.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub function: String,
    pub field: String,
    pub table: Option<TableReference>,
    pub alias: Option<String>,
}

impl Aggregate {
    pub fn new(function: &str, field: &str) -> Self {
        Self {
            function: function.into(),
            field: field.into(),
            table: None,
            alias: None,
        }
    }

    /// Alias emitted when the aggregate appears in the SELECT list.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn of(mut self, table: impl Into<TableReference>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Shared shape of predicate and arithmetic nodes.
///
/// `right` is `None` only for unary operators: prefix `NOT` (operand in
/// `left`) and postfix `IS [NOT] NULL`.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: Operator,
    pub right: Option<Box<Expr>>,
}

impl BinaryExpr {
    pub fn new(left: Expr, op: Operator, right: Expr) -> Self {
        Self {
            left: Box::new(left),
            op,
            right: Some(Box::new(right)),
        }
    }

    pub fn unary(operand: Expr, op: Operator) -> Self {
        Self {
            left: Box::new(operand),
            op,
            right: None,
        }
    }
}

/// Operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    In,
    NotIn,
    // Logical
    And,
    Or,
    Not,
    // Postfix
    IsNull,
    IsNotNull,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Which node kind an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Predicate,
    Arithmetic,
}

impl Operator {
    pub fn class(self) -> OperatorClass {
        match self {
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod => {
                OperatorClass::Arithmetic
            }
            _ => OperatorClass::Predicate,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        self.class() == OperatorClass::Arithmetic
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not | Operator::IsNull | Operator::IsNotNull)
    }

    /// Unary operators written before their operand.
    pub fn is_prefix(self) -> bool {
        self == Operator::Not
    }

    pub fn all() -> &'static [Operator] {
        use Operator::*;
        &[
            Eq, Ne, Lt, Lte, Gt, Gte, Like, NotLike, In, NotIn, And, Or, Not, IsNull, IsNotNull,
            Add, Sub, Mul, Div, Mod,
        ]
    }

    /// Stable snake_case name, used by configuration and query documents.
    pub fn key(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Like => "like",
            Operator::NotLike => "not_like",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Mod => "mod",
        }
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Operator::all()
            .iter()
            .copied()
            .find(|op| op.key() == key)
            .ok_or_else(|| format!("unknown operator: {}", s))
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Reference a field of the statement's entity.
pub fn col(name: &str) -> Column {
    Column::new(name)
}

/// Bind a literal.
pub fn value(v: impl Into<Value>) -> Expr {
    Expr::Value(v.into())
}

/// Raw SQL fragment with positional arguments.
pub fn raw(sql: &str, args: Vec<Value>) -> RawExpr {
    RawExpr {
        sql: sql.into(),
        args,
    }
}

/// NOT (expr)
pub fn not(expr: impl Into<Expr>) -> Expr {
    Expr::Predicate(BinaryExpr::unary(expr.into(), Operator::Not))
}

/// AVG(field)
pub fn avg(field: &str) -> Aggregate {
    Aggregate::new("AVG", field)
}

/// SUM(field)
pub fn sum(field: &str) -> Aggregate {
    Aggregate::new("SUM", field)
}

/// COUNT(field)
pub fn count(field: &str) -> Aggregate {
    Aggregate::new("COUNT", field)
}

/// MIN(field)
pub fn min(field: &str) -> Aggregate {
    Aggregate::new("MIN", field)
}

/// MAX(field)
pub fn max(field: &str) -> Aggregate {
    Aggregate::new("MAX", field)
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

fn predicate(left: Expr, op: Operator, right: Expr) -> Expr {
    Expr::Predicate(BinaryExpr::new(left, op, right))
}

fn math(left: Expr, op: Operator, right: Expr) -> Expr {
    Expr::Math(BinaryExpr::new(left, op, right))
}

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    // Comparison operators
    fn eq(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Ne, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Lte, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Gte, other.into())
    }

    fn like(self, pattern: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Like, pattern.into())
    }

    fn not_like(self, pattern: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::NotLike, pattern.into())
    }

    /// expr IN (SELECT ...)
    fn in_query(self, sub: Subquery) -> Expr {
        predicate(self.into_expr(), Operator::In, Expr::Subquery(sub))
    }

    /// expr NOT IN (SELECT ...)
    fn not_in_query(self, sub: Subquery) -> Expr {
        predicate(self.into_expr(), Operator::NotIn, Expr::Subquery(sub))
    }

    // NULL checks
    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        Expr::Predicate(BinaryExpr::unary(self.into_expr(), Operator::IsNull))
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr {
        Expr::Predicate(BinaryExpr::unary(self.into_expr(), Operator::IsNotNull))
    }

    // Logical operators
    fn and(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::And, other.into())
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        predicate(self.into_expr(), Operator::Or, other.into())
    }

    // Arithmetic operators
    fn add(self, other: impl Into<Expr>) -> Expr {
        math(self.into_expr(), Operator::Add, other.into())
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        math(self.into_expr(), Operator::Sub, other.into())
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        math(self.into_expr(), Operator::Mul, other.into())
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        math(self.into_expr(), Operator::Div, other.into())
    }

    fn modulo(self, other: impl Into<Expr>) -> Expr {
        math(self.into_expr(), Operator::Mod, other.into())
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl ExprExt for Column {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl ExprExt for Aggregate {
    fn into_expr(self) -> Expr {
        Expr::Aggregate(self)
    }
}

impl ExprExt for RawExpr {
    fn into_expr(self) -> Expr {
        Expr::Raw(self)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::Column(c)
    }
}

impl From<Aggregate> for Expr {
    fn from(a: Aggregate) -> Self {
        Expr::Aggregate(a)
    }
}

impl From<RawExpr> for Expr {
    fn from(r: RawExpr) -> Self {
        Expr::Raw(r)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Value(v)
    }
}

impl From<Subquery> for Expr {
    fn from(s: Subquery) -> Self {
        Expr::Subquery(s)
    }
}

impl From<SubqueryExpr> for Expr {
    fn from(s: SubqueryExpr) -> Self {
        Expr::SubqueryExpr(s)
    }
}

macro_rules! literal_into_expr {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Value(v.into())
                }
            }
        )*
    };
}

literal_into_expr!(i32, i64, u32, f64, bool, &str, String);

// =============================================================================
// Tests
// =============================================================================
