//! Errors raised while building a statement.
//!
//! Every variant describes a malformed query definition or a misconfigured
//! entity. None of them are transient, so callers should surface them rather
//! than retry.

/// Error type for statement building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("statement has no target entity")]
    NilEntity,

    #[error("cannot resolve metadata for entity '{0}'")]
    UnresolvableEntity(String),

    #[error("entity '{0}' does not describe a table with fields")]
    UnsupportedEntityKind(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("unsupported expression: {0}")]
    UnsupportedExpressionType(String),

    #[error("subquery used as a table reference must have an alias")]
    MissingSubqueryAlias,
}

pub type BuildResult<T> = Result<T, BuildError>;
