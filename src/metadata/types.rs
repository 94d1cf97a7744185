//! Entity metadata types.

use std::any::TypeId;

use inflector::Inflector;

use crate::sql::error::{BuildError, BuildResult};

/// Table name plus the ordered logical-field to column mapping of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    pub table_name: String,
    fields: Vec<(String, String)>,
}

impl EntityMetadata {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.into(),
            fields: Vec::new(),
        }
    }

    /// Map a logical field to an explicit column name.
    ///
    /// Re-mapping an existing field replaces its column in place.
    pub fn field(mut self, logical: &str, column: &str) -> Self {
        match self.fields.iter_mut().find(|(l, _)| l == logical) {
            Some(entry) => entry.1 = column.into(),
            None => self.fields.push((logical.into(), column.into())),
        }
        self
    }

    /// Map each logical field to its snake_case column (`FirstName` -> `first_name`).
    pub fn fields(self, logical: &[&str]) -> Self {
        logical.iter().fold(self, |meta, name| {
            let column = name.to_snake_case();
            meta.field(name, &column)
        })
    }

    /// Physical column for a logical field.
    pub fn column(&self, logical: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == logical)
            .map(|(_, c)| c.as_str())
    }

    /// Like [`column`](Self::column), failing with `UnknownField`.
    pub fn require_column(&self, logical: &str) -> BuildResult<&str> {
        self.column(logical)
            .ok_or_else(|| BuildError::UnknownField(logical.into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(l, c)| (l.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject metadata no statement could be compiled against.
    pub(crate) fn validate(&self, entity: &str) -> BuildResult<()> {
        if self.table_name.trim().is_empty() || self.fields.is_empty() {
            return Err(BuildError::UnsupportedEntityKind(entity.into()));
        }
        Ok(())
    }
}

/// An application type mapped to a table.
///
/// How `metadata` is produced (hand-written, derived, generated) is up to
/// the implementor.
pub trait Entity: 'static {
    fn metadata() -> EntityMetadata;

    /// Display name used in logs and errors; defaults to the snake_case type
    /// name. Typed entities are keyed by type, not by this name.
    fn entity_name() -> String {
        let full = std::any::type_name::<Self>();
        let short = full.rsplit("::").next().unwrap_or(full);
        short.to_snake_case()
    }
}

/// Identifies an entity for the resolver.
///
/// Typed keys carry their `TypeId` and a describe function and are registered
/// lazily on first resolution. Named keys only resolve if the name was
/// registered up front. The two never share a registry slot.
#[derive(Debug, Clone)]
pub struct EntityKey {
    pub name: String,
    pub(crate) typed: Option<TypedEntity>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TypedEntity {
    pub(crate) id: TypeId,
    pub(crate) describe: fn() -> EntityMetadata,
}

impl EntityKey {
    pub fn of<T: Entity>() -> Self {
        Self {
            name: T::entity_name(),
            typed: Some(TypedEntity {
                id: TypeId::of::<T>(),
                describe: T::metadata,
            }),
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.into(),
            typed: None,
        }
    }

    pub fn is_typed(&self) -> bool {
        self.typed.is_some()
    }
}

impl PartialEq for EntityKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.typed, &other.typed) {
            (Some(a), Some(b)) => a.id == b.id,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }
}

impl Eq for EntityKey {}
