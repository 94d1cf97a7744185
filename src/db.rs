//! Session handle tying a metadata registry to a dialect.

use std::sync::Arc;

use crate::metadata::{Entity, EntityKey, EntityMetadata, MetadataResolver, Registry};
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::error::BuildResult;
use crate::sql::query::Selector;

/// Entry point for building statements.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Db {
    registry: Arc<Registry>,
    dialect: Arc<dyn SqlDialect>,
}

impl Db {
    pub fn new(registry: Arc<Registry>, dialect: Arc<dyn SqlDialect>) -> Self {
        Self { registry, dialect }
    }

    /// Default registry with the given dialect.
    pub fn with_dialect(dialect: impl SqlDialect + 'static) -> Self {
        Self::new(Arc::new(Registry::new()), Arc::new(dialect))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn resolve(&self, key: &EntityKey) -> BuildResult<Arc<EntityMetadata>> {
        self.registry.resolve(key)
    }

    /// SELECT over a typed entity.
    pub fn select<T: Entity>(&self) -> Selector {
        Selector::new(self.clone(), Some(EntityKey::of::<T>()))
    }

    /// SELECT over an entity registered under `name`.
    pub fn select_named(&self, name: &str) -> Selector {
        Selector::new(self.clone(), Some(EntityKey::named(name)))
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::with_dialect(Dialect::default())
    }
}
