//! Thread-safe metadata registry.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace};

use super::types::{EntityKey, EntityMetadata, TypedEntity};
use crate::sql::error::{BuildError, BuildResult};

/// Resolves an entity key to its metadata.
///
/// Implementations must be idempotent and safe to call from many builders at
/// once.
pub trait MetadataResolver: Send + Sync {
    fn resolve(&self, key: &EntityKey) -> BuildResult<Arc<EntityMetadata>>;
}

/// Caching resolver.
///
/// Typed keys are cached by `TypeId` and described at most once; named keys
/// must be registered. Same-named types never share metadata.
#[derive(Debug, Default)]
pub struct Registry {
    named: DashMap<String, Arc<EntityMetadata>>,
    typed: DashMap<TypeId, Arc<EntityMetadata>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata under `name`, replacing any previous entry.
    pub fn register(&self, name: &str, metadata: EntityMetadata) -> BuildResult<()> {
        metadata.validate(name)?;
        debug!(entity = name, table = %metadata.table_name, fields = metadata.len(), "registered entity");
        self.named.insert(name.into(), Arc::new(metadata));
        Ok(())
    }

    /// Metadata registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<EntityMetadata>> {
        self.named.get(name).map(|m| Arc::clone(m.value()))
    }

    /// Registered entity names, sorted. Typed entities are not listed.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.named.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Cached entities, named and typed.
    pub fn len(&self) -> usize {
        self.named.len() + self.typed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.typed.is_empty()
    }

    fn resolve_typed(&self, name: &str, typed: TypedEntity) -> BuildResult<Arc<EntityMetadata>> {
        if let Some(meta) = self.typed.get(&typed.id) {
            trace!(entity = name, "metadata cache hit");
            return Ok(Arc::clone(meta.value()));
        }

        match self.typed.entry(typed.id) {
            // Lost a race with another builder describing the same entity.
            Entry::Occupied(existing) => Ok(Arc::clone(existing.get())),
            Entry::Vacant(slot) => {
                let meta = (typed.describe)();
                meta.validate(name)?;
                debug!(entity = name, table = %meta.table_name, "described entity");
                Ok(Arc::clone(slot.insert(Arc::new(meta)).value()))
            }
        }
    }
}

impl MetadataResolver for Registry {
    fn resolve(&self, key: &EntityKey) -> BuildResult<Arc<EntityMetadata>> {
        match key.typed {
            Some(typed) => self.resolve_typed(&key.name, typed),
            None => self
                .get(&key.name)
                .ok_or_else(|| BuildError::UnresolvableEntity(key.name.clone())),
        }
    }
}
