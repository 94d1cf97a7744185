//! Entity metadata.
//!
//! The compiler never inspects application types itself. It asks a
//! [`MetadataResolver`] for an entity's table name and field mapping and
//! borrows the answer for the duration of one build.
//!
//! # Example
//!
//! ```ignore
//! use ormql::metadata::{Entity, EntityKey, EntityMetadata, MetadataResolver, Registry};
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn metadata() -> EntityMetadata {
//!         EntityMetadata::new("user").fields(&["Id", "FirstName", "Age"])
//!     }
//! }
//!
//! let registry = Registry::new();
//! let meta = registry.resolve(&EntityKey::of::<User>())?;
//! assert_eq!(meta.column("FirstName"), Some("first_name"));
//! ```

mod registry;
mod types;

pub use registry::{MetadataResolver, Registry};
pub use types::{Entity, EntityKey, EntityMetadata};
