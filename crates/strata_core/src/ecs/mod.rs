//! # Entity Component System
//!
//! Archetype-organized in-memory storage for entities and their
//! components.
//!
//! ## Design Philosophy
//!
//! - Entities with the same component set share one dense table
//! - Archetypes are declared up front; the catalog is fixed at runtime
//! - Queries are resolved by set algebra before any storage is touched
//! - Entity ids are indices with generation counters
//! - No dynamic dispatch per row; columns downcast once per table

pub mod component;
pub mod entity;
pub mod error;
pub mod registry;
pub mod signature;
pub mod table;
pub mod view;

pub use component::{Component, ComponentDescriptor, ComponentSet, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, EcsResult};
pub use registry::{Catalog, CatalogBuilder, EntityLocation, Registry};
pub use signature::{all_distinct, filter_superset, find_exact, Signature};
pub use table::{Column, Table};
pub use view::View;
