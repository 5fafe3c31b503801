//! # STRATA Core Engine
//!
//! Archetype-organized entity/component storage:
//! - Entities grouped into dense per-archetype tables
//! - O(arity) create and destroy, independent of population
//! - Queries planned by type-set algebra, iterated without per-row checks
//!
//! ## Architecture Rules
//!
//! 1. **Fixed catalog** - Archetypes are declared before the registry
//!    exists; invalid configurations are rejected before any storage
//!    mutation
//! 2. **Data-oriented design** - Components are stored in contiguous
//!    columns, index-aligned with the entity column
//! 3. **Borrow-checked iteration** - Views hold the registry exclusively,
//!    so mutating while iterating does not compile
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{CatalogBuilder, Registry};
//!
//! #[derive(Debug, Clone, Copy, Default)]
//! struct Position { x: f64, y: f64 }
//!
//! #[derive(Debug, Clone, Copy, Default)]
//! struct Velocity { x: f64, y: f64 }
//!
//! let catalog = CatalogBuilder::new()
//!     .archetype::<(Position,)>()
//!     .archetype::<(Position, Velocity)>()
//!     .build()?;
//! let mut registry = Registry::new(catalog);
//!
//! let probe = registry.create((Position { x: 1.0, y: 2.0 }, Velocity { x: 0.1, y: 0.0 }))?;
//!
//! registry.view::<(Position, Velocity)>()?.each(|_entity, (position, velocity)| {
//!     position.x += velocity.x;
//!     position.y += velocity.y;
//! });
//!
//! assert_eq!(registry.get::<Position>(probe).map(|p| p.x), Some(1.1));
//! # Ok::<(), strata_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;

pub use ecs::{
    Catalog, CatalogBuilder, Component, ComponentSet, ComponentTypeId, EcsError, EcsResult,
    Entity, EntityLocation, Registry, Signature, View,
};
