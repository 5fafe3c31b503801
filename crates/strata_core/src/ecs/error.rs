//! # Storage Engine Error Types
//!
//! All errors reported by catalog construction and registry operations.
//!
//! Configuration errors (`DuplicateComponent`, `DuplicateArchetype`,
//! `UnknownArchetype`, `NoMatchingArchetype`) surface before any storage
//! mutation: a request that names an invalid or unregistered component set
//! is rejected at the call site that made it. Runtime errors
//! (`EntityNotFound`, `IdSpaceExhausted`) never leave partial state behind.

use thiserror::Error;

use super::entity::Entity;

/// Errors that can occur in the storage engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A component set names the same component type more than once.
    ///
    /// Archetypes and queries are sets: every component type must appear
    /// exactly once.
    #[error("component set contains a duplicate type: {components}")]
    DuplicateComponent {
        /// Human-readable list of the component types in the set.
        components: String,
    },

    /// Two declared archetypes contain the same set of component types,
    /// ignoring declaration order.
    #[error("duplicate archetype in catalog: {components}")]
    DuplicateArchetype {
        /// Human-readable list of the duplicated component set.
        components: String,
    },

    /// A `create` or `migrate` call named a component set with no exactly
    /// matching archetype in the catalog.
    #[error("no archetype registered for component set: {components}")]
    UnknownArchetype {
        /// Human-readable list of the requested component types.
        components: String,
    },

    /// A `view` or typed destroy named a component set that no catalog
    /// archetype includes.
    #[error("no archetype includes the component set: {components}")]
    NoMatchingArchetype {
        /// Human-readable list of the requested component types.
        components: String,
    },

    /// The entity is not live: never created, already destroyed, or a
    /// stale handle whose index has since been recycled.
    #[error("entity is not alive: {0}")]
    EntityNotFound(Entity),

    /// The 32-bit entity index space is exhausted.
    #[error("entity id space exhausted")]
    IdSpaceExhausted,
}

/// Result type for storage engine operations.
pub type EcsResult<T> = Result<T, EcsError>;
