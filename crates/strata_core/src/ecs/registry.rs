//! # Registry
//!
//! The single mutable entry point of the storage engine.
//!
//! An application declares its archetypes up front with [`CatalogBuilder`],
//! then constructs a [`Registry`] over the resulting [`Catalog`]. The
//! catalog is immutable from then on: tables cannot be added or removed at
//! runtime, so every query resolves against a fixed list of signatures.
//!
//! The registry owns the archetype tables, the entity allocator and the
//! location index mapping each live entity to its `(table, row)` slot. All
//! operations keep three invariants:
//!
//! 1. Every live entity has exactly one location entry, in bounds, with the
//!    entity column at that row holding the entity.
//! 2. Every column of a table has the table's length.
//! 3. `size()` equals the sum of table lengths.
//!
//! Invalid requests never mutate state: configuration errors (unknown or
//! duplicated component sets) and liveness errors (stale or destroyed
//! handles) are reported as `Err` before any storage is touched.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::component::{set_name, Component, ComponentDescriptor, ComponentSet};
use super::entity::{Entity, EntityAllocator};
use super::error::{EcsError, EcsResult};
use super::signature::{all_distinct, filter_superset, find_exact, Signature};
use super::table::Table;
use super::view::View;

/// One declared archetype: its signature plus the column descriptors needed
/// to materialize a table for it.
struct ArchetypeSpec {
    signature: Signature,
    descriptors: Vec<ComponentDescriptor>,
    name: String,
}

/// A validated, immutable list of archetypes.
///
/// Built once via [`CatalogBuilder`]; the registry's query planner resolves
/// every request against this list.
pub struct Catalog {
    specs: Vec<ArchetypeSpec>,
}

impl Catalog {
    /// Number of declared archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog declares no archetypes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Declares the archetypes of a [`Catalog`].
///
/// ```
/// use strata_core::ecs::registry::CatalogBuilder;
///
/// #[derive(Debug, Clone, Copy, Default)]
/// struct Position { x: f64, y: f64 }
///
/// #[derive(Debug, Clone, Copy, Default)]
/// struct Velocity { x: f64, y: f64 }
///
/// let catalog = CatalogBuilder::new()
///     .archetype::<(Position,)>()
///     .archetype::<(Position, Velocity)>()
///     .build()
///     .unwrap();
/// assert_eq!(catalog.len(), 2);
/// ```
#[derive(Default)]
pub struct CatalogBuilder {
    specs: Vec<ArchetypeSpec>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one archetype as a component tuple. Declaration order of
    /// the tuple does not matter; `(A, B)` and `(B, A)` are the same
    /// archetype.
    #[must_use]
    pub fn archetype<S: ComponentSet>(mut self) -> Self {
        self.specs.push(ArchetypeSpec {
            signature: S::signature(),
            descriptors: S::descriptors(),
            name: set_name::<S>(),
        });
        self
    }

    /// Validates the declarations and produces the catalog.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateComponent`] when an archetype names the same
    ///   component type more than once.
    /// - [`EcsError::DuplicateArchetype`] when two archetypes are set-equal
    ///   regardless of declaration order.
    pub fn build(self) -> EcsResult<Catalog> {
        for spec in &self.specs {
            if !spec.signature.is_set() {
                return Err(EcsError::DuplicateComponent {
                    components: spec.name.clone(),
                });
            }
        }

        for (index, spec) in self.specs.iter().enumerate() {
            if self.specs[index + 1..]
                .iter()
                .any(|other| other.signature == spec.signature)
            {
                return Err(EcsError::DuplicateArchetype {
                    components: spec.name.clone(),
                });
            }
        }

        debug!(archetypes = self.specs.len(), "catalog built");
        Ok(Catalog { specs: self.specs })
    }
}

/// Where a live entity's row lives: table index into the catalog plus row
/// index into that table. Rows move on swap-remove, so locations are only
/// valid until the next structural operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    /// Index of the entity's archetype table.
    pub table: usize,
    /// Row within that table.
    pub row: usize,
}

/// Archetype-organized entity/component storage.
pub struct Registry {
    signatures: Box<[Signature]>,
    tables: Vec<Table>,
    locations: HashMap<Entity, EntityLocation>,
    allocator: EntityAllocator,
}

impl Registry {
    /// Creates an empty registry over a validated catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let signatures: Box<[Signature]> = catalog
            .specs
            .iter()
            .map(|spec| spec.signature.clone())
            .collect();
        let tables = catalog
            .specs
            .into_iter()
            .map(|spec| Table::new(spec.signature, &spec.descriptors))
            .collect();
        debug_assert!(all_distinct(&signatures));

        debug!(tables = signatures.len(), "registry created");
        Self {
            signatures,
            tables,
            locations: HashMap::new(),
            allocator: EntityAllocator::new(),
        }
    }

    /// Creates an entity in the archetype exactly matching `S`, initialized
    /// with the given component values. O(arity) amortized.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownArchetype`] when no catalog archetype is
    ///   set-equal to `S`. Nothing is mutated.
    /// - [`EcsError::IdSpaceExhausted`] when no entity index is available.
    pub fn create<S: ComponentSet>(&mut self, values: S) -> EcsResult<Entity> {
        let target = S::signature();
        let table = find_exact(&self.signatures, &target).ok_or_else(|| {
            EcsError::UnknownArchetype {
                components: set_name::<S>(),
            }
        })?;

        let entity = self.allocator.allocate()?;
        let row = self.tables[table].push_row(entity, values);
        self.locations.insert(entity, EntityLocation { table, row });
        Ok(entity)
    }

    /// Destroys a live entity, removing its row by swap-remove and
    /// recycling its id. O(arity), independent of table size.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] when the entity is not live — never
    /// created, already destroyed, or a stale handle whose index was
    /// recycled. No state is touched.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        let location = self
            .locations
            .remove(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        self.remove_row(location.table, location.row);
        self.allocator.free(entity);
        Ok(())
    }

    /// Typed destroy: identical observable effect to [`Registry::destroy`],
    /// with the entity's archetype named by the caller. Useful when the
    /// caller already knows the component set it created the entity with.
    ///
    /// # Errors
    ///
    /// - [`EcsError::NoMatchingArchetype`] when no catalog archetype
    ///   includes `S` — the request could never name a live entity.
    /// - [`EcsError::EntityNotFound`] as for [`Registry::destroy`].
    pub fn destroy_with<S: ComponentSet>(&mut self, entity: Entity) -> EcsResult<()> {
        let target = S::signature();
        if filter_superset(&self.signatures, &target).is_empty() {
            return Err(EcsError::NoMatchingArchetype {
                components: set_name::<S>(),
            });
        }

        let location = self
            .locations
            .remove(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        debug_assert!(
            self.signatures[location.table].contains_all(&target),
            "entity does not live in an archetype containing the named set"
        );
        self.remove_row(location.table, location.row);
        self.allocator.free(entity);
        Ok(())
    }

    /// Moves a live entity to the archetype exactly matching `S`.
    ///
    /// Component values shared between the old and new archetype carry
    /// over; components new to the destination are default-constructed;
    /// components absent from it are dropped. Migrating to the entity's
    /// current archetype is a no-op.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownArchetype`] when no catalog archetype is
    ///   set-equal to `S`.
    /// - [`EcsError::EntityNotFound`] when the entity is not live.
    pub fn migrate<S: ComponentSet>(&mut self, entity: Entity) -> EcsResult<()> {
        let target = S::signature();
        let destination = find_exact(&self.signatures, &target).ok_or_else(|| {
            EcsError::UnknownArchetype {
                components: set_name::<S>(),
            }
        })?;
        let location = *self
            .locations
            .get(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?;

        if location.table == destination {
            return Ok(());
        }

        trace!(%entity, from = location.table, to = destination, "migrating entity");

        // Build the destination row first, then vacate the source row, so a
        // panic between the two leaves no dangling location.
        let (source, dest) = two_tables(&mut self.tables, location.table, destination);
        let row = dest.len();
        dest.push_migrated(source, location.row, entity);
        self.remove_row(location.table, location.row);
        self.locations.insert(
            entity,
            EntityLocation {
                table: destination,
                row,
            },
        );
        Ok(())
    }

    /// A shared reference to one component of a live entity, or `None`
    /// when the entity is not live or its archetype lacks `C`.
    #[must_use]
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        let location = self.locations.get(&entity)?;
        self.tables[location.table].column::<C>()?.get(location.row)
    }

    /// Mutable variant of [`Registry::get`].
    #[must_use]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        let location = *self.locations.get(&entity)?;
        self.tables[location.table]
            .column_mut::<C>()?
            .get_mut(location.row)
    }

    /// Whether the entity is live and its archetype contains every
    /// component of `S`.
    #[must_use]
    pub fn has<S: ComponentSet>(&self, entity: Entity) -> bool {
        self.locations
            .get(&entity)
            .is_some_and(|location| self.signatures[location.table].contains_all(&S::signature()))
    }

    /// Whether the entity is live.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Where a live entity's row currently lives.
    #[must_use]
    pub fn location(&self, entity: Entity) -> Option<EntityLocation> {
        self.locations.get(&entity).copied()
    }

    /// Number of live entities.
    #[must_use]
    pub fn size(&self) -> usize {
        let total = self.tables.iter().map(Table::len).sum();
        debug_assert_eq!(total, self.locations.len());
        total
    }

    /// Whether no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A view over every table whose archetype contains all of `S`.
    ///
    /// The view borrows the registry exclusively, so structural mutation
    /// while iterating is a compile error. Table selection happens here,
    /// once; iteration does no per-row filtering.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateComponent`] when `S` names a component type
    ///   more than once.
    /// - [`EcsError::NoMatchingArchetype`] when no catalog archetype
    ///   contains all of `S`.
    pub fn view<S: ComponentSet>(&mut self) -> EcsResult<View<'_, S>> {
        let target = S::signature();
        if !target.is_set() {
            return Err(EcsError::DuplicateComponent {
                components: set_name::<S>(),
            });
        }

        let tables = filter_superset(&self.signatures, &target);
        if tables.is_empty() {
            return Err(EcsError::NoMatchingArchetype {
                components: set_name::<S>(),
            });
        }

        Ok(View::new(self, tables))
    }

    /// Destroys every live entity and recycles every id. Table capacity is
    /// retained for reuse.
    pub fn clear(&mut self) {
        debug!(entities = self.locations.len(), "clearing registry");
        for (entity, _) in self.locations.drain() {
            self.allocator.free(entity);
        }
        for table in &mut self.tables {
            table.clear();
        }
    }

    /// Releases excess capacity held by tables, the location index and the
    /// allocator's free list.
    pub fn compact(&mut self) {
        debug!("compacting registry storage");
        for table in &mut self.tables {
            table.shrink_to_fit();
        }
        self.locations.shrink_to_fit();
        self.allocator.shrink_to_fit();
    }

    pub(crate) fn table_mut(&mut self, index: usize) -> &mut Table {
        &mut self.tables[index]
    }

    pub(crate) fn table(&self, index: usize) -> &Table {
        &self.tables[index]
    }

    /// Vacates `row` of `table`, repairing the location of whichever entity
    /// the swap-remove relocated into the vacated slot.
    fn remove_row(&mut self, table: usize, row: usize) {
        if let Some(relocated) = self.tables[table].swap_remove(row) {
            let location = self.locations.get_mut(&relocated);
            debug_assert!(location.is_some(), "relocated entity has no location");
            if let Some(location) = location {
                debug_assert_eq!(location.table, table);
                location.row = row;
            }
        }
    }
}

fn two_tables(tables: &mut [Table], source: usize, destination: usize) -> (&Table, &mut Table) {
    debug_assert_ne!(source, destination);
    if source < destination {
        let (head, tail) = tables.split_at_mut(destination);
        (&head[source], &mut tail[0])
    } else {
        let (head, tail) = tables.split_at_mut(source);
        (&tail[0], &mut head[destination])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Position {
        x: f64,
        y: f64,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Velocity {
        x: f64,
        y: f64,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Color {
        r: f32,
        g: f32,
        b: f32,
    }

    fn world_catalog() -> Catalog {
        CatalogBuilder::new()
            .archetype::<()>()
            .archetype::<(Position,)>()
            .archetype::<(Position, Velocity)>()
            .build()
            .unwrap()
    }

    #[test]
    fn test_catalog_rejects_duplicate_component() {
        let result = CatalogBuilder::new()
            .archetype::<(Position, Position)>()
            .build();
        assert!(matches!(result, Err(EcsError::DuplicateComponent { .. })));
    }

    #[test]
    fn test_catalog_rejects_set_equal_archetypes() {
        let result = CatalogBuilder::new()
            .archetype::<(Position, Velocity)>()
            .archetype::<(Velocity, Position)>()
            .build();
        assert!(matches!(result, Err(EcsError::DuplicateArchetype { .. })));
    }

    #[test]
    fn test_create_rejects_unregistered_archetype() {
        let mut registry = Registry::new(world_catalog());
        let result = registry.create((Color::default(),));
        assert!(matches!(result, Err(EcsError::UnknownArchetype { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_records_location_and_values() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry
            .create((Position { x: 3.0, y: 4.0 }, Velocity::default()))
            .unwrap();

        assert!(registry.contains(entity));
        assert_eq!(registry.size(), 1);
        assert_eq!(registry.get::<Position>(entity), Some(&Position { x: 3.0, y: 4.0 }));

        let location = registry.location(entity).unwrap();
        assert_eq!(registry.table(location.table).entity_at(location.row), Some(entity));
    }

    #[test]
    fn test_destroy_then_size_shrinks_and_slot_is_reused() {
        let mut registry = Registry::new(world_catalog());
        let first = registry.create((Position::default(),)).unwrap();
        let second = registry.create((Position::default(),)).unwrap();
        let second_location = registry.location(second).unwrap();

        registry.destroy(second).unwrap();
        assert_eq!(registry.size(), 1);
        assert!(registry.contains(first));

        // The vacated row is reused by the next create into the same table.
        let third = registry.create((Position::default(),)).unwrap();
        assert_eq!(registry.location(third), Some(second_location));
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn test_destroy_repairs_relocated_entity_location() {
        let mut registry = Registry::new(world_catalog());
        let first = registry.create((Position { x: 1.0, y: 0.0 },)).unwrap();
        let last = registry.create((Position { x: 9.0, y: 0.0 },)).unwrap();

        registry.destroy(first).unwrap();

        // The last row moved into the vacated slot; its location must follow.
        let location = registry.location(last).unwrap();
        assert_eq!(registry.table(location.table).entity_at(location.row), Some(last));
        assert_eq!(registry.get::<Position>(last), Some(&Position { x: 9.0, y: 0.0 }));
    }

    #[test]
    fn test_double_destroy_reports_not_found() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry.create(()).unwrap();

        registry.destroy(entity).unwrap();
        assert_eq!(registry.destroy(entity), Err(EcsError::EntityNotFound(entity)));
        assert_eq!(registry.size(), 0);
    }

    #[test]
    fn test_stale_handle_is_rejected_after_recycling() {
        let mut registry = Registry::new(world_catalog());
        let stale = registry.create(()).unwrap();
        registry.destroy(stale).unwrap();

        // Recycles the same index under a new generation.
        let fresh = registry.create(()).unwrap();
        assert_eq!(stale.index(), fresh.index());

        assert!(!registry.contains(stale));
        assert!(registry.get::<Position>(stale).is_none());
        assert_eq!(registry.destroy(stale), Err(EcsError::EntityNotFound(stale)));
        assert!(registry.contains(fresh));
    }

    #[test]
    fn test_destroy_with_matches_untyped_destroy() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry
            .create((Position::default(), Velocity::default()))
            .unwrap();

        registry.destroy_with::<(Position, Velocity)>(entity).unwrap();
        assert!(registry.is_empty());

        let unmatched = registry.destroy_with::<(Color,)>(Entity::new(0, 0));
        assert!(matches!(unmatched, Err(EcsError::NoMatchingArchetype { .. })));
    }

    #[test]
    fn test_migrate_carries_shared_values_and_defaults_new() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry.create((Position { x: 5.0, y: 6.0 },)).unwrap();

        registry.migrate::<(Position, Velocity)>(entity).unwrap();

        assert_eq!(registry.size(), 1);
        assert_eq!(registry.get::<Position>(entity), Some(&Position { x: 5.0, y: 6.0 }));
        assert_eq!(registry.get::<Velocity>(entity), Some(&Velocity::default()));
        assert!(registry.has::<(Position, Velocity)>(entity));
    }

    #[test]
    fn test_migrate_to_same_archetype_is_noop() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry.create((Position { x: 1.0, y: 2.0 },)).unwrap();
        let before = registry.location(entity);

        registry.migrate::<(Position,)>(entity).unwrap();

        assert_eq!(registry.location(entity), before);
        assert_eq!(registry.get::<Position>(entity), Some(&Position { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn test_migrate_repairs_source_table_locations() {
        let mut registry = Registry::new(world_catalog());
        let moving = registry.create((Position { x: 1.0, y: 0.0 },)).unwrap();
        let staying = registry.create((Position { x: 2.0, y: 0.0 },)).unwrap();

        registry.migrate::<(Position, Velocity)>(moving).unwrap();

        let location = registry.location(staying).unwrap();
        assert_eq!(registry.table(location.table).entity_at(location.row), Some(staying));
        assert_eq!(registry.get::<Position>(staying), Some(&Position { x: 2.0, y: 0.0 }));
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry.create((Position::default(),)).unwrap();

        registry.get_mut::<Position>(entity).unwrap().x = 42.0;
        assert_eq!(registry.get::<Position>(entity).unwrap().x, 42.0);
    }

    #[test]
    fn test_has_checks_subset_not_exact_match() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry
            .create((Position::default(), Velocity::default()))
            .unwrap();

        assert!(registry.has::<(Position,)>(entity));
        assert!(registry.has::<(Position, Velocity)>(entity));
        assert!(!registry.has::<(Color,)>(entity));
        assert!(!registry.has::<(Position,)>(Entity::new(99, 0)));
    }

    #[test]
    fn test_size_sums_all_tables() {
        let mut registry = Registry::new(world_catalog());
        for _ in 0..3 {
            registry.create(()).unwrap();
        }
        for _ in 0..2 {
            registry.create((Position::default(),)).unwrap();
        }
        registry
            .create((Position::default(), Velocity::default()))
            .unwrap();

        assert_eq!(registry.size(), 6);
    }

    #[test]
    fn test_clear_destroys_everything_and_recycles_ids() {
        let mut registry = Registry::new(world_catalog());
        let entity = registry.create((Position::default(),)).unwrap();
        registry.create(()).unwrap();

        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.contains(entity));

        // Cleared indices are recycled under new generations.
        let recycled = registry.create(()).unwrap();
        assert!(recycled.index() < 2);
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_compact_preserves_live_entities() {
        let mut registry = Registry::new(world_catalog());
        let keep = registry.create((Position { x: 7.0, y: 8.0 },)).unwrap();
        let discard = registry.create((Position::default(),)).unwrap();
        registry.destroy(discard).unwrap();

        registry.compact();

        assert_eq!(registry.size(), 1);
        assert_eq!(registry.get::<Position>(keep), Some(&Position { x: 7.0, y: 8.0 }));
    }
}
