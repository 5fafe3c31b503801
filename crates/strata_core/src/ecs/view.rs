//! # Views
//!
//! A view is the query surface of the registry: every table whose
//! archetype contains all of the requested components, selected once at
//! construction. Iteration walks the matched tables in catalog order and
//! their rows in table order, with no per-row filtering.
//!
//! The view holds the registry's exclusive borrow for its whole lifetime,
//! so creating or destroying entities while a view is alive does not
//! compile. That is the engine's iteration contract: row sets are frozen
//! for as long as the view exists.

use std::marker::PhantomData;

use super::component::ComponentSet;
use super::entity::Entity;
use super::registry::Registry;

/// An iterable selection of every table whose archetype contains all of
/// `S`. Built by [`Registry::view`].
pub struct View<'r, S: ComponentSet> {
    registry: &'r mut Registry,
    tables: Vec<usize>,
    _set: PhantomData<S>,
}

impl<'r, S: ComponentSet> View<'r, S> {
    pub(crate) fn new(registry: &'r mut Registry, tables: Vec<usize>) -> Self {
        Self {
            registry,
            tables,
            _set: PhantomData,
        }
    }

    /// Invokes `f` once per entity in the view, passing the entity id and
    /// mutable references to its `S` components.
    ///
    /// Visitation order is matched-table order, then row order within each
    /// table. Every qualifying entity is visited exactly once.
    pub fn each<F>(&mut self, mut f: F)
    where
        F: for<'a> FnMut(Entity, S::Refs<'a>),
    {
        for &table in &self.tables {
            S::for_each_row(self.registry.table_mut(table), &mut f);
        }
    }

    /// Number of entities the view covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables
            .iter()
            .map(|&table| self.registry.table(table).len())
            .sum()
    }

    /// Whether the view covers no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the entity is one of those the view covers.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.registry
            .location(entity)
            .is_some_and(|location| self.tables.contains(&location.table))
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::error::EcsError;
    use crate::ecs::registry::{CatalogBuilder, Registry};

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

    fn registry() -> Registry {
        Registry::new(
            CatalogBuilder::new()
                .archetype::<()>()
                .archetype::<(Position,)>()
                .archetype::<(Position, Velocity)>()
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_view_visits_supersets_once_each() {
        let mut registry = registry();
        let bare = registry.create((Position { x: 1.0, y: 0.0 },)).unwrap();
        let moving = registry
            .create((Position { x: 2.0, y: 0.0 }, Velocity::default()))
            .unwrap();
        registry.create(()).unwrap();

        let mut visited = Vec::new();
        registry
            .view::<(Position,)>()
            .unwrap()
            .each(|entity, (position,)| {
                visited.push((entity, *position));
            });

        assert_eq!(visited.len(), 2);
        assert!(visited.contains(&(bare, Position { x: 1.0, y: 0.0 })));
        assert!(visited.contains(&(moving, Position { x: 2.0, y: 0.0 })));
    }

    #[test]
    fn test_view_mutations_persist() {
        let mut registry = registry();
        let entity = registry
            .create((Position::default(), Velocity { x: 1.5, y: -0.5 }))
            .unwrap();

        registry
            .view::<(Position, Velocity)>()
            .unwrap()
            .each(|_, (position, velocity)| {
                position.x += velocity.x;
                position.y += velocity.y;
            });

        assert_eq!(
            registry.get::<Position>(entity),
            Some(&Position { x: 1.5, y: -0.5 })
        );
    }

    #[test]
    fn test_empty_set_view_visits_every_entity() {
        let mut registry = registry();
        registry.create(()).unwrap();
        registry.create((Position::default(),)).unwrap();
        registry
            .create((Position::default(), Velocity::default()))
            .unwrap();

        let mut count = 0;
        registry.view::<()>().unwrap().each(|_, ()| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_view_len_and_contains() {
        let mut registry = registry();
        let tracked = registry.create((Position::default(),)).unwrap();
        let untracked = registry.create(()).unwrap();

        let view = registry.view::<(Position,)>().unwrap();
        assert_eq!(view.len(), 1);
        assert!(!view.is_empty());
        assert!(view.contains(tracked));
        assert!(!view.contains(untracked));
    }

    #[test]
    fn test_view_rejects_unmatched_set() {
        let mut registry = registry();
        let result = registry.view::<(Color,)>();
        assert!(matches!(result, Err(EcsError::NoMatchingArchetype { .. })));
    }

    #[test]
    fn test_view_rejects_duplicate_component_request() {
        let mut registry = registry();
        let result = registry.view::<(Position, Position)>();
        assert!(matches!(result, Err(EcsError::DuplicateComponent { .. })));
    }

    #[test]
    fn test_mixed_catalog_destroy_leaves_other_views_intact() {
        let mut registry = Registry::new(
            CatalogBuilder::new()
                .archetype::<(Position,)>()
                .archetype::<(Velocity,)>()
                .build()
                .unwrap(),
        );
        let positioned = registry.create((Position::default(),)).unwrap();
        registry.create((Velocity::default(),)).unwrap();

        registry.destroy(positioned).unwrap();

        assert_eq!(registry.size(), 1);
        assert_eq!(registry.view::<(Position,)>().unwrap().len(), 0);
        assert_eq!(registry.view::<(Velocity,)>().unwrap().len(), 1);
    }

    #[test]
    fn test_scenario_mixed_archetype_counts() {
        // Catalog {∅, {Position}}: three empty entities, two positioned.
        let mut registry = Registry::new(
            CatalogBuilder::new()
                .archetype::<()>()
                .archetype::<(Position,)>()
                .build()
                .unwrap(),
        );
        let mut empties = Vec::new();
        for _ in 0..3 {
            empties.push(registry.create(()).unwrap());
        }
        for _ in 0..2 {
            registry.create((Position::default(),)).unwrap();
        }

        assert_eq!(registry.size(), 5);
        assert_eq!(registry.view::<(Position,)>().unwrap().len(), 2);

        registry.destroy(empties[0]).unwrap();
        assert_eq!(registry.size(), 4);
        assert_eq!(registry.view::<(Position,)>().unwrap().len(), 2);
    }
}
