//! # Archetype Tables
//!
//! Dense columnar storage for all entities sharing one archetype.
//!
//! ```text
//! Archetype {Position, Velocity}:
//! entities:  [e4, e9, e2, ...]
//! Position:  [P0, P1, P2, ...]
//! Velocity:  [V0, V1, V2, ...]
//! ```
//!
//! Every column is index-aligned with the entity column and always the same
//! length. Row order is insertion order until a removal: removal moves the
//! last row into the vacated slot (swap-remove), keeping storage dense at
//! O(arity) per removal regardless of table size, at the price of unstable
//! row order.
//!
//! Columns are type-erased (`Vec<C>` behind `dyn Any`) and manipulated
//! through [`ComponentDescriptor`] function pointers, so the table never
//! branches on type identity. Typed access downcasts once per table, never
//! per row.

use super::component::{ColumnData, Component, ComponentDescriptor, ComponentSet, ComponentTypeId};
use super::entity::Entity;
use super::signature::Signature;

/// One component column: a `Vec<C>` plus the descriptor that knows how to
/// operate on it.
pub struct Column {
    descriptor: ComponentDescriptor,
    data: Box<ColumnData>,
}

impl Column {
    fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            data: descriptor.new_column(),
            descriptor,
        }
    }

    /// The component type stored in this column.
    #[must_use]
    pub fn component_type(&self) -> ComponentTypeId {
        self.descriptor.type_id()
    }

    /// Number of component values stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptor.len(&*self.data)
    }

    /// Whether the column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn as_slice<C: Component>(&self) -> &[C] {
        self.data
            .downcast_ref::<Vec<C>>()
            .expect("column holds a different component type")
    }

    pub(crate) fn as_mut_slice<C: Component>(&mut self) -> &mut [C] {
        self.data
            .downcast_mut::<Vec<C>>()
            .expect("column holds a different component type")
    }

    fn push<C: Component>(&mut self, value: C) {
        self.data
            .downcast_mut::<Vec<C>>()
            .expect("column holds a different component type")
            .push(value);
    }

    fn swap_remove(&mut self, row: usize) {
        self.descriptor.swap_remove(&mut *self.data, row);
    }
}

/// Dense storage for all entities of one archetype.
pub struct Table {
    signature: Signature,
    entities: Vec<Entity>,
    columns: Vec<Column>,
}

impl Table {
    pub(crate) fn new(signature: Signature, descriptors: &[ComponentDescriptor]) -> Self {
        debug_assert_eq!(signature.len(), descriptors.len());
        Self {
            signature,
            entities: Vec::new(),
            columns: descriptors.iter().map(|d| Column::new(*d)).collect(),
        }
    }

    /// The archetype this table stores.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Number of rows (live entities) in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The entity id at `row`, if in bounds.
    #[must_use]
    pub fn entity_at(&self, row: usize) -> Option<Entity> {
        self.entities.get(row).copied()
    }

    /// All entity ids, in table order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The full column for component `C`, or `None` when the archetype
    /// does not contain `C`.
    #[must_use]
    pub fn column<C: Component>(&self) -> Option<&[C]> {
        let id = ComponentTypeId::of::<C>();
        self.columns
            .iter()
            .find(|column| column.component_type() == id)
            .map(Column::as_slice)
    }

    /// Mutable variant of [`Table::column`].
    #[must_use]
    pub fn column_mut<C: Component>(&mut self) -> Option<&mut [C]> {
        let id = ComponentTypeId::of::<C>();
        self.columns
            .iter_mut()
            .find(|column| column.component_type() == id)
            .map(Column::as_mut_slice)
    }

    /// Appends one row: the entity id plus one value per component of the
    /// archetype. Returns the new row index. O(1) amortized.
    pub(crate) fn push_row<S: ComponentSet>(&mut self, entity: Entity, values: S) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);
        values.write_row(self);
        debug_assert!(self.columns_aligned());
        row
    }

    /// Appends one component value to its column. Used by
    /// [`ComponentSet::write_row`]; the archetype must contain `C`.
    pub(crate) fn push_value<C: Component>(&mut self, value: C) {
        let id = ComponentTypeId::of::<C>();
        self.columns
            .iter_mut()
            .find(|column| column.component_type() == id)
            .expect("component does not belong to this archetype")
            .push(value);
    }

    /// Appends one row migrated from `source`: components shared with the
    /// source archetype are cloned from `source_row`, components new to
    /// this archetype are default-constructed.
    pub(crate) fn push_migrated(&mut self, source: &Table, source_row: usize, entity: Entity) {
        self.entities.push(entity);
        for column in &mut self.columns {
            let id = column.component_type();
            match source
                .columns
                .iter()
                .find(|candidate| candidate.component_type() == id)
            {
                Some(shared) => {
                    column
                        .descriptor
                        .clone_row_into(&*shared.data, source_row, &mut *column.data);
                }
                None => column.descriptor.push_default(&mut *column.data),
            }
        }
        debug_assert!(self.columns_aligned());
    }

    /// Removes `row` by moving the last row into its place.
    ///
    /// Returns the entity that was relocated into `row` so the caller can
    /// repair that entity's location, or `None` when `row` was the last
    /// row. O(arity), independent of table size.
    pub(crate) fn swap_remove(&mut self, row: usize) -> Option<Entity> {
        debug_assert!(row < self.entities.len(), "row out of bounds");
        self.entities.swap_remove(row);
        for column in &mut self.columns {
            column.swap_remove(row);
        }
        debug_assert!(self.columns_aligned());
        self.entities.get(row).copied()
    }

    /// Splits the table into its entity column and component columns, for
    /// simultaneous iteration.
    pub(crate) fn split_columns(&mut self) -> (&[Entity], &mut [Column]) {
        (&self.entities, &mut self.columns)
    }

    /// Drops every row. Column capacity is retained.
    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        for column in &mut self.columns {
            column.descriptor.clear(&mut *column.data);
        }
    }

    /// Shrinks every column's backing storage to fit.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.entities.shrink_to_fit();
        for column in &mut self.columns {
            column.descriptor.shrink_to_fit(&mut *column.data);
        }
    }

    fn columns_aligned(&self) -> bool {
        self.columns
            .iter()
            .all(|column| column.len() == self.entities.len())
    }
}
