//! # Component Contract
//!
//! Components are plain data values attached to entities and stored
//! column-wise inside archetype tables.
//!
//! A component type must be default-constructible ([`Default`]), copyable
//! ([`Clone`]), and free of borrows (`'static`). Those capabilities are the
//! component validity rules of this engine: a type that lacks one does not
//! implement [`Component`], and any request naming it is rejected by the
//! compiler rather than at runtime.
//!
//! [`ComponentSet`] lifts the contract to literal tuples of components,
//! which is how call sites name an archetype or a query. Tuples of up to
//! eight components are supported.

use std::any::{Any, TypeId};

use super::entity::Entity;
use super::signature::Signature;
use super::table::Table;

/// Marker trait for component types.
///
/// Blanket-implemented: any `Default + Clone + Send + Sync + 'static` value
/// type is a component. There is nothing to derive or register per type;
/// identity is the Rust type itself.
pub trait Component: Default + Clone + Send + Sync + 'static {}

impl<T: Default + Clone + Send + Sync + 'static> Component for T {}

/// Identity of a component type.
///
/// Wraps [`TypeId`] with a total order so signatures can be kept sorted,
/// making set equality independent of declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(TypeId);

impl ComponentTypeId {
    /// Returns the identity of component type `C`.
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self(TypeId::of::<C>())
    }
}

/// Type-erased storage behind one table column: a `Vec<C>` for some
/// component type `C`.
pub(crate) type ColumnData = dyn Any + Send + Sync;

/// Monomorphized column operations for one component type.
///
/// A descriptor lets a table manipulate a column without naming the
/// component type: every function pointer was compiled for the concrete
/// `Vec<C>` and downcasts exactly once per call. Row removal and migration
/// go through these, so the table itself never branches on type identity.
#[derive(Debug, Clone, Copy)]
pub struct ComponentDescriptor {
    type_id: ComponentTypeId,
    name: &'static str,
    new_column: fn() -> Box<ColumnData>,
    swap_remove: fn(&mut ColumnData, usize),
    push_default: fn(&mut ColumnData),
    clone_row_into: fn(&ColumnData, usize, &mut ColumnData),
    len: fn(&ColumnData) -> usize,
    shrink_to_fit: fn(&mut ColumnData),
    clear: fn(&mut ColumnData),
}

impl ComponentDescriptor {
    /// Builds the descriptor for component type `C`.
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: ComponentTypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            new_column: || Box::new(Vec::<C>::new()),
            swap_remove: |data, row| {
                column_mut::<C>(data).swap_remove(row);
            },
            push_default: |data| column_mut::<C>(data).push(C::default()),
            clone_row_into: |source, row, destination| {
                let value = column_ref::<C>(source)[row].clone();
                column_mut::<C>(destination).push(value);
            },
            len: |data| column_ref::<C>(data).len(),
            shrink_to_fit: |data| column_mut::<C>(data).shrink_to_fit(),
            clear: |data| column_mut::<C>(data).clear(),
        }
    }

    /// The identity of the described component type.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// The component's type name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn new_column(&self) -> Box<ColumnData> {
        (self.new_column)()
    }

    pub(crate) fn swap_remove(&self, data: &mut ColumnData, row: usize) {
        (self.swap_remove)(data, row);
    }

    pub(crate) fn push_default(&self, data: &mut ColumnData) {
        (self.push_default)(data);
    }

    pub(crate) fn clone_row_into(
        &self,
        source: &ColumnData,
        row: usize,
        destination: &mut ColumnData,
    ) {
        (self.clone_row_into)(source, row, destination);
    }

    pub(crate) fn len(&self, data: &ColumnData) -> usize {
        (self.len)(data)
    }

    pub(crate) fn shrink_to_fit(&self, data: &mut ColumnData) {
        (self.shrink_to_fit)(data);
    }

    pub(crate) fn clear(&self, data: &mut ColumnData) {
        (self.clear)(data);
    }
}

fn column_ref<C: Component>(data: &ColumnData) -> &Vec<C> {
    data.downcast_ref::<Vec<C>>()
        .expect("column holds a different component type")
}

fn column_mut<C: Component>(data: &mut ColumnData) -> &mut Vec<C> {
    data.downcast_mut::<Vec<C>>()
        .expect("column holds a different component type")
}

/// A literal tuple of component types naming an archetype or a query.
///
/// Implemented for `()` and tuples of up to eight [`Component`]s. The set
/// produces its [`Signature`] and column descriptors, writes one row of
/// values into a table, and drives the per-row walk used by views. The walk
/// is monomorphic per table: columns are downcast to typed slices once,
/// then iterated as plain slices with no per-row branching.
pub trait ComponentSet: 'static {
    /// Mutable component references handed to view callbacks, one per
    /// component in the set.
    type Refs<'a>;

    /// The set's signature. Duplicate types are preserved so that catalog
    /// construction and query planning can reject them.
    #[must_use]
    fn signature() -> Signature;

    /// Column descriptors for each component in the set, in declaration
    /// order.
    #[must_use]
    fn descriptors() -> Vec<ComponentDescriptor>;

    /// Appends this tuple's values to the matching columns of `table`.
    ///
    /// The table's archetype must contain every component of the set; the
    /// caller guarantees this by resolving the table through the catalog.
    fn write_row(self, table: &mut Table);

    /// Walks every row of `table` in table order, passing the entity id
    /// and mutable component references to `f`.
    ///
    /// The table's archetype must be a superset of the set.
    fn for_each_row<F>(table: &mut Table, f: &mut F)
    where
        F: for<'a> FnMut(Entity, Self::Refs<'a>);
}

impl ComponentSet for () {
    type Refs<'a> = ();

    fn signature() -> Signature {
        Signature::new(Vec::new())
    }

    fn descriptors() -> Vec<ComponentDescriptor> {
        Vec::new()
    }

    fn write_row(self, _table: &mut Table) {}

    fn for_each_row<F>(table: &mut Table, f: &mut F)
    where
        F: for<'a> FnMut(Entity, Self::Refs<'a>),
    {
        for &entity in table.entities() {
            f(entity, ());
        }
    }
}

macro_rules! impl_component_set {
    ($( $component:ident => $index:tt ),+) => {
        impl<$( $component: Component ),+> ComponentSet for ($( $component, )+) {
            type Refs<'a> = ($( &'a mut $component, )+);

            fn signature() -> Signature {
                Signature::new(vec![$( ComponentTypeId::of::<$component>() ),+])
            }

            fn descriptors() -> Vec<ComponentDescriptor> {
                vec![$( ComponentDescriptor::of::<$component>() ),+]
            }

            fn write_row(self, table: &mut Table) {
                $( table.push_value::<$component>(self.$index); )+
            }

            #[allow(non_snake_case)]
            fn for_each_row<F>(table: &mut Table, f: &mut F)
            where
                F: for<'a> FnMut(Entity, Self::Refs<'a>),
            {
                $( let mut $component: Option<&mut [$component]> = None; )+

                let (entities, columns) = table.split_columns();
                for column in columns.iter_mut() {
                    let type_id = column.component_type();
                    $(
                        if type_id == ComponentTypeId::of::<$component>() {
                            $component = Some(column.as_mut_slice::<$component>());
                            continue;
                        }
                    )+
                }

                $(
                    let $component = match $component {
                        Some(slice) => slice,
                        None => unreachable!("matched table is missing a requested column"),
                    };
                )+

                for (row, &entity) in entities.iter().enumerate() {
                    f(entity, ($( &mut $component[row], )+));
                }
            }
        }
    };
}

impl_component_set!(A => 0);
impl_component_set!(A => 0, B => 1);
impl_component_set!(A => 0, B => 1, C => 2);
impl_component_set!(A => 0, B => 1, C => 2, D => 3);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4, G => 5);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4, G => 5, H => 6);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4, G => 5, H => 6, I => 7);

/// Human-readable list of the component type names in a set, for error
/// reporting.
pub(crate) fn set_name<S: ComponentSet>() -> String {
    let descriptors = S::descriptors();
    if descriptors.is_empty() {
        return "(empty)".to_owned();
    }
    let mut names = String::new();
    for (position, descriptor) in descriptors.iter().enumerate() {
        if position > 0 {
            names.push_str(", ");
        }
        names.push_str(descriptor.name());
    }
    names
}
