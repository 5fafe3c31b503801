//! # Type-Set Algebra
//!
//! Pure set operations over component signatures: membership, subset
//! testing, order-independent equality, uniqueness, exact-match search and
//! superset filtering. This is the query planner of the engine — every
//! archetype resolution and view selection is one of these operations, and
//! none of them touches storage.
//!
//! A [`Signature`] keeps its type ids sorted, so order-independent set
//! equality is plain `==` and membership is a binary search. Two archetypes
//! declared as `(A, B)` and `(B, A)` produce the same signature.

use super::component::ComponentTypeId;

/// An order-independent collection of component type ids.
///
/// Construction sorts the ids but deliberately keeps duplicates, so that
/// [`Signature::is_set`] can reject component sets that name the same type
/// twice instead of silently collapsing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    types: Box<[ComponentTypeId]>,
}

impl Signature {
    /// Builds a signature from type ids given in any order.
    #[must_use]
    pub fn new(mut types: Vec<ComponentTypeId>) -> Self {
        types.sort_unstable();
        Self {
            types: types.into_boxed_slice(),
        }
    }

    /// Number of component types in the signature.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the signature names no component types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.types.binary_search(&id).is_ok()
    }

    /// Subset test: does this signature contain every type of `other`?
    ///
    /// Every signature contains the empty signature.
    #[must_use]
    pub fn contains_all(&self, other: &Signature) -> bool {
        other.types.iter().all(|&id| self.contains(id))
    }

    /// Whether the signature is a true set — no component type appears
    /// more than once.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.types.windows(2).all(|pair| pair[0] != pair[1])
    }

    /// The sorted type ids.
    #[must_use]
    pub fn types(&self) -> &[ComponentTypeId] {
        &self.types
    }
}

/// Exact-match search: the index of the one signature in `catalog` that is
/// set-equal to `target`, or `None` when no archetype matches.
#[must_use]
pub fn find_exact(catalog: &[Signature], target: &Signature) -> Option<usize> {
    catalog.iter().position(|signature| signature == target)
}

/// Superset filter: indices of every signature in `catalog` that contains
/// all of `target`'s types.
///
/// Exact-arity matches are ordered first, so a caller that knows its
/// request names a full archetype can stop at the first result.
#[must_use]
pub fn filter_superset(catalog: &[Signature], target: &Signature) -> Vec<usize> {
    let mut matches = Vec::new();
    let mut wider = Vec::new();

    for (index, signature) in catalog.iter().enumerate() {
        if signature.contains_all(target) {
            if signature.len() == target.len() {
                matches.push(index);
            } else {
                wider.push(index);
            }
        }
    }

    matches.extend(wider);
    matches
}

/// Uniqueness over a collection: no two signatures are set-equal.
#[must_use]
pub fn all_distinct(catalog: &[Signature]) -> bool {
    catalog
        .iter()
        .enumerate()
        .all(|(index, signature)| catalog[index + 1..].iter().all(|other| signature != other))
}
