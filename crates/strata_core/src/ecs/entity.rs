//! # Entity Handles
//!
//! Entities are lightweight identifiers consisting of:
//! - An index, unique among live entities
//! - A generation counter that detects stale handles after index reuse
//!
//! The allocator recycles freed indices before minting new ones, so id
//! growth stays bounded under create/destroy churn. Recycling bumps the
//! slot's generation, which invalidates every handle that referenced the
//! previous occupant.

use std::fmt;

use super::error::{EcsError, EcsResult};

/// Unique identifier for an entity.
///
/// The handle is opaque to callers. Internally it packs:
/// - Lower 32 bits: index into the allocator's slot table
/// - Upper 32 bits: generation counter for detecting stale handles
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}:{})", self.index(), self.generation())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}:{})", self.index(), self.generation())
    }
}

/// Mints and recycles entity handles.
///
/// The allocator is a counter plus a free list. [`EntityAllocator::allocate`]
/// prefers the free list, reissuing a freed index under its next
/// generation; only when no index is recyclable does it mint a fresh one.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Current generation of every index ever minted.
    generations: Vec<u32>,
    /// Indices available for reuse.
    free: Vec<u32>,
}

impl EntityAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a unique live handle.
    ///
    /// Recycled indices are preferred over fresh ones. Fails only when the
    /// 32-bit index space is exhausted.
    pub fn allocate(&mut self) -> EcsResult<Entity> {
        if let Some(index) = self.free.pop() {
            return Ok(Entity::new(index, self.generations[index as usize]));
        }

        let index =
            u32::try_from(self.generations.len()).map_err(|_| EcsError::IdSpaceExhausted)?;
        self.generations.push(0);
        Ok(Entity::new(index, 0))
    }

    /// Returns a handle's index to the free list for future reuse.
    ///
    /// Bumps the slot's generation so the freed handle, and any copy of
    /// it, no longer matches the slot.
    pub fn free(&mut self, entity: Entity) {
        let slot = entity.index() as usize;
        debug_assert!(slot < self.generations.len(), "freeing an unminted index");
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(entity.index());
    }

    /// Number of indices minted so far, recycled or not.
    #[must_use]
    pub fn minted(&self) -> usize {
        self.generations.len()
    }

    /// Number of indices currently available for reuse.
    #[must_use]
    pub fn recyclable(&self) -> usize {
        self.free.len()
    }

    /// Shrinks the free list's backing storage to fit.
    pub fn shrink_to_fit(&mut self) {
        self.free.shrink_to_fit();
    }
}
