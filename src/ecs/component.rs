//! Per-type dense component storage and signature bitmasks.

use std::any::Any;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use super::Entity;

/// At most 32 component types system-wide; one signature bit per type.
pub const MAX_COMPONENT_TYPES: usize = 32;

/// Marker trait for component data.
pub trait Component: Send + Sync + 'static {}

/// Bitmask recording which component types an entity owns.
///
/// Bit `k` is set for an entity iff the store registered with bit `k` holds a
/// slot mapped to that entity. Masks compose with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Signature(u32);

impl Signature {
    pub const EMPTY: Signature = Signature(0);

    pub(crate) fn nth_bit(position: u32) -> Self {
        Signature(1 << position)
    }

    /// True when every bit of `mask` is set in `self`.
    pub fn contains(self, mask: Signature) -> bool {
        self.0 & mask.0 == mask.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn insert(&mut self, mask: Signature) {
        self.0 |= mask.0;
    }

    pub(crate) fn remove(&mut self, mask: Signature) {
        self.0 &= !mask.0;
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for Signature {
    type Output = Signature;

    fn bitor(self, rhs: Signature) -> Signature {
        Signature(self.0 | rhs.0)
    }
}

impl BitOrAssign for Signature {
    fn bitor_assign(&mut self, rhs: Signature) {
        self.0 |= rhs.0;
    }
}

/// Dense, gap-free storage for one component type.
///
/// Values live in a growable array with no holes; two parallel index maps
/// (`entity_to_slot`, `slot_to_entity`) keep the entity↔slot bijection.
/// Removal is swap-remove: the last value relocates into the freed slot and
/// both maps are fixed up in lock-step, so every operation is O(1).
///
/// Borrowed component references are scoped by the store borrow itself, so a
/// structural mutation (insert or remove) cannot happen while a reference or
/// iterator from this store is live.
pub struct ComponentStore<T> {
    signature: Signature,
    dense: Vec<T>,
    entity_to_slot: Vec<Option<usize>>,
    slot_to_entity: Vec<Entity>,
}

impl<T: Component> ComponentStore<T> {
    pub(crate) fn new(signature: Signature) -> Self {
        Self {
            signature,
            dense: Vec::new(),
            entity_to_slot: Vec::new(),
            slot_to_entity: Vec::new(),
        }
    }

    /// The signature bit assigned to this store at registration. Fixed for
    /// the lifetime of the world.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// Appends a value and records the entity↔slot mapping. Returns `false`
    /// (and leaves the store untouched) if the entity already has a slot.
    pub(crate) fn insert(&mut self, entity: Entity, value: T) -> bool {
        let index = entity.index();
        if index >= self.entity_to_slot.len() {
            self.entity_to_slot.resize(index + 1, None);
        }
        if self.entity_to_slot[index].is_some() {
            return false;
        }
        self.entity_to_slot[index] = Some(self.dense.len());
        self.slot_to_entity.push(entity);
        self.dense.push(value);
        true
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slot_of(entity).map(|slot| &self.dense[slot])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.slot_of(entity)?;
        Some(&mut self.dense[slot])
    }

    /// Slot currently holding the entity's value, if any. Slots are stable
    /// only until the next structural mutation of this store.
    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        let slot = *self.entity_to_slot.get(entity.index())?;
        // The index may have been recycled; the slot map alone is not proof
        // that this handle still owns the value.
        slot.filter(|&s| self.slot_to_entity[s] == entity)
    }

    /// Reverse lookup: the entity whose value occupies `slot`.
    pub fn entity_of(&self, slot: usize) -> Option<Entity> {
        self.slot_to_entity.get(slot).copied()
    }

    /// Swap-removes the entity's value. Returns the value, or `None` when the
    /// entity has no slot here (a no-op, not an error).
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.slot_of(entity)?;
        self.entity_to_slot[entity.index()] = None;
        let value = self.dense.swap_remove(slot);
        self.slot_to_entity.swap_remove(slot);
        if slot < self.dense.len() {
            let relocated = self.slot_to_entity[slot];
            self.entity_to_slot[relocated.index()] = Some(slot);
        }
        Some(value)
    }

    /// All live values in dense (slot) order, paired with their owners.
    /// Fresh iterator per call; the borrow rules forbid mutating the store
    /// while it is running.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.slot_to_entity.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.slot_to_entity
            .iter()
            .copied()
            .zip(self.dense.iter_mut())
    }
}

/// Object-safe face of a store, used by the world for signature-driven
/// removal during the destruction sweep.
pub(crate) trait ErasedStore: Send + Sync {
    fn signature(&self) -> Signature;
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn signature(&self) -> Signature {
        self.signature
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
