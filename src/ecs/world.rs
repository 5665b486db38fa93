//! World: the central container for entities, components, tags, and the
//! deferred-destruction queue.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

use super::component::{Component, ComponentStore, ErasedStore, Signature, MAX_COMPONENT_TYPES};
use super::entity::{Entity, EntityAllocator};

pub struct World {
    allocator: EntityAllocator,
    stores: HashMap<TypeId, Box<dyn ErasedStore>>,
    signatures: Vec<Signature>,
    tags: Vec<Option<String>>,
    kill_queue: Vec<Entity>,
    registered_types: u32,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    pub fn with_config(config: &WorldConfig) -> Self {
        Self {
            allocator: EntityAllocator::new(config.max_entities),
            stores: HashMap::new(),
            signatures: Vec::new(),
            tags: Vec::new(),
            kill_queue: Vec::new(),
            registered_types: 0,
        }
    }

    // ── Component type registry ──────────────────────────────────────────

    /// Registers `T` and assigns it the next free signature bit. Registering
    /// the same type again returns the existing bit.
    pub fn register_component<T: Component>(&mut self) -> EcsResult<Signature> {
        let type_id = TypeId::of::<T>();
        if let Some(store) = self.stores.get(&type_id) {
            return Ok(store.signature());
        }
        if self.registered_types as usize >= MAX_COMPONENT_TYPES {
            return Err(EcsError::TooManyComponentTypes {
                max: MAX_COMPONENT_TYPES,
            });
        }
        let signature = Signature::nth_bit(self.registered_types);
        self.registered_types += 1;
        self.stores
            .insert(type_id, Box::new(ComponentStore::<T>::new(signature)));
        Ok(signature)
    }

    /// The signature bit assigned to `T` at registration.
    pub fn signature_of<T: Component>(&self) -> EcsResult<Signature> {
        self.stores
            .get(&TypeId::of::<T>())
            .map(|store| store.signature())
            .ok_or(EcsError::UnregisteredComponent {
                type_name: type_name::<T>(),
            })
    }

    pub fn component_type_count(&self) -> usize {
        self.registered_types as usize
    }

    // ── Entity lifecycle ─────────────────────────────────────────────────

    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.allocator.allocate()?;
        let index = entity.index();
        if index >= self.signatures.len() {
            self.signatures.resize(index + 1, Signature::EMPTY);
            self.tags.resize(index + 1, None);
        }
        self.signatures[index] = Signature::EMPTY;
        Ok(entity)
    }

    pub fn create_entity_with_tag(&mut self, tag: impl Into<String>) -> EcsResult<Entity> {
        let entity = self.create_entity()?;
        self.tags[entity.index()] = Some(tag.into());
        Ok(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.allocator.live_count()
    }

    /// Enqueues the entity for destruction at the next sweep. Idempotent:
    /// dead handles and repeat kills are ignored.
    pub fn kill(&mut self, entity: Entity) {
        if self.allocator.is_live(entity) && !self.kill_queue.contains(&entity) {
            self.kill_queue.push(entity);
        }
    }

    pub fn pending_kills(&self) -> usize {
        self.kill_queue.len()
    }

    /// Destroys every queued entity: removes its components from each store
    /// whose bit its signature carries, zeroes the signature, clears the tag,
    /// and returns the index to the free pool. Run once per frame, at the
    /// start of PreUpdate, so no system observes a half-destroyed entity.
    pub fn sweep(&mut self) {
        let queue = std::mem::take(&mut self.kill_queue);
        for entity in queue {
            if !self.allocator.is_live(entity) {
                continue;
            }
            let index = entity.index();
            let signature = self.signatures[index];
            for store in self.stores.values_mut() {
                if signature.contains(store.signature()) {
                    store.remove_entity(entity);
                }
            }
            self.signatures[index] = Signature::EMPTY;
            self.tags[index] = None;
            self.allocator.free(entity);
        }
    }

    // ── Component attach / access ────────────────────────────────────────

    /// Attaches a value of `T` to the entity and sets the store's bit in the
    /// entity's signature. A second attach of the same type fails with
    /// `DuplicateComponent`; there is no implicit upsert.
    pub fn attach<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        if !self.allocator.is_live(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        let signature = {
            let store = self.typed_store_mut::<T>()?;
            if !store.insert(entity, value) {
                return Err(EcsError::DuplicateComponent {
                    entity,
                    type_name: type_name::<T>(),
                });
            }
            store.signature()
        };
        self.signatures[entity.index()].insert(signature);
        Ok(())
    }

    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        if !self.allocator.is_live(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        self.typed_store::<T>()?
            .get(entity)
            .ok_or(EcsError::ComponentNotFound {
                entity,
                type_name: type_name::<T>(),
            })
    }

    /// Mutable component access. The reference is scoped to this borrow of
    /// the world, so it cannot outlive a structural mutation of the store.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        if !self.allocator.is_live(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        self.typed_store_mut::<T>()?
            .get_mut(entity)
            .ok_or(EcsError::ComponentNotFound {
                entity,
                type_name: type_name::<T>(),
            })
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.typed_store::<T>()
            .map(|store| store.contains(entity))
            .unwrap_or(false)
    }

    /// Swap-removes the entity's `T` and clears the bit. Removing a component
    /// the entity does not own is a no-op.
    pub fn detach<T: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        if !self.allocator.is_live(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        let signature = {
            let store = self.typed_store_mut::<T>()?;
            if store.remove(entity).is_none() {
                return Ok(());
            }
            store.signature()
        };
        self.signatures[entity.index()].remove(signature);
        Ok(())
    }

    /// Direct access to a type's store, for dense iteration.
    pub fn store<T: Component>(&self) -> EcsResult<&ComponentStore<T>> {
        self.typed_store()
    }

    pub fn store_mut<T: Component>(&mut self) -> EcsResult<&mut ComponentStore<T>> {
        self.typed_store_mut()
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn signature(&self, entity: Entity) -> Signature {
        if self.allocator.is_live(entity) {
            self.signatures[entity.index()]
        } else {
            Signature::EMPTY
        }
    }

    /// Every live entity whose signature is a superset of `mask`, in
    /// increasing index order.
    pub fn query(&self, mask: Signature) -> Vec<Entity> {
        let mut matches = Vec::new();
        for index in 0..self.allocator.index_bound() {
            if let Some(entity) = self.allocator.handle(index) {
                if self.signatures[index].contains(mask) {
                    matches.push(entity);
                }
            }
        }
        matches
    }

    pub fn tag(&self, entity: Entity) -> Option<&str> {
        if !self.allocator.is_live(entity) {
            return None;
        }
        self.tags[entity.index()].as_deref()
    }

    /// First live entity carrying exactly this tag. Linear scan by design;
    /// tags are for identity lookups, not bulk iteration.
    pub fn find_by_tag(&self, tag: &str) -> Option<Entity> {
        self.find_tagged(std::slice::from_ref(&tag)).into_iter().next()
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Entity> {
        self.find_tagged(std::slice::from_ref(&tag))
    }

    /// Every live entity whose tag matches any member of `tags`, in
    /// increasing index order.
    pub fn find_tagged<S: AsRef<str>>(&self, tags: &[S]) -> Vec<Entity> {
        let mut matches = Vec::new();
        for index in 0..self.allocator.index_bound() {
            let Some(entity) = self.allocator.handle(index) else {
                continue;
            };
            let Some(tag) = self.tags[index].as_deref() else {
                continue;
            };
            if tags.iter().any(|candidate| candidate.as_ref() == tag) {
                matches.push(entity);
            }
        }
        matches
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn typed_store<T: Component>(&self) -> EcsResult<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<ComponentStore<T>>())
            .ok_or(EcsError::UnregisteredComponent {
                type_name: type_name::<T>(),
            })
    }

    fn typed_store_mut<T: Component>(&mut self) -> EcsResult<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
            .ok_or(EcsError::UnregisteredComponent {
                type_name: type_name::<T>(),
            })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Debug, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    fn world_with_types() -> World {
        let mut world = World::new();
        world.register_component::<Position>().unwrap();
        world.register_component::<Velocity>().unwrap();
        world
    }

    #[test]
    fn registration_assigns_sequential_bits() {
        let world = world_with_types();
        assert_eq!(world.signature_of::<Position>().unwrap().bits(), 0b01);
        assert_eq!(world.signature_of::<Velocity>().unwrap().bits(), 0b10);
        assert_eq!(world.component_type_count(), 2);
    }

    #[test]
    fn re_registration_is_idempotent() {
        let mut world = world_with_types();
        let bit = world.register_component::<Position>().unwrap();
        assert_eq!(bit, world.signature_of::<Position>().unwrap());
        assert_eq!(world.component_type_count(), 2);
    }

    #[test]
    fn attach_sets_signature_bits() {
        let mut world = world_with_types();
        let entity = world.create_entity().unwrap();
        world.attach(entity, Position { x: 1.0, y: 2.0 }).unwrap();
        world.attach(entity, Velocity { dx: 0.0, dy: 0.0 }).unwrap();

        let expected = world.signature_of::<Position>().unwrap()
            | world.signature_of::<Velocity>().unwrap();
        assert_eq!(world.signature(entity), expected);
        assert_eq!(world.get::<Position>(entity).unwrap(), &Position { x: 1.0, y: 2.0 });
    }

    #[test]
    fn double_attach_fails() {
        let mut world = world_with_types();
        let entity = world.create_entity().unwrap();
        world.attach(entity, Position { x: 0.0, y: 0.0 }).unwrap();
        let err = world
            .attach(entity, Position { x: 9.0, y: 9.0 })
            .unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        // The original value survives the failed attach.
        assert_eq!(
            world.get::<Position>(entity).unwrap(),
            &Position { x: 0.0, y: 0.0 }
        );
    }

    #[test]
    fn get_missing_component_fails() {
        let mut world = world_with_types();
        let entity = world.create_entity().unwrap();
        let err = world.get::<Position>(entity).unwrap_err();
        assert!(matches!(err, EcsError::ComponentNotFound { .. }));
    }

    #[test]
    fn detach_clears_bit_and_tolerates_absence() {
        let mut world = world_with_types();
        let entity = world.create_entity().unwrap();
        world.attach(entity, Position { x: 0.0, y: 0.0 }).unwrap();
        world.detach::<Position>(entity).unwrap();
        assert!(world.signature(entity).is_empty());
        // Second detach: signature bit already clear, still Ok.
        world.detach::<Position>(entity).unwrap();
    }

    #[test]
    fn kill_and_sweep_fully_destroy_the_entity() {
        let mut world = world_with_types();
        let entity = world.create_entity_with_tag("Player").unwrap();
        world.attach(entity, Position { x: 0.0, y: 0.0 }).unwrap();
        world.attach(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();

        world.kill(entity);
        world.kill(entity); // deduped
        assert_eq!(world.pending_kills(), 1);
        // Destruction is deferred until the sweep.
        assert!(world.is_alive(entity));

        world.sweep();
        assert!(!world.is_alive(entity));
        assert!(world.signature(entity).is_empty());
        assert_eq!(world.find_by_tag("Player"), None);
        assert_eq!(world.store::<Position>().unwrap().len(), 0);
        assert_eq!(world.store::<Velocity>().unwrap().len(), 0);
        assert_eq!(world.pending_kills(), 0);

        // The freed index is recycled with a new generation.
        let next = world.create_entity().unwrap();
        assert_eq!(next.index(), entity.index());
        assert_eq!(next.generation(), entity.generation() + 1);
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut world = world_with_types();
        let entity = world.create_entity().unwrap();
        world.attach(entity, Position { x: 0.0, y: 0.0 }).unwrap();
        world.kill(entity);
        world.sweep();
        let recycled = world.create_entity().unwrap();
        world
            .attach(recycled, Position { x: 5.0, y: 5.0 })
            .unwrap();

        assert!(matches!(
            world.get::<Position>(entity),
            Err(EcsError::StaleEntity { .. })
        ));
        assert!(matches!(
            world.attach(entity, Velocity { dx: 0.0, dy: 0.0 }),
            Err(EcsError::StaleEntity { .. })
        ));
        // The recycled occupant is untouched.
        assert_eq!(
            world.get::<Position>(recycled).unwrap(),
            &Position { x: 5.0, y: 5.0 }
        );
    }

    #[test]
    fn query_matches_signature_supersets() {
        let mut world = world_with_types();
        let both = world.create_entity().unwrap();
        world.attach(both, Position { x: 0.0, y: 0.0 }).unwrap();
        world.attach(both, Velocity { dx: 0.0, dy: 0.0 }).unwrap();
        let pos_only = world.create_entity().unwrap();
        world.attach(pos_only, Position { x: 0.0, y: 0.0 }).unwrap();
        let bare = world.create_entity().unwrap();

        let pos_mask = world.signature_of::<Position>().unwrap();
        let both_mask = pos_mask | world.signature_of::<Velocity>().unwrap();

        assert_eq!(world.query(pos_mask), vec![both, pos_only]);
        assert_eq!(world.query(both_mask), vec![both]);
        assert_eq!(world.query(Signature::EMPTY), vec![both, pos_only, bare]);
    }

    #[test]
    fn tag_lookup_finds_first_and_all() {
        let mut world = world_with_types();
        let a = world.create_entity_with_tag("Enemy").unwrap();
        let _untagged = world.create_entity().unwrap();
        let b = world.create_entity_with_tag("Enemy").unwrap();
        let c = world.create_entity_with_tag("Player").unwrap();

        assert_eq!(world.find_by_tag("Enemy"), Some(a));
        assert_eq!(world.find_all_by_tag("Enemy"), vec![a, b]);
        assert_eq!(world.find_tagged(&["Player", "Enemy"]), vec![a, b, c]);
        assert_eq!(world.find_by_tag("Boss"), None);
    }

    #[test]
    fn component_type_limit_is_enforced() {
        macro_rules! marker {
            ($name:ident) => {
                struct $name;
                impl Component for $name {}
            };
        }
        marker!(C00); marker!(C01); marker!(C02); marker!(C03);
        marker!(C04); marker!(C05); marker!(C06); marker!(C07);
        marker!(C08); marker!(C09); marker!(C10); marker!(C11);
        marker!(C12); marker!(C13); marker!(C14); marker!(C15);
        marker!(C16); marker!(C17); marker!(C18); marker!(C19);
        marker!(C20); marker!(C21); marker!(C22); marker!(C23);
        marker!(C24); marker!(C25); marker!(C26); marker!(C27);
        marker!(C28); marker!(C29); marker!(C30); marker!(C31);
        marker!(C32);

        let mut world = World::new();
        world.register_component::<C00>().unwrap();
        world.register_component::<C01>().unwrap();
        world.register_component::<C02>().unwrap();
        world.register_component::<C03>().unwrap();
        world.register_component::<C04>().unwrap();
        world.register_component::<C05>().unwrap();
        world.register_component::<C06>().unwrap();
        world.register_component::<C07>().unwrap();
        world.register_component::<C08>().unwrap();
        world.register_component::<C09>().unwrap();
        world.register_component::<C10>().unwrap();
        world.register_component::<C11>().unwrap();
        world.register_component::<C12>().unwrap();
        world.register_component::<C13>().unwrap();
        world.register_component::<C14>().unwrap();
        world.register_component::<C15>().unwrap();
        world.register_component::<C16>().unwrap();
        world.register_component::<C17>().unwrap();
        world.register_component::<C18>().unwrap();
        world.register_component::<C19>().unwrap();
        world.register_component::<C20>().unwrap();
        world.register_component::<C21>().unwrap();
        world.register_component::<C22>().unwrap();
        world.register_component::<C23>().unwrap();
        world.register_component::<C24>().unwrap();
        world.register_component::<C25>().unwrap();
        world.register_component::<C26>().unwrap();
        world.register_component::<C27>().unwrap();
        world.register_component::<C28>().unwrap();
        world.register_component::<C29>().unwrap();
        world.register_component::<C30>().unwrap();
        world.register_component::<C31>().unwrap();
        assert_eq!(
            world.register_component::<C32>(),
            Err(EcsError::TooManyComponentTypes { max: 32 })
        );
    }

    #[test]
    fn world_capacity_is_enforced() {
        let mut world = World::with_config(&WorldConfig { max_entities: 2 });
        world.create_entity().unwrap();
        world.create_entity().unwrap();
        assert_eq!(
            world.create_entity(),
            Err(EcsError::CapacityExceeded { max: 2 })
        );
    }
}
