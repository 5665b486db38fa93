//! Entity handles and id allocation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Default live-entity ceiling, matching the world's default config.
pub const MAX_ENTITIES: usize = 5000;

/// Opaque entity handle: a small index plus a generation counter.
///
/// Indices are recycled, generations are not: every reuse of an index bumps
/// the slot's generation, so a handle kept across a kill/sweep cycle stops
/// matching and is rejected as stale instead of silently aliasing whichever
/// newer entity inherited the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Issues and recycles entity indices.
///
/// The free pool is a stack: the most recently freed index is handed out
/// first. `free` only accepts a currently-live handle, so sweeping the same
/// entity twice cannot push a duplicate index into the pool.
pub struct EntityAllocator {
    max_entities: usize,
    next_index: u32,
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
    live_count: usize,
}

impl EntityAllocator {
    pub fn new(max_entities: usize) -> Self {
        Self {
            max_entities,
            next_index: 0,
            generations: Vec::new(),
            live: Vec::new(),
            free: Vec::new(),
            live_count: 0,
        }
    }

    pub fn allocate(&mut self) -> EcsResult<Entity> {
        if self.live_count >= self.max_entities {
            return Err(EcsError::CapacityExceeded {
                max: self.max_entities,
            });
        }
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.next_index;
                self.next_index += 1;
                self.generations.push(0);
                self.live.push(false);
                index
            }
        };
        self.live[index as usize] = true;
        self.live_count += 1;
        Ok(Entity::new(index, self.generations[index as usize]))
    }

    /// Returns the handle's index to the free pool. A dead or stale handle is
    /// a no-op, which makes a redundant second free harmless.
    pub fn free(&mut self, entity: Entity) {
        if !self.is_live(entity) {
            return;
        }
        let index = entity.index();
        self.live[index] = false;
        self.generations[index] += 1;
        self.free.push(index as u32);
        self.live_count -= 1;
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        let index = entity.index();
        index < self.live.len()
            && self.live[index]
            && self.generations[index] == entity.generation()
    }

    /// Current handle for a live index, if any.
    pub fn handle(&self, index: usize) -> Option<Entity> {
        if index < self.live.len() && self.live[index] {
            Some(Entity::new(index as u32, self.generations[index]))
        } else {
            None
        }
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn max_entities(&self) -> usize {
        self.max_entities
    }

    /// One past the highest index ever allocated.
    pub fn index_bound(&self) -> usize {
        self.next_index as usize
    }
}
