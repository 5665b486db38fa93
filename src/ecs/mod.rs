//! Entity-component storage engine.
//!
//! Dense per-type stores with signature-based membership, generational entity
//! handles, and deferred entity destruction.

pub mod component;
pub mod entity;
pub mod world;

pub use component::{Component, ComponentStore, Signature, MAX_COMPONENT_TYPES};
pub use entity::{Entity, EntityAllocator, MAX_ENTITIES};
pub use world::World;
