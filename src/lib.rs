//! Minimal entity-component-system runtime with a narrow-phase convex
//! collision engine, built to drive per-frame simulation in a real-time
//! interactive loop.
//!
//! The ECS side provides generational entity handles, dense per-type
//! component stores with signature-based membership, mask and tag queries,
//! phase-ordered system scheduling, and deferred entity destruction. The
//! collision side provides GJK intersection tests with EPA penetration
//! recovery for convex polygons and circles. Windowing, input, and rendering
//! are external collaborators: systems receive elapsed time through the
//! scheduler's frame context and call out to whatever draw layer hosts them.

pub mod collision;
pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod scheduler;

pub use collision::{epa_penetration, gjk_intersect, NarrowPhase, NarrowPhaseStats, Shape};
pub use components::{Collider, Transform};
pub use config::{CollisionConfig, RuntimeConfig, WorldConfig};
pub use ecs::{Component, ComponentStore, Entity, Signature, World};
pub use error::{EcsError, EcsResult, ShapeError};
pub use scheduler::{FrameContext, FrameStats, Phase, Scheduler};
