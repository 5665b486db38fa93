//! Error taxonomy for the ECS runtime and the collision engine.
//!
//! All variants are local, recoverable conditions: a system that hits one
//! should skip the offending entity for the frame, never abort the frame.

use thiserror::Error;

use crate::ecs::Entity;

pub type EcsResult<T> = Result<T, EcsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    /// The world is at its live-entity limit.
    #[error("entity capacity exceeded: at most {max} entities may be live")]
    CapacityExceeded { max: usize },

    /// All 32 signature bits are taken.
    #[error("component type limit reached: at most {max} types may be registered")]
    TooManyComponentTypes { max: usize },

    /// The component type was never registered with the world.
    #[error("component type `{type_name}` is not registered")]
    UnregisteredComponent { type_name: &'static str },

    /// The entity's signature lacks the bit for this component type.
    #[error("entity {entity} has no `{type_name}` component")]
    ComponentNotFound {
        entity: Entity,
        type_name: &'static str,
    },

    /// Attach called for a type the entity already carries.
    #[error("entity {entity} already has a `{type_name}` component")]
    DuplicateComponent {
        entity: Entity,
        type_name: &'static str,
    },

    /// The handle's generation does not match the slot: the id was freed
    /// (and possibly recycled) since the handle was obtained.
    #[error("stale entity handle {entity}")]
    StaleEntity { entity: Entity },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Degenerate collider geometry (empty polygon, non-positive radius).
    #[error("invalid collider shape: {reason}")]
    InvalidShape { reason: &'static str },
}
