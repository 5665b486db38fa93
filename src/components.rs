//! Stock components for simulation entities.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::Shape;
use crate::ecs::Component;

/// World placement and motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub velocity: Vec2,
}

impl Transform {
    pub fn new(position: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            position,
            size,
            speed,
            velocity: Vec2::ZERO,
        }
    }
}

impl Component for Transform {}

/// Convex collider plus layer filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    /// Which collision layers this collider belongs to.
    pub layer: u32,
    /// Which layers this collider tests against.
    pub layer_mask: u32,
    /// Set by collision systems each frame; cleared before testing.
    pub is_colliding: bool,
}

impl Collider {
    pub fn new(shape: Shape, layer: u32, layer_mask: u32) -> Self {
        Self {
            shape,
            layer,
            layer_mask,
            is_colliding: false,
        }
    }

    /// Axis-aligned rectangle collider at a local offset.
    pub fn rect(x: f32, y: f32, width: f32, height: f32, layer: u32, layer_mask: u32) -> Self {
        Self::new(Shape::rect(x, y, width, height), layer, layer_mask)
    }

    pub fn circle(offset: Vec2, radius: f32, layer: u32, layer_mask: u32) -> Self {
        Self::new(Shape::circle(offset, radius), layer, layer_mask)
    }

    /// Layer test: we probe the other collider only when our mask selects
    /// any of its layers.
    pub fn can_collide_with(&self, other: &Collider) -> bool {
        self.layer_mask & other.layer != 0
    }
}

impl Component for Collider {}
