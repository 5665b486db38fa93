//! Convex shape descriptors and their support functions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

const MIN_RADIUS: f32 = 1e-6;

/// A convex collider in local space, positioned by the owning transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Ordered vertex list of local-space offsets from the world position.
    Polygon { vertices: Vec<Vec2> },
    /// Circle at a local-space offset.
    Circle { offset: Vec2, radius: f32 },
}

impl Shape {
    /// Axis-aligned rectangle collider: offset `(x, y)` plus extent.
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Shape::Polygon {
            vertices: vec![
                Vec2::new(x, y),
                Vec2::new(x + width, y),
                Vec2::new(x + width, y + height),
                Vec2::new(x, y + height),
            ],
        }
    }

    pub fn circle(offset: Vec2, radius: f32) -> Self {
        Shape::Circle { offset, radius }
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Shape::Polygon { vertices } => {
                if vertices.is_empty() {
                    return Err(ShapeError::InvalidShape {
                        reason: "polygon has no vertices",
                    });
                }
                if vertices.iter().any(|v| !v.is_finite()) {
                    return Err(ShapeError::InvalidShape {
                        reason: "polygon vertex is not finite",
                    });
                }
                Ok(())
            }
            Shape::Circle { radius, .. } => {
                if !radius.is_finite() || *radius <= MIN_RADIUS {
                    return Err(ShapeError::InvalidShape {
                        reason: "circle radius is not positive",
                    });
                }
                Ok(())
            }
        }
    }

    /// The shape's boundary point furthest along `direction`, in world space.
    ///
    /// Polygons pick the vertex with the maximal projection; circles pick
    /// `center + radius * direction`. An empty polygon (rejected by
    /// `validate`) degenerates to a point at `position`.
    pub fn support(&self, position: Vec2, direction: Vec2) -> Vec2 {
        match self {
            Shape::Polygon { vertices } => {
                let Some((&first, rest)) = vertices.split_first() else {
                    return position;
                };
                let mut best = first;
                let mut best_dot = best.dot(direction);
                for &vertex in rest {
                    let dot = vertex.dot(direction);
                    if dot > best_dot {
                        best = vertex;
                        best_dot = dot;
                    }
                }
                position + best
            }
            Shape::Circle { offset, radius } => {
                position + *offset + direction.normalize_or_zero() * *radius
            }
        }
    }
}

/// Support point on the Minkowski difference `A + (-B)`. The two shapes
/// intersect iff this difference contains the origin.
pub(crate) fn support_difference(
    shape_a: &Shape,
    pos_a: Vec2,
    shape_b: &Shape,
    pos_b: Vec2,
    direction: Vec2,
) -> Vec2 {
    shape_a.support(pos_a, direction) - shape_b.support(pos_b, -direction)
}
