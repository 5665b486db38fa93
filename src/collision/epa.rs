//! EPA penetration-depth recovery.
//!
//! Expands the triangle simplex left by a positive GJK result along the
//! Minkowski difference boundary until the closest edge to the origin stops
//! moving, yielding the minimum-translation vector.

use glam::Vec2;

use crate::error::ShapeError;

use super::gjk::Simplex;
use super::shape::{support_difference, Shape};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EpaOutcome {
    Converged(Vec2),
    /// Iteration cap hit; the vector is the best approximation found.
    CapReached(Vec2),
}

impl EpaOutcome {
    pub(crate) fn penetration(self) -> Vec2 {
        match self {
            EpaOutcome::Converged(v) | EpaOutcome::CapReached(v) => v,
        }
    }
}

struct ClosestEdge {
    distance: f32,
    normal: Vec2,
    /// Insertion index for a new support point on this edge.
    index: usize,
}

/// Signed doubled area of the polygon; positive for counter-clockwise
/// winding. Decides which perpendicular of an edge faces outward.
fn signed_area(polytope: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    for i in 0..polytope.len() {
        let a = polytope[i];
        let b = polytope[(i + 1) % polytope.len()];
        sum += a.x * b.y - a.y * b.x;
    }
    sum
}

fn closest_edge(polytope: &[Vec2], counter_clockwise: bool) -> ClosestEdge {
    let mut closest = ClosestEdge {
        distance: f32::INFINITY,
        normal: Vec2::ZERO,
        index: 0,
    };
    for i in 0..polytope.len() {
        let j = (i + 1) % polytope.len();
        let edge = polytope[j] - polytope[i];
        let normal = if counter_clockwise {
            Vec2::new(edge.y, -edge.x)
        } else {
            Vec2::new(-edge.y, edge.x)
        }
        .normalize_or_zero();
        let distance = normal.dot(polytope[i]);
        if distance < closest.distance {
            closest = ClosestEdge {
                distance,
                normal,
                index: j,
            };
        }
    }
    closest
}

pub(crate) fn run_epa(
    simplex: Simplex,
    shape_a: &Shape,
    pos_a: Vec2,
    shape_b: &Shape,
    pos_b: Vec2,
    max_iterations: usize,
    epsilon: f32,
) -> Result<EpaOutcome, ShapeError> {
    shape_a.validate()?;
    shape_b.validate()?;

    let mut polytope: Vec<Vec2> = simplex.to_vec();
    let counter_clockwise = signed_area(&polytope) >= 0.0;

    let mut best = ClosestEdge {
        distance: 0.0,
        normal: Vec2::ZERO,
        index: 0,
    };
    for _ in 0..max_iterations {
        best = closest_edge(&polytope, counter_clockwise);
        let support = support_difference(shape_a, pos_a, shape_b, pos_b, best.normal);
        let support_distance = support.dot(best.normal);
        if (support_distance - best.distance).abs() < epsilon {
            return Ok(EpaOutcome::Converged(best.normal * best.distance));
        }
        polytope.insert(best.index, support);
    }

    Ok(EpaOutcome::CapReached(best.normal * best.distance))
}

/// Standalone penetration solve with the default cap and epsilon. The result
/// is the minimum-translation vector separating the shapes; how it is applied
/// (to one body or both) is the caller's policy.
pub fn epa_penetration(
    simplex: Simplex,
    shape_a: &Shape,
    pos_a: Vec2,
    shape_b: &Shape,
    pos_b: Vec2,
) -> Result<Vec2, ShapeError> {
    let config = crate::config::CollisionConfig::default();
    run_epa(
        simplex,
        shape_a,
        pos_a,
        shape_b,
        pos_b,
        config.max_iterations,
        config.epsilon,
    )
    .map(EpaOutcome::penetration)
}
