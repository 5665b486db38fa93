//! GJK intersection test on the Minkowski difference.

use glam::Vec2;

use crate::error::ShapeError;

use super::shape::{support_difference, Shape};

/// Triangle simplex handed to EPA on a positive result.
pub type Simplex = [Vec2; 3];

/// Outcome of one GJK run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GjkOutcome {
    /// The simplex encloses the origin; the shapes overlap.
    Hit(Simplex),
    Miss,
    /// The search failed to settle within the iteration cap. Treated as a
    /// miss by callers (fail closed), but surfaced for diagnostics.
    CapReached,
}

/// `(a × b) × c` with all operands lifted to z = 0, projected back to 2-D.
/// Used to build edge perpendiculars that point toward the origin.
fn triple_product(a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    let z = a.perp_dot(b);
    Vec2::new(-z * c.y, z * c.x)
}

/// Perpendicular of `edge` on the side of `toward`. When `toward` lies on
/// the edge's own line the triple product vanishes; either side then serves,
/// so the left perpendicular keeps the search moving instead of stalling on
/// a zero direction.
fn perpendicular_toward(edge: Vec2, toward: Vec2) -> Vec2 {
    let perp = triple_product(edge, toward, edge);
    if perp.length_squared() > f32::EPSILON {
        perp
    } else {
        edge.perp()
    }
}

pub(crate) fn run_gjk(
    shape_a: &Shape,
    pos_a: Vec2,
    shape_b: &Shape,
    pos_b: Vec2,
    max_iterations: usize,
) -> Result<GjkOutcome, ShapeError> {
    shape_a.validate()?;
    shape_b.validate()?;

    let mut direction = Vec2::ONE.normalize();
    let mut simplex: Simplex = [Vec2::ZERO; 3];
    let mut last = 0usize;

    simplex[0] = support_difference(shape_a, pos_a, shape_b, pos_b, direction);
    direction = -simplex[0];

    for _ in 0..max_iterations {
        last += 1;
        simplex[last] = support_difference(shape_a, pos_a, shape_b, pos_b, direction);
        // The new point never crossed the origin: the difference cannot
        // contain it.
        if simplex[last].dot(direction) <= 0.0 {
            return Ok(GjkOutcome::Miss);
        }

        let newest = simplex[last];
        let to_prev = simplex[last - 1] - newest;
        let to_origin = -newest;

        if last == 1 {
            // Line case: search perpendicular to the segment, toward the
            // origin.
            direction = perpendicular_toward(to_prev, to_origin);
            continue;
        }

        // Triangle case: test the two edge regions adjacent to the newest
        // point; if the origin is outside both, the triangle encloses it.
        let to_first = simplex[0] - newest;
        let ab_perp = triple_product(to_first, to_prev, to_prev);
        let ac_perp = triple_product(to_prev, to_first, to_first);

        // All three points on one line: no triangle to test. Keep the
        // newest edge and resume the perpendicular line search.
        if ab_perp.length_squared() <= f32::EPSILON {
            simplex[0] = simplex[1];
            simplex[1] = simplex[2];
            last -= 1;
            direction = perpendicular_toward(to_prev, to_origin);
            continue;
        }

        if to_origin.dot(ab_perp) >= 0.0 {
            simplex[0] = simplex[1];
            direction = ab_perp;
        } else if to_origin.dot(ac_perp) >= 0.0 {
            direction = ac_perp;
        } else {
            return Ok(GjkOutcome::Hit(simplex));
        }
        simplex[1] = simplex[2];
        last -= 1;
    }

    Ok(GjkOutcome::CapReached)
}

/// Standalone intersection test with the default iteration cap. Returns the
/// enclosing simplex on overlap.
pub fn gjk_intersect(
    shape_a: &Shape,
    pos_a: Vec2,
    shape_b: &Shape,
    pos_b: Vec2,
) -> Result<Option<Simplex>, ShapeError> {
    let cap = crate::config::CollisionConfig::default().max_iterations;
    Ok(match run_gjk(shape_a, pos_a, shape_b, pos_b, cap)? {
        GjkOutcome::Hit(simplex) => Some(simplex),
        GjkOutcome::Miss | GjkOutcome::CapReached => None,
    })
}
