//! Narrow-phase collision engine: GJK intersection tests with EPA
//! penetration recovery for convex polygons and circles.

pub mod epa;
pub mod gjk;
pub mod shape;

pub use epa::epa_penetration;
pub use gjk::{gjk_intersect, Simplex};
pub use shape::Shape;

use glam::Vec2;

use crate::config::CollisionConfig;
use crate::error::ShapeError;

use epa::{run_epa, EpaOutcome};
use gjk::{run_gjk, GjkOutcome};

/// Counters for iteration-cap degradation. Cap bailouts are a silent
/// degrade-to-approximation, not errors, but they are worth watching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NarrowPhaseStats {
    pub tests: u64,
    pub hits: u64,
    pub gjk_cap_bailouts: u64,
    pub epa_cap_bailouts: u64,
}

/// Stateful narrow-phase front end: runs GJK (and EPA on overlap) with the
/// configured caps and keeps running counters.
pub struct NarrowPhase {
    config: CollisionConfig,
    stats: NarrowPhaseStats,
}

impl NarrowPhase {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            stats: NarrowPhaseStats::default(),
        }
    }

    pub fn stats(&self) -> NarrowPhaseStats {
        self.stats
    }

    /// Intersection test only.
    pub fn intersects(
        &mut self,
        shape_a: &Shape,
        pos_a: Vec2,
        shape_b: &Shape,
        pos_b: Vec2,
    ) -> Result<bool, ShapeError> {
        Ok(self.gjk(shape_a, pos_a, shape_b, pos_b)?.is_some())
    }

    /// Full test: `None` when the shapes are separated, otherwise the
    /// minimum-translation vector that separates them. Applying the vector
    /// (to which body, by how much) is the calling system's policy.
    pub fn penetration(
        &mut self,
        shape_a: &Shape,
        pos_a: Vec2,
        shape_b: &Shape,
        pos_b: Vec2,
    ) -> Result<Option<Vec2>, ShapeError> {
        let Some(simplex) = self.gjk(shape_a, pos_a, shape_b, pos_b)? else {
            return Ok(None);
        };
        let outcome = run_epa(
            simplex,
            shape_a,
            pos_a,
            shape_b,
            pos_b,
            self.config.max_iterations,
            self.config.epsilon,
        )?;
        if matches!(outcome, EpaOutcome::CapReached(_)) {
            self.stats.epa_cap_bailouts += 1;
        }
        Ok(Some(outcome.penetration()))
    }

    fn gjk(
        &mut self,
        shape_a: &Shape,
        pos_a: Vec2,
        shape_b: &Shape,
        pos_b: Vec2,
    ) -> Result<Option<Simplex>, ShapeError> {
        self.stats.tests += 1;
        match run_gjk(shape_a, pos_a, shape_b, pos_b, self.config.max_iterations)? {
            GjkOutcome::Hit(simplex) => {
                self.stats.hits += 1;
                Ok(Some(simplex))
            }
            GjkOutcome::Miss => Ok(None),
            GjkOutcome::CapReached => {
                // Fail closed: report no collision rather than loop forever.
                self.stats.gjk_cap_bailouts += 1;
                Ok(None)
            }
        }
    }
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}
