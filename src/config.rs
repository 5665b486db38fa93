//! Runtime configuration: world limits and collision solver tuning.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

fn default_max_entities() -> usize {
    crate::ecs::MAX_ENTITIES
}

fn default_max_iterations() -> usize {
    32
}

fn default_epsilon() -> f32 {
    1e-6
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    /// Live-entity ceiling; allocation past it fails with `CapacityExceeded`.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: default_max_entities(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CollisionConfig {
    /// Iteration cap for both the GJK simplex search and EPA expansion.
    /// Past it, GJK fails closed (no collision) and EPA returns its best
    /// approximation; both outcomes are counted, not errors.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// EPA convergence threshold on the support-point distance gain.
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            epsilon: default_epsilon(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub collision: CollisionConfig,
}

impl RuntimeConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing runtime config")
    }
}
