//! Simulation configuration
//!
//! Every constant the physics core reads lives here so a region or a test can
//! swap them without touching the step code. Loaded from JSON; missing keys
//! fall back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while building or loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Particle budget for this preset when the budget is enforced
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }
}

/// Which grid cells a broad-phase query inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BroadPhase {
    /// Only the entity's own cell. Pairs straddling a cell border are missed.
    #[default]
    SameCell,
    /// The entity's cell and its eight neighbours
    Neighborhood,
}

/// How often an overlapping pair is resolved per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PairPolicy {
    /// a→b and b→a are both resolved (two corrections, two impulses)
    #[default]
    Symmetric,
    /// Each unordered pair is resolved once
    Unique,
}

/// Physics tuning for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Integration ===
    pub gravity: f32,
    pub friction: f32,
    /// Velocity multiplier applied on wall contact
    pub wall_bounce: f32,

    // === Entity defaults ===
    pub default_radius: f32,
    pub default_restitution: f32,

    // === Collision ===
    pub cell_size: f32,
    pub broad_phase: BroadPhase,
    pub pair_policy: PairPolicy,

    // === Queries ===
    pub raycast_step: f32,

    // === Particles ===
    pub quality: QualityPreset,
    /// Enforce the preset's particle budget. Off by default: particles
    /// then only leave when their life runs out.
    pub limit_particles: bool,
    /// Seed for particle spin
    pub seed: u64,

    // === Frame clock ===
    pub frame_ms: f32,
    pub max_delta: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            wall_bounce: WALL_BOUNCE,

            default_radius: DEFAULT_RADIUS,
            default_restitution: DEFAULT_RESTITUTION,

            cell_size: CELL_SIZE,
            broad_phase: BroadPhase::SameCell,
            pair_policy: PairPolicy::Symmetric,

            raycast_step: RAYCAST_STEP,

            quality: QualityPreset::Medium,
            limit_particles: false,
            seed: 0,

            frame_ms: FRAME_MS,
            max_delta: MAX_DELTA,
        }
    }
}

impl SimConfig {
    /// Create a config from a quality preset (other values default)
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Particle cap for the active quality preset, `None` when unbounded
    pub fn max_particles(&self) -> Option<usize> {
        self.limit_particles.then(|| self.quality.max_particles())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would stall or poison the step loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("gravity", self.gravity),
            ("friction", self.friction),
            ("wall_bounce", self.wall_bounce),
            ("default_radius", self.default_radius),
            ("default_restitution", self.default_restitution),
            ("cell_size", self.cell_size),
            ("raycast_step", self.raycast_step),
            ("frame_ms", self.frame_ms),
            ("max_delta", self.max_delta),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite",
                });
            }
        }

        if self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "cell_size",
                reason: "must be positive",
            });
        }
        if self.raycast_step <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "raycast_step",
                reason: "must be positive",
            });
        }
        if self.frame_ms <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "frame_ms",
                reason: "must be positive",
            });
        }
        if self.max_delta < 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_delta",
                reason: "must not be negative",
            });
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(ConfigError::Invalid {
                field: "friction",
                reason: "must be within [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.default_restitution) {
            return Err(ConfigError::Invalid {
                field: "default_restitution",
                reason: "must be within [0, 1]",
            });
        }
        if self.default_radius < 0.0 {
            return Err(ConfigError::Invalid {
                field: "default_radius",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
