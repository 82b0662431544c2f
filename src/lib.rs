//! Aetherion Physics - simulation core for a real-time 2D action game
//!
//! Core modules:
//! - `sim`: Entity integration, broad/narrow phase collisions, particles, raycasts
//! - `config`: Tunable simulation constants and quality presets

pub mod config;
pub mod sim;

pub use config::{BroadPhase, ConfigError, PairPolicy, QualityPreset, SimConfig};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Downward acceleration per unit deltaTime
    pub const GRAVITY: f32 = 0.5;
    /// Velocity multiplier applied once per tick
    pub const FRICTION: f32 = 0.85;

    /// Spatial grid cell edge length
    pub const CELL_SIZE: f32 = 100.0;

    /// Entity defaults
    pub const DEFAULT_RADIUS: f32 = 20.0;
    pub const DEFAULT_RESTITUTION: f32 = 0.5;
    pub const DEFAULT_MASS: f32 = 1.0;

    /// Velocity multiplier on wall contact (inelastic bounce)
    pub const WALL_BOUNCE: f32 = -0.5;

    /// Distance between raycast samples
    pub const RAYCAST_STEP: f32 = 5.0;

    /// Particle defaults
    pub const PARTICLE_LIFE: f32 = 1.0;
    pub const PARTICLE_SIZE: f32 = 5.0;
    pub const PARTICLE_COLOR: &str = "#fff";
    /// Angular velocity is drawn from [-SPIN, SPIN]
    pub const PARTICLE_SPIN: f32 = 0.1;

    /// Frame duration (ms) that maps to deltaTime = 1.0
    pub const FRAME_MS: f32 = 16.67;
    /// Largest deltaTime the frame clock will hand out
    pub const MAX_DELTA: f32 = 3.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit vector pointing along `angle` (radians, 0 = +x)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
