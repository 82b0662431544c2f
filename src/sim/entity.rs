//! Simulated bodies
//!
//! Every field the hot loops read is resolved when the entity is built, so the
//! integrator and resolver never probe for missing values.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SimConfig;
use crate::consts::DEFAULT_MASS;

/// Stable entity handle, allocated by the world
pub type EntityId = u32;

/// Gameplay role of an entity (also the collision handler key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Npc,
    Prop,
}

/// Errors raised when an entity description breaks a physical invariant
#[derive(Debug, Error, PartialEq)]
pub enum EntityError {
    #[error("mass must be positive (got {0})")]
    InvalidMass(f32),
    #[error("radius must be finite and non-negative (got {0})")]
    InvalidRadius(f32),
    #[error("restitution must be within [0, 1] (got {0})")]
    InvalidRestitution(f32),
    #[error("max speed must be non-negative (got {0})")]
    InvalidMaxSpeed(f32),
    #[error("position must be finite (got {0})")]
    InvalidPosition(Vec2),
    #[error("velocity must be finite (got {0})")]
    InvalidVelocity(Vec2),
    #[error("acceleration must be finite (got {0})")]
    InvalidAcceleration(Vec2),
}

/// Kinematic state of a moving body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub vel: Vec2,
    /// Constant acceleration applied every tick (zero when unused)
    pub accel: Vec2,
    pub max_speed: f32,
    pub has_gravity: bool,
}

impl Kinematics {
    pub fn new(max_speed: f32) -> Self {
        Self {
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            max_speed,
            has_gravity: false,
        }
    }
}

/// Whether an entity moves on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// No kinematic state: never integrated, clamped or impulsed, but still
    /// pushed apart by positional correction
    Static,
    Dynamic(Kinematics),
}

/// A simulated body (player, enemy, NPC, prop)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Always > 0. `f32::INFINITY` marks an immovable body.
    pub mass: f32,
    pub restitution: f32,
    pub motion: Motion,
}

impl Entity {
    #[inline]
    pub fn kinematics(&self) -> Option<&Kinematics> {
        match &self.motion {
            Motion::Dynamic(k) => Some(k),
            Motion::Static => None,
        }
    }

    #[inline]
    pub fn kinematics_mut(&mut self) -> Option<&mut Kinematics> {
        match &mut self.motion {
            Motion::Dynamic(k) => Some(k),
            Motion::Static => None,
        }
    }

    /// Current velocity (zero for static bodies)
    #[inline]
    pub fn vel(&self) -> Vec2 {
        self.kinematics().map_or(Vec2::ZERO, |k| k.vel)
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.motion, Motion::Dynamic(_))
    }

    /// Linear momentum (zero for static or immovable bodies)
    pub fn momentum(&self) -> Vec2 {
        if self.mass.is_finite() {
            self.vel() * self.mass
        } else {
            Vec2::ZERO
        }
    }
}

/// Partial entity description; unset fields take the config defaults on build
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    kind: EntityKind,
    pos: Vec2,
    radius: Option<f32>,
    mass: f32,
    restitution: Option<f32>,
    motion: Motion,
}

impl EntityBuilder {
    pub fn new(kind: EntityKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: None,
            mass: DEFAULT_MASS,
            restitution: None,
            motion: Motion::Static,
        }
    }

    /// Give the entity kinematic state with the given speed cap
    pub fn dynamic(mut self, max_speed: f32) -> Self {
        self.motion = Motion::Dynamic(Kinematics::new(max_speed));
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }

    /// Initial velocity; no effect on static entities
    pub fn velocity(mut self, vel: Vec2) -> Self {
        if let Motion::Dynamic(k) = &mut self.motion {
            k.vel = vel;
        }
        self
    }

    /// Constant acceleration; no effect on static entities
    pub fn acceleration(mut self, accel: Vec2) -> Self {
        if let Motion::Dynamic(k) = &mut self.motion {
            k.accel = accel;
        }
        self
    }

    /// Enable gravity; no effect on static entities
    pub fn gravity(mut self, enabled: bool) -> Self {
        if let Motion::Dynamic(k) = &mut self.motion {
            k.has_gravity = enabled;
        }
        self
    }

    /// Resolve defaults and check invariants
    pub fn build(self, id: EntityId, config: &SimConfig) -> Result<Entity, EntityError> {
        if !self.pos.is_finite() {
            return Err(EntityError::InvalidPosition(self.pos));
        }
        if self.mass.is_nan() || self.mass <= 0.0 {
            return Err(EntityError::InvalidMass(self.mass));
        }

        let radius = self.radius.unwrap_or(config.default_radius);
        if !radius.is_finite() || radius < 0.0 {
            return Err(EntityError::InvalidRadius(radius));
        }

        let restitution = self.restitution.unwrap_or(config.default_restitution);
        if !(0.0..=1.0).contains(&restitution) {
            return Err(EntityError::InvalidRestitution(restitution));
        }

        if let Motion::Dynamic(k) = &self.motion {
            if k.max_speed.is_nan() || k.max_speed < 0.0 {
                return Err(EntityError::InvalidMaxSpeed(k.max_speed));
            }
            if !k.vel.is_finite() {
                return Err(EntityError::InvalidVelocity(k.vel));
            }
            if !k.accel.is_finite() {
                return Err(EntityError::InvalidAcceleration(k.accel));
            }
        }

        Ok(Entity {
            id,
            kind: self.kind,
            pos: self.pos,
            radius,
            mass: self.mass,
            restitution,
            motion: self.motion,
        })
    }
}
