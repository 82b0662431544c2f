//! Decorative particles
//!
//! Particles never collide. Each tick they drift under friction and gravity,
//! age by exactly `dt`, and are dropped in the same tick their life reaches 0.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Shape the renderer draws for a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    #[default]
    Normal,
    Crystal,
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life, decreases by dt every tick
    pub life: f32,
    /// Life at emission (for fading)
    pub max_life: f32,
    pub size: f32,
    pub mass: f32,
    pub rotation: f32,
    pub angular_vel: f32,
    /// Free-form visual tag (CSS colour for the canvas renderer)
    pub color: String,
    pub shape: ParticleShape,
}

impl Particle {
    /// Opacity in [0, 1] derived from remaining life
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Partial particle description. Unset fields take the defaults in
/// [`crate::consts`]; the angular velocity is always randomised.
#[derive(Debug, Clone, Default)]
pub struct ParticleConfig {
    pub pos: Vec2,
    pub vel: Option<Vec2>,
    pub life: Option<f32>,
    pub size: Option<f32>,
    pub mass: Option<f32>,
    pub color: Option<String>,
    pub shape: Option<ParticleShape>,
}

impl ParticleConfig {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }
}

/// Owns the live particles and the RNG that spins them
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Pcg32,
    /// `None` means unbounded
    max_particles: Option<usize>,
    /// Set while emission keeps running into the budget
    over_budget: bool,
}

impl ParticleSystem {
    pub fn new(seed: u64, max_particles: Option<usize>) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            max_particles,
            over_budget: false,
        }
    }

    /// Append one particle. With a budget set, the oldest particles are
    /// evicted to stay within it.
    pub fn emit(&mut self, config: ParticleConfig) {
        let life = config.life.unwrap_or(PARTICLE_LIFE);
        let angular_vel = self.rng.random_range(-PARTICLE_SPIN..=PARTICLE_SPIN);

        self.particles.push(Particle {
            pos: config.pos,
            vel: config.vel.unwrap_or(Vec2::ZERO),
            life,
            max_life: life,
            size: config.size.unwrap_or(PARTICLE_SIZE),
            mass: config.mass.unwrap_or(DEFAULT_MASS),
            rotation: 0.0,
            angular_vel,
            color: config.color.unwrap_or_else(|| PARTICLE_COLOR.to_string()),
            shape: config.shape.unwrap_or_default(),
        });

        let Some(max) = self.max_particles else {
            return;
        };
        if self.particles.len() > max {
            if !self.over_budget {
                log::warn!("particle budget {max} exceeded, evicting oldest");
                self.over_budget = true;
            }
            let excess = self.particles.len() - max;
            self.particles.drain(..excess);
        } else {
            self.over_budget = false;
        }
    }

    /// Advance every particle and drop the expired ones. Returns how many were
    /// removed.
    pub fn update(&mut self, dt: f32, gravity: f32, friction: f32) -> usize {
        let before = self.particles.len();
        for p in self.particles.iter_mut() {
            p.vel *= friction;
            p.vel.y += gravity * p.mass;
            p.pos += p.vel;
            p.life -= dt;
            p.rotation += p.angular_vel;
        }
        self.particles.retain(Particle::is_alive);
        before - self.particles.len()
    }

    /// Drop particles with `life <= min_life` (load shedding)
    pub fn cull_below(&mut self, min_life: f32) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.life > min_life);
        before - self.particles.len()
    }

    /// Change the budget, evicting the oldest particles if now over it.
    /// `None` lifts the budget.
    pub fn set_max_particles(&mut self, max_particles: Option<usize>) {
        self.max_particles = max_particles;
        self.over_budget = false;
        if let Some(max) = max_particles {
            let excess = self.particles.len().saturating_sub(max);
            self.particles.drain(..excess);
        }
    }

    pub fn max_particles(&self) -> Option<usize> {
        self.max_particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }
}
