//! Physics simulation module
//!
//! Everything that moves lives here. This module must stay single-threaded
//! and deterministic:
//! - One `World` owns its entities and particles for the whole tick
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod integrate;
pub mod particle;
pub mod raycast;
pub mod tick;
pub mod world;

pub use bounds::{Region, WorldExtent, clamp_to_extent};
pub use clock::FrameClock;
pub use collision::{COINCIDENT_AXIS, CollisionHandler, Contact, HandlerTable, resolve_pair};
pub use entity::{Entity, EntityBuilder, EntityError, EntityId, EntityKind, Kinematics, Motion};
pub use grid::{CellKey, SpatialGrid};
pub use integrate::integrate;
pub use particle::{Particle, ParticleConfig, ParticleShape, ParticleSystem};
pub use raycast::{RayHit, raycast};
pub use tick::{StepStats, tick};
pub use world::World;
