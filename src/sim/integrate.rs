//! Per-entity force integration
//!
//! Order matters and is fixed: acceleration, gravity, friction, speed cap,
//! position, wall clamp. Friction runs every tick whether or not the entity is
//! grounded, and the cap sees the post-friction velocity.

use super::bounds::{WorldExtent, clamp_to_extent};
use super::entity::{Entity, Motion};
use crate::config::SimConfig;

/// Advance one dynamic entity by `dt`. Static entities are left alone.
pub fn integrate(entity: &mut Entity, dt: f32, config: &SimConfig, extent: WorldExtent) {
    let Motion::Dynamic(k) = &mut entity.motion else {
        return;
    };

    k.vel += k.accel * dt;

    if k.has_gravity {
        k.vel.y += config.gravity * dt;
    }

    k.vel *= config.friction;

    let speed = k.vel.length();
    if speed > k.max_speed {
        k.vel = (k.vel / speed) * k.max_speed;
    }

    entity.pos += k.vel * dt;

    clamp_to_extent(entity, extent, config.wall_bounce);
}
