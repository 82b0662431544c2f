//! Sampled raycasts against entity circles
//!
//! The ray is marched in fixed increments rather than solved analytically, so
//! the reported distance is the first sample inside a circle, not the exact
//! entry point.

use glam::Vec2;

use super::entity::{Entity, EntityId};
use crate::{direction_from_angle, distance};

/// Raycast result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayHit {
    Hit {
        entity: EntityId,
        /// Distance of the first sample inside the entity
        distance: f32,
        point: Vec2,
    },
    Miss {
        /// Distance travelled before giving up
        distance: f32,
    },
}

impl RayHit {
    pub fn is_hit(&self) -> bool {
        matches!(self, RayHit::Hit { .. })
    }

    pub fn distance(&self) -> f32 {
        match *self {
            RayHit::Hit { distance, .. } | RayHit::Miss { distance } => distance,
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            RayHit::Hit { entity, .. } => Some(entity),
            RayHit::Miss { .. } => None,
        }
    }
}

/// March from `origin` along `angle`, sampling every `step` units while the
/// sample distance is below `max_distance`. At each sample the entities are
/// tested in slice order; the first whose centre is strictly closer than its
/// radius (and that `filter` accepts) is the hit.
pub fn raycast<F>(
    entities: &[Entity],
    origin: Vec2,
    angle: f32,
    max_distance: f32,
    step: f32,
    mut filter: F,
) -> RayHit
where
    F: FnMut(&Entity) -> bool,
{
    if step.is_nan() || step <= 0.0 || !max_distance.is_finite() || !origin.is_finite() {
        log::debug!("degenerate raycast (step {step}, max {max_distance}), reporting miss");
        return RayHit::Miss { distance: 0.0 };
    }

    let dir = direction_from_angle(angle);

    for i in 0u64.. {
        let dist = i as f32 * step;
        if dist >= max_distance {
            break;
        }
        let point = origin + dir * dist;

        let hit = entities
            .iter()
            .find(|e| distance(e.pos, point) < e.radius && filter(e));
        if let Some(entity) = hit {
            return RayHit::Hit {
                entity: entity.id,
                distance: dist,
                point,
            };
        }
    }

    RayHit::Miss {
        distance: max_distance,
    }
}
