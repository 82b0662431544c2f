//! Simulation step
//!
//! One tick, in fixed order:
//! 1. integrate every dynamic entity (wall clamp included)
//! 2. age and drift particles, dropping the expired ones
//! 3. rebuild the spatial grid from post-movement positions
//! 4. resolve overlaps for every grid candidate pair
//!
//! Collisions are therefore resolved one tick behind continuous time.

use super::collision::resolve_pair;
use super::integrate::integrate;
use super::world::World;
use crate::config::{BroadPhase, PairPolicy};

/// Counters from the last tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub entities: usize,
    pub particles: usize,
    pub particles_expired: usize,
    /// Ordered candidate pairs handed to the narrow phase
    pub candidate_pairs: usize,
    pub contacts: usize,
}

/// Advance `world` by `dt`. A non-positive or non-finite `dt` moves nothing
/// and only resets the per-tick contacts and counters.
pub fn tick(world: &mut World, dt: f32) {
    world.contacts.clear();

    if !dt.is_finite() || dt <= 0.0 {
        log::debug!("skipping tick with deltaTime {dt}");
        world.stats = StepStats {
            entities: world.entities.len(),
            particles: world.particles.len(),
            ..StepStats::default()
        };
        return;
    }

    world.time_ticks += 1;

    let config = &world.config;
    let extent = world.extent;
    for entity in world.entities.iter_mut() {
        integrate(entity, dt, config, extent);
    }

    let particles_expired = world
        .particles
        .update(dt, world.config.gravity, world.config.friction);

    world.grid.rebuild(&world.entities);

    let candidate_pairs = resolve_collisions(world);

    world.stats = StepStats {
        entities: world.entities.len(),
        particles: world.particles.len(),
        particles_expired,
        candidate_pairs,
        contacts: world.contacts.len(),
    };
    log::trace!("tick {}: {:?}", world.time_ticks, world.stats);
}

/// Narrow phase over the grid candidates. Each entity queries with its
/// current position, so corrections earlier in the pass can move it to a
/// different bucket.
fn resolve_collisions(world: &mut World) -> usize {
    let World {
        config,
        entities,
        grid,
        handlers,
        contacts,
        neighbor_buf,
        visited_pairs,
        ..
    } = world;

    visited_pairs.clear();
    let mut candidates = 0;

    for i in 0..entities.len() {
        match config.broad_phase {
            BroadPhase::SameCell => {
                neighbor_buf.clear();
                neighbor_buf.extend_from_slice(grid.query(entities[i].pos));
            }
            BroadPhase::Neighborhood => grid.query_neighborhood_into(entities[i].pos, neighbor_buf),
        }

        for &j in neighbor_buf.iter() {
            if j == i {
                continue;
            }
            if config.pair_policy == PairPolicy::Unique && !visited_pairs.insert((i.min(j), i.max(j))) {
                continue;
            }
            candidates += 1;

            let (a, b) = pair_mut(entities, i, j);
            let Some(contact) = resolve_pair(a, b) else {
                continue;
            };
            contacts.push(contact);

            if !contact.separating {
                handlers.dispatch(a, b);
                handlers.dispatch(b, a);
            }
        }
    }

    candidates
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
