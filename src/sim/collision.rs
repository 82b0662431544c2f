//! Circle-circle collision detection and response
//!
//! Bodies are point masses with a contact radius. An overlapping pair is first
//! pushed apart along the contact normal (heavier body moves less), then, if
//! both bodies move and are still approaching, exchanges an impulse along the
//! normal. No angular response.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;

use super::entity::{Entity, EntityId, EntityKind};

/// Separation axis used when two centres coincide exactly
pub const COINCIDENT_AXIS: Vec2 = Vec2::X;

/// Outcome of resolving one overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    /// Unit normal pointing from `a` to `b`
    pub normal: Vec2,
    /// Penetration depth before correction
    pub overlap: f32,
    /// Impulse magnitude along `normal` (0 when none was applied)
    pub impulse: f32,
    /// Bodies were already moving apart, so no impulse was exchanged
    pub separating: bool,
}

/// Share of the penetration each body absorbs, heavier bodies moving less.
/// `None` when both bodies are immovable.
fn correction_shares(mass_a: f32, mass_b: f32) -> Option<(f32, f32)> {
    match (mass_a.is_infinite(), mass_b.is_infinite()) {
        (false, false) => {
            let total = mass_a + mass_b;
            if total.is_finite() {
                Some((mass_b / total, mass_a / total))
            } else {
                // Sum overflows for huge finite masses; use the ratio form
                Some((1.0 / (1.0 + mass_a / mass_b), 1.0 / (1.0 + mass_b / mass_a)))
            }
        }
        (true, false) => Some((0.0, 1.0)),
        (false, true) => Some((1.0, 0.0)),
        (true, true) => None,
    }
}

#[inline]
fn valid_mass(mass: f32) -> bool {
    mass > 0.0
}

/// Resolve the ordered pair (a, b). Returns `None` and leaves both bodies
/// untouched when they do not overlap or the pair is degenerate.
pub fn resolve_pair(a: &mut Entity, b: &mut Entity) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.radius + b.radius;

    if dist.is_nan() || dist >= min_dist {
        return None;
    }

    if !valid_mass(a.mass) || !valid_mass(b.mass) {
        log::debug!(
            "skipping pair {}/{}: invalid mass ({}, {})",
            a.id,
            b.id,
            a.mass,
            b.mass
        );
        return None;
    }

    let Some((share_a, share_b)) = correction_shares(a.mass, b.mass) else {
        log::debug!("skipping pair {}/{}: both immovable", a.id, b.id);
        return None;
    };

    let overlap = min_dist - dist;
    let normal = if dist > 0.0 {
        delta / dist
    } else {
        log::debug!(
            "pair {}/{} share a centre, separating along {}",
            a.id,
            b.id,
            COINCIDENT_AXIS
        );
        COINCIDENT_AXIS
    };

    a.pos -= normal * overlap * share_a;
    b.pos += normal * overlap * share_b;

    let mut contact = Contact {
        a: a.id,
        b: b.id,
        normal,
        overlap,
        impulse: 0.0,
        separating: false,
    };

    let (mass_a, mass_b) = (a.mass, b.mass);
    let restitution = a.restitution.min(b.restitution);
    let (Some(ka), Some(kb)) = (a.kinematics_mut(), b.kinematics_mut()) else {
        return Some(contact);
    };

    let vel_along_normal = (kb.vel - ka.vel).dot(normal);
    if vel_along_normal > 0.0 {
        contact.separating = true;
        return Some(contact);
    }

    let j = -(1.0 + restitution) * vel_along_normal / (1.0 / mass_a + 1.0 / mass_b);
    let impulse = normal * j;
    ka.vel -= impulse / mass_a;
    kb.vel += impulse / mass_b;

    contact.impulse = j;
    Some(contact)
}

/// Gameplay hook run when an entity is involved in a resolved collision
pub trait CollisionHandler {
    fn on_collision(&mut self, entity: &mut Entity, other: &Entity);
}

impl<F> CollisionHandler for F
where
    F: FnMut(&mut Entity, &Entity),
{
    fn on_collision(&mut self, entity: &mut Entity, other: &Entity) {
        self(entity, other)
    }
}

/// Collision handlers keyed by entity kind
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<EntityKind, Box<dyn CollisionHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handler for `kind`, replacing any previous one
    pub fn register<H>(&mut self, kind: EntityKind, handler: H)
    where
        H: CollisionHandler + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
    }

    pub fn remove(&mut self, kind: EntityKind) -> bool {
        self.handlers.remove(&kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered for `entity.kind`, if any
    pub fn dispatch(&mut self, entity: &mut Entity, other: &Entity) {
        if let Some(handler) = self.handlers.get_mut(&entity.kind) {
            handler.on_collision(entity, other);
        }
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort_by_key(|k| format!("{k:?}"));
        f.debug_struct("HandlerTable").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::entity::EntityBuilder;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ball(id: EntityId, pos: Vec2, vel: Vec2, mass: f32, restitution: f32) -> Entity {
        EntityBuilder::new(EntityKind::Enemy, pos)
            .dynamic(1000.0)
            .velocity(vel)
            .mass(mass)
            .restitution(restitution)
            .build(id, &SimConfig::default())
            .unwrap()
    }

    fn static_body(id: EntityId, pos: Vec2) -> Entity {
        EntityBuilder::new(EntityKind::Prop, pos)
            .build(id, &SimConfig::default())
            .unwrap()
    }

    #[test]
    fn test_equal_mass_overlap_splits_evenly() {
        let mut a = ball(1, Vec2::ZERO, Vec2::ZERO, 1.0, 0.5);
        let mut b = ball(2, Vec2::new(39.0, 0.0), Vec2::ZERO, 1.0, 0.5);

        let contact = resolve_pair(&mut a, &mut b).unwrap();
        assert_eq!(contact.overlap, 1.0);
        assert_eq!(contact.normal, Vec2::X);
        assert_eq!(a.pos, Vec2::new(-0.5, 0.0));
        assert_eq!(b.pos, Vec2::new(39.5, 0.0));
        assert_eq!(a.vel(), Vec2::ZERO);
        assert_eq!(b.vel(), Vec2::ZERO);
    }

    #[test]
    fn test_heavier_body_moves_less() {
        let mut a = ball(1, Vec2::ZERO, Vec2::ZERO, 3.0, 0.5);
        let mut b = ball(2, Vec2::new(0.0, 36.0), Vec2::ZERO, 1.0, 0.5);

        resolve_pair(&mut a, &mut b).unwrap();
        assert_eq!(a.pos, Vec2::new(0.0, -1.0));
        assert_eq!(b.pos, Vec2::new(0.0, 39.0));
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let mut a = ball(1, Vec2::ZERO, Vec2::new(2.0, 0.0), 1.0, 1.0);
        let mut b = ball(2, Vec2::new(30.0, 0.0), Vec2::new(-1.0, 0.0), 1.0, 1.0);
        let before = a.momentum() + b.momentum();

        let contact = resolve_pair(&mut a, &mut b).unwrap();
        assert_eq!(contact.impulse, 3.0);
        assert!(!contact.separating);
        assert_eq!(a.vel(), Vec2::new(-1.0, 0.0));
        assert_eq!(b.vel(), Vec2::new(2.0, 0.0));
        assert_eq!(a.momentum() + b.momentum(), before);
    }

    #[test]
    fn test_lowest_restitution_wins() {
        let mut a = ball(1, Vec2::ZERO, Vec2::new(2.0, 0.0), 1.0, 1.0);
        let mut b = ball(2, Vec2::new(30.0, 0.0), Vec2::new(-2.0, 0.0), 1.0, 0.0);

        resolve_pair(&mut a, &mut b).unwrap();
        // Perfectly inelastic: both end at the common velocity
        assert_eq!(a.vel(), Vec2::ZERO);
        assert_eq!(b.vel(), Vec2::ZERO);
    }

    #[test]
    fn test_separating_pair_corrected_without_impulse() {
        let mut a = ball(1, Vec2::ZERO, Vec2::new(-1.0, 0.0), 1.0, 1.0);
        let mut b = ball(2, Vec2::new(30.0, 0.0), Vec2::new(1.0, 0.0), 1.0, 1.0);

        let contact = resolve_pair(&mut a, &mut b).unwrap();
        assert!(contact.separating);
        assert_eq!(contact.impulse, 0.0);
        assert_eq!(a.pos, Vec2::new(-5.0, 0.0));
        assert_eq!(b.pos, Vec2::new(35.0, 0.0));
        assert_eq!(a.vel(), Vec2::new(-1.0, 0.0));
        assert_eq!(b.vel(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_coincident_centres_use_nominal_axis() {
        let mut a = ball(1, Vec2::new(10.0, 10.0), Vec2::ZERO, 1.0, 0.5);
        let mut b = ball(2, Vec2::new(10.0, 10.0), Vec2::ZERO, 1.0, 0.5);

        let contact = resolve_pair(&mut a, &mut b).unwrap();
        assert_eq!(contact.normal, COINCIDENT_AXIS);
        assert_eq!(contact.overlap, 40.0);
        assert_eq!(a.pos, Vec2::new(-10.0, 10.0));
        assert_eq!(b.pos, Vec2::new(30.0, 10.0));
        assert!(a.vel().is_finite() && b.vel().is_finite());
    }

    #[test]
    fn test_non_overlapping_pair_untouched() {
        let mut a = ball(1, Vec2::ZERO, Vec2::new(1.0, 0.0), 1.0, 0.5);
        let mut b = ball(2, Vec2::new(40.0, 0.0), Vec2::new(-1.0, 0.0), 1.0, 0.5);
        let (a0, b0) = (a.clone(), b.clone());

        // Exactly touching is not an overlap
        assert!(resolve_pair(&mut a, &mut b).is_none());
        assert_eq!(a, a0);
        assert_eq!(b, b0);

        b.pos.x = 100.0;
        let b1 = b.clone();
        assert!(resolve_pair(&mut a, &mut b).is_none());
        assert_eq!(a, a0);
        assert_eq!(b, b1);
    }

    #[test]
    fn test_immovable_body_reflects_mover() {
        let mut wall = ball(1, Vec2::ZERO, Vec2::ZERO, f32::INFINITY, 1.0);
        let mut mover = ball(2, Vec2::new(30.0, 0.0), Vec2::new(-2.0, 0.0), 1.0, 1.0);

        resolve_pair(&mut wall, &mut mover).unwrap();
        assert_eq!(wall.pos, Vec2::ZERO);
        assert_eq!(wall.vel(), Vec2::ZERO);
        assert_eq!(mover.pos, Vec2::new(40.0, 0.0));
        assert_eq!(mover.vel(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_huge_finite_masses_still_separate() {
        let mut a = ball(1, Vec2::ZERO, Vec2::ZERO, f32::MAX, 0.5);
        let mut b = ball(2, Vec2::new(30.0, 0.0), Vec2::ZERO, f32::MAX, 0.5);

        let contact = resolve_pair(&mut a, &mut b).unwrap();
        assert_eq!(contact.overlap, 10.0);
        assert_eq!(a.pos, Vec2::new(-5.0, 0.0));
        assert_eq!(b.pos, Vec2::new(35.0, 0.0));
        assert!(a.vel().is_finite() && b.vel().is_finite());
    }

    #[test]
    fn test_two_immovable_bodies_skipped() {
        let mut a = ball(1, Vec2::ZERO, Vec2::ZERO, f32::INFINITY, 0.5);
        let mut b = ball(2, Vec2::new(10.0, 0.0), Vec2::ZERO, f32::INFINITY, 0.5);
        assert!(resolve_pair(&mut a, &mut b).is_none());
        assert_eq!(a.pos, Vec2::ZERO);
        assert_eq!(b.pos, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_corrupted_mass_skipped() {
        let mut a = ball(1, Vec2::ZERO, Vec2::ZERO, 1.0, 0.5);
        let mut b = ball(2, Vec2::new(10.0, 0.0), Vec2::ZERO, 1.0, 0.5);
        b.mass = 0.0;
        assert!(resolve_pair(&mut a, &mut b).is_none());
        b.mass = f32::NAN;
        assert!(resolve_pair(&mut a, &mut b).is_none());
        assert_eq!(a.pos, Vec2::ZERO);
    }

    #[test]
    fn test_static_body_pushed_but_no_impulse() {
        let mut rock = static_body(1, Vec2::ZERO);
        let mut mover = ball(2, Vec2::new(30.0, 0.0), Vec2::new(-3.0, 0.0), 1.0, 1.0);

        let contact = resolve_pair(&mut rock, &mut mover).unwrap();
        assert_eq!(contact.impulse, 0.0);
        assert_eq!(rock.pos, Vec2::new(-5.0, 0.0));
        assert_eq!(mover.pos, Vec2::new(35.0, 0.0));
        assert_eq!(mover.vel(), Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_handler_table_dispatches_by_kind() {
        let hits = Rc::new(Cell::new(0u32));
        let mut table = HandlerTable::new();
        let counter = Rc::clone(&hits);
        table.register(EntityKind::Enemy, move |me: &mut Entity, other: &Entity| {
            assert_ne!(me.id, other.id);
            counter.set(counter.get() + 1);
        });
        assert_eq!(table.len(), 1);

        let mut enemy = ball(1, Vec2::ZERO, Vec2::ZERO, 1.0, 0.5);
        let mut rock = static_body(2, Vec2::ZERO);
        table.dispatch(&mut enemy, &rock);
        table.dispatch(&mut rock, &enemy);
        assert_eq!(hits.get(), 1);

        assert!(table.remove(EntityKind::Enemy));
        table.dispatch(&mut enemy, &rock);
        assert_eq!(hits.get(), 1);
        assert!(table.is_empty());
    }

    proptest! {
        #[test]
        fn prop_impulse_conserves_momentum(
            dx in -30.0f32..30.0,
            dy in -30.0f32..30.0,
            vax in -5.0f32..5.0,
            vay in -5.0f32..5.0,
            vbx in -5.0f32..5.0,
            vby in -5.0f32..5.0,
            mass_a in 0.5f32..5.0,
            mass_b in 0.5f32..5.0,
            e in 0.0f32..=1.0,
        ) {
            let mut a = ball(1, Vec2::ZERO, Vec2::new(vax, vay), mass_a, e);
            let mut b = ball(2, Vec2::new(dx, dy), Vec2::new(vbx, vby), mass_b, e);
            let before = a.momentum() + b.momentum();

            resolve_pair(&mut a, &mut b);

            let after = a.momentum() + b.momentum();
            prop_assert!((after - before).length() < 1e-3);
        }

        #[test]
        fn prop_equal_elastic_exchange_along_normal(
            dx in 1.0f32..35.0,
            dy in -10.0f32..10.0,
            va in 0.1f32..5.0,
            vb in 0.1f32..5.0,
        ) {
            let n = Vec2::new(dx, dy).normalize();
            let mut a = ball(1, Vec2::ZERO, n * va, 2.0, 1.0);
            let mut b = ball(2, Vec2::new(dx, dy), -n * vb, 2.0, 1.0);

            resolve_pair(&mut a, &mut b).unwrap();

            prop_assert!((a.vel().dot(n) - (-vb)).abs() < 1e-3);
            prop_assert!((b.vel().dot(n) - va).abs() < 1e-3);
        }
    }
}
