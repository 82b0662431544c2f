//! Simulation context
//!
//! A `World` owns one entity collection and one particle collection and is
//! advanced by [`World::step`]. Worlds share nothing, so any number can run
//! side by side (tests, previews, server instances).

use std::collections::HashSet;

use glam::Vec2;

use super::bounds::{Region, WorldExtent};
use super::collision::{CollisionHandler, Contact, HandlerTable};
use super::entity::{Entity, EntityBuilder, EntityError, EntityId, EntityKind};
use super::grid::SpatialGrid;
use super::particle::{ParticleConfig, ParticleSystem};
use super::raycast::{RayHit, raycast};
use super::tick::{StepStats, tick};
use crate::config::{ConfigError, SimConfig};

#[derive(Debug)]
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) extent: WorldExtent,
    pub(crate) entities: Vec<Entity>,
    pub(crate) particles: ParticleSystem,
    pub(crate) grid: SpatialGrid,
    pub(crate) handlers: HandlerTable,
    /// Contacts resolved during the last tick
    pub(crate) contacts: Vec<Contact>,
    /// Scratch buffers reused across ticks
    pub(crate) neighbor_buf: Vec<usize>,
    pub(crate) visited_pairs: HashSet<(usize, usize)>,
    pub(crate) stats: StepStats,
    pub(crate) time_ticks: u64,
    pub(crate) next_id: EntityId,
}

impl World {
    /// Create an empty world bounded by `extent`
    pub fn new(config: SimConfig, extent: WorldExtent) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate().and_then(|()| extent.validate()) {
            log::warn!("rejected simulation config: {err}");
            return Err(err);
        }

        log::info!(
            "world created: extent {}x{}, cell {}, {:?}/{:?}, quality {}, particle budget {:?}",
            extent.half_width * 2.0,
            extent.half_height * 2.0,
            config.cell_size,
            config.broad_phase,
            config.pair_policy,
            config.quality.as_str(),
            config.max_particles()
        );

        Ok(Self {
            particles: ParticleSystem::new(config.seed, config.max_particles()),
            grid: SpatialGrid::new(config.cell_size),
            config,
            extent,
            entities: Vec::new(),
            handlers: HandlerTable::new(),
            contacts: Vec::new(),
            neighbor_buf: Vec::new(),
            visited_pairs: HashSet::new(),
            stats: StepStats::default(),
            time_ticks: 0,
            next_id: 1,
        })
    }

    /// Create an empty world sized for `region`
    pub fn for_region(config: SimConfig, region: Region) -> Result<Self, ConfigError> {
        Self::new(config, region.extent())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn extent(&self) -> WorldExtent {
        self.extent
    }

    /// Switch the active region bounds. Takes effect on the next step. An
    /// invalid extent is rejected and the current one kept.
    pub fn set_extent(&mut self, extent: WorldExtent) -> Result<(), ConfigError> {
        extent.validate()?;
        log::info!(
            "world extent changed to {}x{}",
            extent.half_width * 2.0,
            extent.half_height * 2.0
        );
        self.extent = extent;
        Ok(())
    }

    /// Build and add an entity, returning its id
    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<EntityId, EntityError> {
        let entity = builder.build(self.next_id, &self.config)?;
        self.next_id += 1;
        let id = entity.id;
        self.entities.push(entity);
        Ok(id)
    }

    /// Remove an entity, keeping the order of the rest
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Drop every entity (world regeneration). Ids keep counting up.
    pub fn clear_entities(&mut self) {
        log::info!("clearing {} entities", self.entities.len());
        self.entities.clear();
        self.contacts.clear();
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access for gameplay code between ticks (input forces, AI)
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    /// Append one particle
    pub fn emit_particle(&mut self, config: ParticleConfig) {
        self.particles.emit(config);
    }

    /// Install the collision handler for every entity of `kind`
    pub fn on_collision<H>(&mut self, kind: EntityKind, handler: H)
    where
        H: CollisionHandler + 'static,
    {
        self.handlers.register(kind, handler);
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerTable {
        &mut self.handlers
    }

    /// Contacts resolved during the last tick, in resolution order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn last_stats(&self) -> StepStats {
        self.stats
    }

    /// Number of ticks that actually advanced the simulation
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self, dt: f32) {
        tick(self, dt);
    }

    /// First entity along the ray, sampled every `config.raycast_step` units
    pub fn raycast(&self, origin: Vec2, angle: f32, max_distance: f32) -> RayHit {
        self.raycast_where(origin, angle, max_distance, |_| true)
    }

    /// Like [`World::raycast`], ignoring entities `filter` rejects
    pub fn raycast_where<F>(&self, origin: Vec2, angle: f32, max_distance: f32, filter: F) -> RayHit
    where
        F: FnMut(&Entity) -> bool,
    {
        raycast(
            &self.entities,
            origin,
            angle,
            max_distance,
            self.config.raycast_step,
            filter,
        )
    }
}
