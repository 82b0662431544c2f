//! Aetherion Physics - headless driver
//!
//! Generates a region the way the game does (one player, a pack of heavy
//! enemies), runs it against a jittery synthetic frame clock and logs what
//! the physics did. Pass a JSON config path as the first argument to
//! override the defaults. Set `RUST_LOG=debug` for per-contact output.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Aetherion Physics (native) starting...");

    if let Err(err) = native::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the game's own frame scheduler on web
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::Cell;
    use std::rc::Rc;

    use aetherion_physics::config::{ConfigError, SimConfig};
    use aetherion_physics::sim::{
        Entity, EntityBuilder, EntityError, EntityKind, FrameClock, ParticleConfig,
        ParticleShape, Region, World,
    };
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const FRAMES: u32 = 600;
    const ENEMY_COUNT: usize = 10;
    const SPAWN_SPREAD: f32 = 500.0;
    const PLAYER_SPEED: f32 = 5.0;
    const PLAYER_ACCEL: f32 = 0.6;

    #[derive(Debug, thiserror::Error)]
    pub enum DriverError {
        #[error("failed to read config {path}: {source}")]
        Io {
            path: String,
            source: std::io::Error,
        },
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("failed to spawn entity: {0}")]
        Spawn(#[from] EntityError),
    }

    fn load_config() -> Result<SimConfig, DriverError> {
        let Some(path) = std::env::args().nth(1) else {
            return Ok(SimConfig::default());
        };
        let json = std::fs::read_to_string(&path).map_err(|source| DriverError::Io {
            path: path.clone(),
            source,
        })?;
        let config = SimConfig::from_json(&json)?;
        log::info!("loaded config from {path}");
        Ok(config)
    }

    fn populate(world: &mut World, rng: &mut Pcg32) -> Result<(), DriverError> {
        world.spawn(
            EntityBuilder::new(EntityKind::Player, Vec2::ZERO)
                .dynamic(PLAYER_SPEED)
                .radius(20.0),
        )?;

        for _ in 0..ENEMY_COUNT {
            let pos = Vec2::new(
                rng.random_range(-SPAWN_SPREAD..SPAWN_SPREAD),
                rng.random_range(-SPAWN_SPREAD..SPAWN_SPREAD),
            );
            world.spawn(
                EntityBuilder::new(EntityKind::Enemy, pos)
                    .dynamic(3.0)
                    .radius(20.0)
                    .mass(2.0)
                    .restitution(0.3),
            )?;
        }

        log::info!("region populated with {} entities", world.entities().len());
        Ok(())
    }

    /// Steer every dynamic entity: the player circles the origin, enemies
    /// chase the player.
    fn drive(world: &mut World, frame: u32) {
        let player_pos = world
            .entities()
            .iter()
            .find(|e| e.kind == EntityKind::Player)
            .map(|e| e.pos)
            .unwrap_or(Vec2::ZERO);

        let heading = aetherion_physics::direction_from_angle(frame as f32 * 0.02);
        for entity in world.entities_mut() {
            let to_player = (player_pos - entity.pos).normalize_or_zero();
            let kind = entity.kind;
            if let Some(k) = entity.kinematics_mut() {
                k.accel = match kind {
                    EntityKind::Player => heading * PLAYER_ACCEL,
                    _ => to_player * 0.3,
                };
            }
        }
    }

    pub fn run() -> Result<(), DriverError> {
        let config = load_config()?;
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let frame_ms = config.frame_ms as f64;
        let mut clock = FrameClock::new(config.frame_ms, config.max_delta);

        let mut world = World::for_region(config, Region::Valedorn)?;
        populate(&mut world, &mut rng)?;

        let player_hits = Rc::new(Cell::new(0u32));
        let hits = Rc::clone(&player_hits);
        world.on_collision(EntityKind::Player, move |me: &mut Entity, other: &Entity| {
            hits.set(hits.get() + 1);
            log::debug!("player {} bumped by {:?} {}", me.id, other.kind, other.id);
        });

        let mut now = 0.0f64;
        let mut total_contacts = 0usize;
        for frame in 0..FRAMES {
            // Mostly steady frames with the occasional hitch
            now += if rng.random_bool(0.02) {
                frame_ms * 4.0
            } else {
                frame_ms + rng.random_range(-4.0..4.0)
            };
            let dt = clock.advance(now);

            drive(&mut world, frame);
            world.step(dt);

            let sparks: Vec<Vec2> = world
                .contacts()
                .iter()
                .filter_map(|c| world.entity(c.a).map(|e| e.pos + c.normal * e.radius))
                .collect();
            for pos in sparks {
                world.emit_particle(ParticleConfig {
                    vel: Some(Vec2::new(
                        rng.random_range(-2.0..2.0),
                        rng.random_range(-4.0..0.0),
                    )),
                    life: Some(0.5),
                    shape: Some(ParticleShape::Crystal),
                    ..ParticleConfig::at(pos)
                });
            }

            let stats = world.last_stats();
            total_contacts += stats.contacts;
            if frame % 120 == 0 {
                log::info!(
                    "frame {frame}: dt {dt:.3}, {} candidates, {} contacts, {} particles",
                    stats.candidate_pairs,
                    stats.contacts,
                    stats.particles
                );
            }
        }

        let look = world.raycast_where(Vec2::ZERO, 0.0, 1000.0, |e| e.kind != EntityKind::Player);
        log::info!(
            "ran {} ticks: {total_contacts} contacts, {} player hits, raycast east {:?}",
            world.time_ticks(),
            player_hits.get(),
            look
        );
        Ok(())
    }
}
