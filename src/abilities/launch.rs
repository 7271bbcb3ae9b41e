use anyhow::{Context, Result};
use uuid::Uuid;

use crate::prelude::*;

const VELOCITY: Vec3 = Vec3::new(0.0, 2.5, 0.0);
const TRAIL_PERIOD: u64 = 2;
/// Runs 0 through 21, unless the player lands first.
const TRAIL_RUNS: u32 = 22;

/// Throws the player straight up and leaves a cloud trail until they land.
///
/// # Errors
/// Will return `Err` if the player has no position.
pub fn run<W: World>(
    world: &W,
    scheduler: &mut TickScheduler<W>,
    player: Uuid,
    entity: EntityId,
) -> Result<()> {
    let position = world.position(entity).context("Missing player position")?;

    world.set_velocity(entity, VELOCITY);
    world.play_sound(position, Sound::EnderDragonFlap, 1.0, 1.3);

    let task = Task::timer("launch trail", 0, TRAIL_PERIOD, move |world: &W, _| {
        let Some(at) = world.player(player).and_then(|id| world.position(id)) else {
            return;
        };

        world.spawn_particles(ParticleBurst::new(
            Particle::Cloud,
            at,
            10,
            Vec3::new(0.3, 0.2, 0.3),
            0.01,
        ));
        world.spawn_particles(ParticleBurst::new(
            Particle::EndRod,
            at,
            5,
            Vec3::new(0.1, 0.1, 0.1),
            0.02,
        ));
    })
    .limit(TRAIL_RUNS)
    .until(move |world, _| world.player(player).is_none_or(|id| world.is_on_ground(id)));

    scheduler.submit(task);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn particles(log: &[WorldEvent], particle: Particle) -> usize {
        log.iter()
            .filter(|event| matches!(event, WorldEvent::Particles(burst) if burst.particle == particle))
            .count()
    }

    #[test]
    fn launches_and_trails_until_landing() {
        let world = Arc::new(SimWorld::recording());
        let scheduler = Arc::new(Mutex::new(TickScheduler::default()));
        let effects = AbilityEffects::new(world.clone(), scheduler.clone());
        let player = world.join("Steve");
        let entity = world.player(player).unwrap();

        effects.run(Ability::Launch, player).unwrap();
        let log = world.take_log();
        assert_eq!(log[0], WorldEvent::Velocity {
            entity,
            velocity: VELOCITY,
        });
        assert!(matches!(log[1], WorldEvent::Sound {
            sound: Sound::EnderDragonFlap,
            ..
        }));

        for _ in 0..100 {
            world.step();
            scheduler.lock().tick(&*world);
        }

        let log = world.take_log();
        assert_eq!(particles(&log, Particle::Cloud), 22);
        assert_eq!(particles(&log, Particle::EndRod), 22);
        assert!(scheduler.lock().is_empty());
    }

    #[test]
    fn landing_tick_still_leaves_a_trail() {
        let world = Arc::new(SimWorld::recording());
        let scheduler = Arc::new(Mutex::new(TickScheduler::default()));
        let effects = AbilityEffects::new(world.clone(), scheduler.clone());
        let player = world.join("Steve");
        let entity = world.player(player).unwrap();

        effects.run(Ability::Launch, player).unwrap();
        for _ in 0..6 {
            world.step();
            scheduler.lock().tick(&*world);
        }
        assert_eq!(particles(&world.log(), Particle::Cloud), 3);

        world.set_velocity(entity, Vec3::ZERO);
        world.teleport(entity, Vec3::ZERO);
        for _ in 0..10 {
            world.step();
            scheduler.lock().tick(&*world);
        }

        assert_eq!(particles(&world.log(), Particle::Cloud), 4);
        assert!(scheduler.lock().is_empty());
    }

    #[test]
    fn trail_stops_when_player_leaves() {
        let world = Arc::new(SimWorld::recording());
        let scheduler = Arc::new(Mutex::new(TickScheduler::default()));
        let effects = AbilityEffects::new(world.clone(), scheduler.clone());
        let player = world.join("Steve");

        effects.run(Ability::Launch, player).unwrap();
        world.step();
        scheduler.lock().tick(&*world);
        world.leave(player);
        world.take_log();

        for _ in 0..10 {
            world.step();
            scheduler.lock().tick(&*world);
        }

        assert_eq!(particles(&world.log(), Particle::Cloud), 0);
        assert!(scheduler.lock().is_empty());
    }
}
