use anyhow::{Context, Result};
use uuid::Uuid;

use super::online;
use crate::prelude::*;

const SPEED: f64 = 2.5;
/// Ticks 0 through 11.
const TRAIL_RUNS: u32 = 12;

/// Pushes the player where they are looking, with a crit trail.
///
/// # Errors
/// Will return `Err` if the player has no position or direction.
pub fn run<W: World>(
    world: &W,
    scheduler: &mut TickScheduler<W>,
    player: Uuid,
    entity: EntityId,
) -> Result<()> {
    let position = world.position(entity).context("Missing player position")?;
    let direction = world.direction(entity).context("Missing player direction")?;

    world.set_velocity(entity, direction.normalize() * SPEED);
    world.play_sound(position, Sound::EndermanTeleport, 1.0, 1.5);

    let task = Task::timer("dash trail", 0, 1, move |world: &W, _| {
        if let Some(at) = world.player(player).and_then(|id| world.position(id)) {
            world.spawn_particles(ParticleBurst::new(
                Particle::Crit,
                at,
                10,
                Vec3::new(0.2, 0.2, 0.2),
                0.05,
            ));
        }
    })
    .limit(TRAIL_RUNS)
    .run_while(online::<W>(player));

    scheduler.submit(task);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_along_facing_direction() {
        let world = SimWorld::recording();
        let mut scheduler = TickScheduler::default();
        let player = world.join("Steve");
        let entity = world.player(player).unwrap();
        world.look(entity, Vec3::new(3.0, 0.0, 4.0));

        run(&world, &mut scheduler, player, entity).unwrap();
        let velocity = world.velocity(entity).unwrap();
        assert!((velocity.x - 1.5).abs() < 1e-9);
        assert!((velocity.z - 2.0).abs() < 1e-9);

        let ran = (0..20).map(|_| scheduler.tick(&world)).sum::<usize>();
        assert_eq!(ran, 12);

        let crits = world
            .log()
            .iter()
            .filter(|event| matches!(event, WorldEvent::Particles(burst) if burst.particle == Particle::Crit))
            .count();
        assert_eq!(crits, 12);
    }
}
