use anyhow::{Context, Result};

use crate::prelude::*;

const RING_POINTS: u32 = 20;
const REACH: Vec3 = Vec3::new(3.0, 2.0, 3.0);
const DAMAGE: f64 = 4.0;
const FIRE_TICKS: u32 = 60;

/// Ring of flames around the player that burns everything close by.
///
/// # Errors
/// Will return `Err` if the player has no position.
pub fn run<W: World>(world: &W, entity: EntityId) -> Result<()> {
    let position = world.position(entity).context("Missing player position")?;
    world.play_sound(position, Sound::FireChargeUse, 1.0, 1.0);

    for i in 0..RING_POINTS {
        let angle = f64::from(i * 360 / RING_POINTS).to_radians();
        let at = position + Vec3::new(angle.cos(), 1.0, angle.sin());
        world.spawn_particles(ParticleBurst::new(
            Particle::Flame,
            at,
            5,
            Vec3::new(0.1, 0.1, 0.1),
            0.01,
        ));
    }

    for target in world.nearby_living(entity, REACH) {
        if target == entity {
            continue;
        }

        world.damage(target, DAMAGE, Some(entity));
        world.set_fire_ticks(target, FIRE_TICKS);
    }

    Ok(())
}
