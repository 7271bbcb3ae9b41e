use anyhow::{Context, Result};
use uuid::Uuid;

use super::online;
use crate::prelude::*;

/// Projectile name used to recognize rocks on impact.
pub const ROCK: &str = "Rock";

const ROCKS: u64 = 3;
const ROCK_INTERVAL: u64 = 10;
const ROCK_SPEED: f64 = 1.5;
const HIT_DAMAGE: f64 = 3.0;
const KNOCKBACK: f64 = 0.6;

/// Throws three cobblestone rocks half a second apart.
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
    world.play_sound(position, Sound::PlayerAttackStrong, 1.0, 0.9);

    for i in 0..ROCKS {
        let task = Task::later("rock throw", i * ROCK_INTERVAL, move |world: &W| {
            throw(world, player);
        })
        .run_while(online::<W>(player));

        scheduler.submit(task);
    }

    Ok(())
}

fn throw<W: World>(world: &W, player: Uuid) {
    let Some(shooter) = world.player(player) else {
        return;
    };

    let Some(direction) = world.direction(shooter) else {
        return;
    };

    let projectile = Projectile {
        name:     ROCK,
        item:     Material::Cobblestone,
        velocity: direction * ROCK_SPEED,
    };

    let Some(rock) = world.launch_projectile(shooter, projectile) else {
        return;
    };

    if let Some(at) = world.position(rock) {
        world.spawn_particles(ParticleBurst::new(
            Particle::Block(Material::Cobblestone),
            at,
            15,
            Vec3::new(0.2, 0.2, 0.2),
            0.1,
        ));
    }
}

/// Host callback for projectile impacts; ignores anything that is not a rock.
pub fn on_projectile_hit<W: World>(world: &W, hit: &ProjectileHit) {
    if hit.name.as_deref() != Some(ROCK) {
        return;
    }

    world.play_sound(hit.position, Sound::StoneBreak, 1.0, 1.0);
    world.spawn_particles(ParticleBurst::new(
        Particle::Block(Material::Cobblestone),
        hit.position,
        20,
        Vec3::new(0.3, 0.3, 0.3),
        0.2,
    ));

    if let Some(target) = hit.hit_entity {
        let knockback = hit.velocity.normalize() * KNOCKBACK;
        world.damage(target, HIT_DAMAGE, hit.shooter);

        // the hit may have killed the target
        if let Some(velocity) = world.velocity(target) {
            world.set_velocity(target, velocity + knockback);
        }

        if let Some(at) = world.position(target) {
            world.play_sound(at, Sound::PlayerHurt, 1.0, 1.0);
        }
    }

    world.remove(hit.projectile);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launches(world: &SimWorld) -> usize {
        world
            .log()
            .iter()
            .filter(|event| matches!(event, WorldEvent::Launch { .. }))
            .count()
    }

    #[test]
    fn throws_three_rocks_over_twenty_ticks() {
        let world = SimWorld::recording();
        let mut scheduler = TickScheduler::default();
        let player = world.join("Steve");
        let entity = world.player(player).unwrap();

        run(&world, &mut scheduler, player, entity).unwrap();
        assert_eq!(scheduler.len(), 3);

        scheduler.tick(&world);
        assert_eq!(launches(&world), 1);

        for _ in 1..10 {
            scheduler.tick(&world);
        }
        assert_eq!(launches(&world), 2);

        for _ in 10..20 {
            scheduler.tick(&world);
        }
        assert_eq!(launches(&world), 3);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn rocks_stop_when_player_leaves() {
        let world = SimWorld::recording();
        let mut scheduler = TickScheduler::default();
        let player = world.join("Steve");
        let entity = world.player(player).unwrap();

        run(&world, &mut scheduler, player, entity).unwrap();
        scheduler.tick(&world);
        world.leave(player);

        for _ in 0..30 {
            scheduler.tick(&world);
        }
        assert_eq!(launches(&world), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn rock_hit_damages_and_knocks_back() {
        let world = SimWorld::recording();
        let player = world.join("Steve");
        let shooter = world.player(player).unwrap();
        let target = world.spawn_mob(Vec3::new(0.0, 0.0, 3.0));
        let rock = world
            .launch_projectile(shooter, Projectile {
                name:     ROCK,
                item:     Material::Cobblestone,
                velocity: Vec3::new(0.0, 0.0, 1.5),
            })
            .unwrap();
        world.take_log();

        on_projectile_hit(&world, &ProjectileHit {
            projectile: rock,
            name:       Some(str!(ROCK)),
            position:   Vec3::new(0.0, 1.0, 3.0),
            velocity:   Vec3::new(0.0, 0.0, 1.5),
            shooter:    Some(shooter),
            hit_entity: Some(target),
        });

        let log = world.log();
        assert!(log.contains(&WorldEvent::Damage {
            entity: target,
            amount: HIT_DAMAGE,
            source: Some(shooter),
        }));
        assert!(log.contains(&WorldEvent::Removed(rock)));

        let velocity = world.velocity(target).unwrap();
        assert!((velocity.z - KNOCKBACK).abs() < 1e-9);
        assert!(world.entity(rock).is_none());
    }

    #[test]
    fn ground_hit_only_removes_rock() {
        let world = SimWorld::recording();
        let player = world.join("Steve");
        let shooter = world.player(player).unwrap();
        let rock = world
            .launch_projectile(shooter, Projectile {
                name:     ROCK,
                item:     Material::Cobblestone,
                velocity: Vec3::new(0.0, -1.0, 0.0),
            })
            .unwrap();

        let hit = (0..10).find_map(|_| world.step().pop()).unwrap();
        assert_eq!(hit.hit_entity, None);
        world.take_log();

        on_projectile_hit(&world, &hit);
        let log = world.log();
        assert!(!log.iter().any(|event| matches!(event, WorldEvent::Damage { .. })));
        assert_eq!(log.last(), Some(&WorldEvent::Removed(rock)));
    }

    #[test]
    fn other_projectiles_are_ignored() {
        let world = SimWorld::recording();
        on_projectile_hit(&world, &ProjectileHit {
            projectile: EntityId(42),
            name:       Some(str!("Snowball")),
            position:   Vec3::ZERO,
            velocity:   Vec3::ZERO,
            shooter:    None,
            hit_entity: None,
        });

        assert!(world.log().is_empty());
    }
}
