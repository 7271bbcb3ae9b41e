use std::collections::{BTreeMap, HashMap};

use bounded_counter::BoundedCounter;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::prelude::*;

const PLAYER_EYE_HEIGHT: f64 = 1.62;
const PLAYER_HEALTH: f64 = 20.0;
const HIT_RADIUS: f64 = 1.0;

/// Recorded engine call, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    Sound {
        sound:  Sound,
        at:     Vec3,
        volume: f32,
        pitch:  f32,
    },
    Particles(ParticleBurst),
    Velocity {
        entity:   EntityId,
        velocity: Vec3,
    },
    Damage {
        entity: EntityId,
        amount: f64,
        source: Option<EntityId>,
    },
    Ignite {
        entity: EntityId,
        ticks:  u32,
    },
    Launch {
        shooter:    EntityId,
        projectile: EntityId,
    },
    Removed(EntityId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Player { uuid: Uuid, name: String },
    Mob,
    Projectile {
        name:    String,
        item:    Material,
        shooter: EntityId,
        landed:  bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimEntity {
    pub kind:       EntityKind,
    pub position:   Vec3,
    pub velocity:   Vec3,
    pub direction:  Vec3,
    pub on_ground:  bool,
    pub health:     f64,
    pub fire_ticks: u32,
}

impl SimEntity {
    fn new(kind: EntityKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            velocity: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, 1.0),
            on_ground: position.y <= 0.0,
            health: PLAYER_HEALTH,
            fire_ticks: 0,
        }
    }

    const fn is_living(&self) -> bool {
        !matches!(self.kind, EntityKind::Projectile { .. })
    }

    /// Gravity and drag per tick, roughly matching vanilla.
    const fn physics(&self) -> (f64, f64) {
        match self.kind {
            EntityKind::Projectile { .. } => (0.03, 0.99),
            _ => (0.08, 0.98),
        }
    }
}

#[derive(Default)]
struct SimState {
    next_id:   BoundedCounter<u64>,
    entities:  BTreeMap<EntityId, SimEntity>,
    players:   HashMap<Uuid, EntityId>,
    recording: bool,
    log:       Vec<WorldEvent>,
}

impl SimState {
    fn insert(&mut self, entity: SimEntity) -> EntityId {
        self.next_id.next();
        let id = EntityId(*self.next_id);
        self.entities.insert(id, entity);
        id
    }

    fn record(&mut self, event: WorldEvent) {
        if self.recording {
            self.log.push(event);
        }
    }
}

/// In-memory flat world used by the console host and tests.
///
/// Ground is the plane `y = 0`. Engine calls are only kept in the event log
/// for worlds built with [`SimWorld::recording`].
#[derive(Default)]
pub struct SimWorld {
    state: Mutex<SimState>,
}

impl SimWorld {
    /// A world that keeps every engine call in its event log.
    #[must_use]
    pub fn recording() -> Self {
        let world = Self::default();
        world.state.lock().recording = true;
        world
    }

    /// Stable offline-mode identifier for a player name.
    #[must_use]
    pub fn offline_uuid(name: &str) -> Uuid {
        Uuid::new_v3(&Uuid::NAMESPACE_OID, format!("OfflinePlayer:{name}").as_bytes())
    }

    /// Adds the player at the origin, or returns the existing session.
    pub fn join(&self, name: &str) -> Uuid {
        let uuid = Self::offline_uuid(name);
        let mut state = self.state.lock();
        if !state.players.contains_key(&uuid) {
            let kind = EntityKind::Player {
                uuid,
                name: str!(name),
            };

            let id = state.insert(SimEntity::new(kind, Vec3::ZERO));
            state.players.insert(uuid, id);
            info!("{name} joined the game");
        }

        uuid
    }

    pub fn leave(&self, uuid: Uuid) -> bool {
        let mut state = self.state.lock();
        let Some(id) = state.players.remove(&uuid) else {
            return false;
        };

        state.entities.remove(&id);
        true
    }

    pub fn spawn_mob(&self, position: Vec3) -> EntityId {
        let id = self
            .state
            .lock()
            .insert(SimEntity::new(EntityKind::Mob, position));
        debug!("Spawned mob {id} at {position}");
        id
    }

    pub fn teleport(&self, entity: EntityId, position: Vec3) {
        if let Some(e) = self.state.lock().entities.get_mut(&entity) {
            e.position = position;
            e.on_ground = position.y <= 0.0;
        }
    }

    pub fn look(&self, entity: EntityId, direction: Vec3) {
        if let Some(e) = self.state.lock().entities.get_mut(&entity) {
            e.direction = direction.normalize();
        }
    }

    #[must_use]
    pub fn entity(&self, entity: EntityId) -> Option<SimEntity> {
        self.state.lock().entities.get(&entity).cloned()
    }

    #[must_use]
    pub fn log(&self) -> Vec<WorldEvent> {
        self.state.lock().log.clone()
    }

    pub fn take_log(&self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.state.lock().log)
    }

    /// Advances physics by one tick and returns the projectile collisions it produced.
    pub fn step(&self) -> Vec<ProjectileHit> {
        let mut state = self.state.lock();
        let mut hits = Vec::new();

        for entity in state.entities.values_mut() {
            if matches!(entity.kind, EntityKind::Projectile { landed: true, .. }) {
                continue;
            }

            let (gravity, drag) = entity.physics();
            entity.position += entity.velocity;
            entity.velocity.y -= gravity;
            entity.velocity = entity.velocity * drag;
            entity.fire_ticks = entity.fire_ticks.saturating_sub(1);

            if entity.position.y <= 0.0 {
                entity.position.y = 0.0;
                entity.velocity.y = 0.0;
                entity.velocity.x *= 0.6;
                entity.velocity.z *= 0.6;
                entity.on_ground = true;
            } else {
                entity.on_ground = false;
            }
        }

        let living = state
            .entities
            .iter()
            .filter(|(_, e)| e.is_living())
            .map(|(id, e)| (*id, e.position))
            .collect::<Vec<_>>();

        for (id, entity) in &mut state.entities {
            let EntityKind::Projectile {
                name,
                shooter,
                landed,
                ..
            } = &mut entity.kind
            else {
                continue;
            };

            if *landed {
                continue;
            }

            let hit_entity = living
                .iter()
                .filter(|(other, _)| *other != *shooter)
                .find(|(_, position)| position.distance(entity.position) <= HIT_RADIUS)
                .map(|(other, _)| *other);

            if hit_entity.is_none() && !entity.on_ground {
                continue;
            }

            *landed = true;
            hits.push(ProjectileHit {
                projectile: *id,
                name: Some(name.clone()),
                position: entity.position,
                velocity: entity.velocity,
                shooter: Some(*shooter),
                hit_entity,
            });
        }

        hits
    }
}

impl World for SimWorld {
    fn player(&self, player: Uuid) -> Option<EntityId> {
        self.state.lock().players.get(&player).copied()
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.state.lock().entities.get(&entity).map(|e| e.position)
    }

    fn direction(&self, entity: EntityId) -> Option<Vec3> {
        self.state.lock().entities.get(&entity).map(|e| e.direction)
    }

    fn velocity(&self, entity: EntityId) -> Option<Vec3> {
        self.state.lock().entities.get(&entity).map(|e| e.velocity)
    }

    fn set_velocity(&self, entity: EntityId, velocity: Vec3) {
        let mut state = self.state.lock();
        if let Some(e) = state.entities.get_mut(&entity) {
            e.velocity = velocity;
            state.record(WorldEvent::Velocity { entity, velocity });
        }
    }

    fn is_on_ground(&self, entity: EntityId) -> bool {
        self.state
            .lock()
            .entities
            .get(&entity)
            .is_some_and(|e| e.on_ground)
    }

    fn nearby_living(&self, entity: EntityId, range: Vec3) -> Vec<EntityId> {
        let state = self.state.lock();
        let Some(center) = state.entities.get(&entity).map(|e| e.position) else {
            return Vec::new();
        };

        state
            .entities
            .iter()
            .filter(|(id, e)| **id != entity && e.is_living())
            .filter(|(_, e)| {
                let delta = e.position - center;
                delta.x.abs() <= range.x && delta.y.abs() <= range.y && delta.z.abs() <= range.z
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn damage(&self, entity: EntityId, amount: f64, source: Option<EntityId>) {
        let mut state = self.state.lock();
        let Some(e) = state.entities.get_mut(&entity) else {
            return;
        };

        e.health = (e.health - amount).max(0.0);
        let died = e.health <= 0.0 && e.kind == EntityKind::Mob;
        info!("{entity} took {amount} damage ({} health left)", e.health);

        state.record(WorldEvent::Damage {
            entity,
            amount,
            source,
        });

        if died {
            state.entities.remove(&entity);
            state.record(WorldEvent::Removed(entity));
        }
    }

    fn set_fire_ticks(&self, entity: EntityId, ticks: u32) {
        let mut state = self.state.lock();
        if let Some(e) = state.entities.get_mut(&entity) {
            e.fire_ticks = ticks;
            state.record(WorldEvent::Ignite { entity, ticks });
        }
    }

    fn play_sound(&self, at: Vec3, sound: Sound, volume: f32, pitch: f32) {
        debug!("Sound {sound} at {at}");
        self.state.lock().record(WorldEvent::Sound {
            sound,
            at,
            volume,
            pitch,
        });
    }

    fn spawn_particles(&self, burst: ParticleBurst) {
        trace!("{} x{} at {}", burst.particle, burst.count, burst.at);
        self.state.lock().record(WorldEvent::Particles(burst));
    }

    fn launch_projectile(&self, shooter: EntityId, projectile: Projectile) -> Option<EntityId> {
        let mut state = self.state.lock();
        let origin = state.entities.get(&shooter)?.position;

        let kind = EntityKind::Projectile {
            name: str!(projectile.name),
            item: projectile.item,
            shooter,
            landed: false,
        };

        let mut entity = SimEntity::new(kind, origin + Vec3::new(0.0, PLAYER_EYE_HEIGHT, 0.0));
        entity.velocity = projectile.velocity;
        entity.on_ground = false;

        let id = state.insert(entity);
        state.record(WorldEvent::Launch {
            shooter,
            projectile: id,
        });

        Some(id)
    }

    fn remove(&self, entity: EntityId) {
        let mut state = self.state.lock();
        if state.entities.remove(&entity).is_some() {
            state.players.retain(|_, id| *id != entity);
            state.record(WorldEvent::Removed(entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_idempotent() {
        let world = SimWorld::recording();
        let first = world.join("Steve");
        let second = world.join("Steve");

        assert_eq!(first, second);
        assert_eq!(world.player(first), world.player(second));
        assert_ne!(first, SimWorld::offline_uuid("Alex"));
    }

    #[test]
    fn launched_player_leaves_and_returns_to_ground() {
        let world = SimWorld::recording();
        let uuid = world.join("Steve");
        let id = world.player(uuid).unwrap();

        world.set_velocity(id, Vec3::new(0.0, 2.5, 0.0));
        world.step();
        assert!(!world.is_on_ground(id));

        let landed = (0..200).any(|_| {
            world.step();
            world.is_on_ground(id)
        });
        assert!(landed);
    }

    #[test]
    fn nearby_living_uses_box_range() {
        let world = SimWorld::recording();
        let uuid = world.join("Steve");
        let id = world.player(uuid).unwrap();
        let near = world.spawn_mob(Vec3::new(2.0, 1.0, -3.0));
        let _far = world.spawn_mob(Vec3::new(4.0, 0.0, 0.0));

        assert_eq!(world.nearby_living(id, Vec3::new(3.0, 2.0, 3.0)), vec![near]);
    }

    #[test]
    fn projectile_hits_entity_in_path() {
        let world = SimWorld::recording();
        let uuid = world.join("Steve");
        let shooter = world.player(uuid).unwrap();
        let target = world.spawn_mob(Vec3::new(0.0, 1.62, 2.0));

        let projectile = Projectile {
            name:     "Rock",
            item:     Material::Cobblestone,
            velocity: Vec3::new(0.0, 0.0, 1.5),
        };
        let rock = world.launch_projectile(shooter, projectile).unwrap();

        let hit = (0..20).find_map(|_| world.step().pop()).unwrap();
        assert_eq!(hit.projectile, rock);
        assert_eq!(hit.hit_entity, Some(target));
        assert_eq!(hit.shooter, Some(shooter));
        assert_eq!(hit.name.as_deref(), Some("Rock"));

        // landed projectiles do not hit again
        assert!(world.step().is_empty());
    }

    #[test]
    fn default_world_keeps_no_log() {
        let world = SimWorld::default();
        let uuid = world.join("Steve");
        let id = world.player(uuid).unwrap();

        world.set_velocity(id, Vec3::new(0.0, 1.0, 0.0));
        world.play_sound(Vec3::ZERO, Sound::StoneBreak, 1.0, 1.0);
        assert!(world.log().is_empty());
        assert_eq!(world.velocity(id), Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn mobs_are_removed_when_killed() {
        let world = SimWorld::recording();
        let mob = world.spawn_mob(Vec3::ZERO);

        world.damage(mob, 25.0, None);
        assert!(world.entity(mob).is_none());
        assert_eq!(world.log().last(), Some(&WorldEvent::Removed(mob)));
    }
}
