pub mod sim;

use derive_more::{Add, AddAssign, Display, From, Into, Mul, Neg, Sub};
use uuid::Uuid;

/// Host engine entity handle.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct EntityId(pub u64);

#[derive(Add, AddAssign, Clone, Copy, Debug, Default, Display, Mul, Neg, PartialEq, Sub)]
#[display("({x:.2}, {y:.2}, {z:.2})")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y)).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::ZERO;
        }

        self * (1.0 / length)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Material {
    Cobblestone,
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Particle {
    Cloud,
    EndRod,
    Flame,
    Crit,
    #[display("Block({_0})")]
    Block(Material),
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Sound {
    EnderDragonFlap,
    FireChargeUse,
    EndermanTeleport,
    PlayerAttackStrong,
    StoneBreak,
    PlayerHurt,
}

/// A single particle spawn call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBurst {
    pub particle: Particle,
    pub at:       Vec3,
    pub count:    u32,
    pub offset:   Vec3,
    pub speed:    f64,
}

impl ParticleBurst {
    #[must_use]
    pub const fn new(particle: Particle, at: Vec3, count: u32, offset: Vec3, speed: f64) -> Self {
        Self {
            particle,
            at,
            count,
            offset,
            speed,
        }
    }
}

/// Projectile launched from an entity's eyes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub name:     &'static str,
    pub item:     Material,
    pub velocity: Vec3,
}

/// Delivered by the host when a projectile collides with a block or entity.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileHit {
    pub projectile: EntityId,
    pub name:       Option<String>,
    pub position:   Vec3,
    pub velocity:   Vec3,
    pub shooter:    Option<EntityId>,
    pub hit_entity: Option<EntityId>,
}

/// Engine primitives the abilities are built from.
///
/// Calls for entities that no longer exist are ignored by implementations.
pub trait World: Send + Sync + 'static {
    fn player(&self, player: Uuid) -> Option<EntityId>;

    fn position(&self, entity: EntityId) -> Option<Vec3>;

    /// Normalized facing direction.
    fn direction(&self, entity: EntityId) -> Option<Vec3>;

    fn velocity(&self, entity: EntityId) -> Option<Vec3>;

    fn set_velocity(&self, entity: EntityId, velocity: Vec3);

    fn is_on_ground(&self, entity: EntityId) -> bool;

    /// Living entities within `range` on each axis, excluding `entity` itself.
    fn nearby_living(&self, entity: EntityId, range: Vec3) -> Vec<EntityId>;

    fn damage(&self, entity: EntityId, amount: f64, source: Option<EntityId>);

    fn set_fire_ticks(&self, entity: EntityId, ticks: u32);

    fn play_sound(&self, at: Vec3, sound: Sound, volume: f32, pitch: f32);

    fn spawn_particles(&self, burst: ParticleBurst);

    fn launch_projectile(&self, shooter: EntityId, projectile: Projectile) -> Option<EntityId>;

    fn remove(&self, entity: EntityId);
}
