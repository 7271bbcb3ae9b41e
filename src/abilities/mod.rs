pub mod dash;
pub mod fire_burst;
pub mod launch;
pub mod rock_throw;

use std::sync::Arc;

use anyhow::{Context, Result};
use derive_more::{Display, Error};
use parking_lot::Mutex;
use strum::EnumCount;
use uuid::Uuid;

use crate::prelude::*;

/// Compile time checked list of abilities, numbered as typed in chat.
#[derive(Clone, Copy, Debug, Display, EnumCount, EnumIter, Eq, FromRepr, Hash, PartialEq)]
#[repr(u8)]
pub enum Ability {
    Launch = 1,
    FireBurst = 2,
    Dash = 3,
    RockThrow = 4,
}

impl Ability {
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// # Errors
    /// Will return `Err` if `arg` is empty, not an integer, or not a known ability number.
    pub fn parse_arg(arg: &str) -> Result<Self, ArgumentError> {
        if arg.is_empty() {
            return Err(ArgumentError::Missing);
        }

        let id = arg.parse::<i32>().map_err(|_| ArgumentError::NotANumber)?;
        u8::try_from(id)
            .ok()
            .and_then(Self::from_repr)
            .ok_or(ArgumentError::OutOfRange)
    }

    /// Chat line sent to the player when the ability fires.
    #[must_use]
    pub const fn flavor(self) -> &'static str {
        match self {
            Self::Launch => "💫 Air Burst!",
            Self::FireBurst => "🔥 Fire Burst!",
            Self::Dash => "⚡ Dash!",
            Self::RockThrow => "🪨 Rock Throw!",
        }
    }

    #[must_use]
    pub const fn color(self) -> ChatColor {
        match self {
            Self::Launch => ChatColor::Aqua,
            Self::FireBurst => ChatColor::Red,
            Self::Dash => ChatColor::Blue,
            Self::RockThrow => ChatColor::Gray,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ArgumentError {
    #[display("Usage: /ability <1-{}>", Ability::COUNT)]
    Missing,
    #[display("Invalid ability number!")]
    NotANumber,
    #[display("Ability number must be between 1 and {}!", Ability::COUNT)]
    OutOfRange,
}

/// Performs the in-world consequences of an ability that passed its cooldown.
pub trait EffectExecutor: Send + Sync {
    /// # Errors
    /// Will return `Err` if the effect could not be started.
    fn run(&self, ability: Ability, player: Uuid) -> Result<()>;
}

/// Runs abilities against a [`World`], scheduling multi-tick parts on the shared scheduler.
pub struct AbilityEffects<W> {
    world:     Arc<W>,
    scheduler: Arc<Mutex<TickScheduler<W>>>,
}

impl<W: World> AbilityEffects<W> {
    pub const fn new(world: Arc<W>, scheduler: Arc<Mutex<TickScheduler<W>>>) -> Self {
        Self { world, scheduler }
    }
}

impl<W: World> EffectExecutor for AbilityEffects<W> {
    fn run(&self, ability: Ability, player: Uuid) -> Result<()> {
        let entity = self
            .world
            .player(player)
            .with_context(|| format!("Player {player} is not in the world"))?;

        let world = self.world.as_ref();
        let mut scheduler = self.scheduler.lock();
        match ability {
            Ability::Launch => launch::run(world, &mut *scheduler, player, entity),
            Ability::FireBurst => fire_burst::run(world, entity),
            Ability::Dash => dash::run(world, &mut *scheduler, player, entity),
            Ability::RockThrow => rock_throw::run(world, &mut *scheduler, player, entity),
        }
    }
}

/// Keeps a scheduled effect alive only while its player is still online.
fn online<W: World>(player: Uuid) -> impl FnMut(&W, u32) -> bool + Send + 'static {
    move |world: &W, _| world.player(player).is_some()
}
