use std::{sync::Arc, time::Duration};

use derive_more::{Display, Error, From};
use uuid::Uuid;

use crate::prelude::*;

#[derive(Clone, Copy, Debug, Display, Eq, Error, From, PartialEq)]
pub enum AbilityError {
    #[display("{_0}")]
    #[from]
    InvalidArgument(ArgumentError),
    #[display("Wait {:?}s before using that ability again!", seconds(*remaining))]
    OnCooldown { remaining: Duration },
    #[display("Only players can use this command!")]
    WrongSenderType,
}

/// Whole milliseconds as seconds, rounded up so a blocked player never sees zero.
fn seconds(remaining: Duration) -> f64 {
    let millis = remaining.as_nanos().div_ceil(1_000_000);
    u32::try_from(millis).map_or(f64::MAX, f64::from) / 1000.0
}

/// Validates ability requests, enforces cooldowns, and starts the effects.
pub struct Dispatcher {
    policy:   CooldownPolicy,
    table:    CooldownTable,
    clock:    Arc<dyn Clock>,
    executor: Arc<dyn EffectExecutor>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(policy: CooldownPolicy, clock: Arc<dyn Clock>, executor: Arc<dyn EffectExecutor>) -> Self {
        Self {
            policy,
            table: CooldownTable::default(),
            clock,
            executor,
        }
    }

    /// Runs the ability named by `raw_arg` for `player`.
    ///
    /// The cooldown is spent as soon as the check passes, even if the effect then fails.
    ///
    /// # Errors
    /// Will return `Err` if `raw_arg` is not an ability number or the ability is cooling down.
    pub fn dispatch(&self, player: Uuid, raw_arg: &str) -> Result<Ability, AbilityError> {
        let ability = Ability::parse_arg(raw_arg)?;
        let cooldown = self.policy.get(ability);

        self.table
            .try_consume(player, ability, self.clock.now(), cooldown)
            .map_err(|remaining| {
                debug!("{player} tried {ability} with {remaining:?} left");
                AbilityError::OnCooldown { remaining }
            })?;

        debug!("{player} used {ability}");
        if let Err(error) = self.executor.run(ability, player) {
            warn!("Failed to run {ability} for {player}: {error:#}");
        }

        Ok(ability)
    }

    /// Time before `player` can use `ability` again.
    #[must_use]
    pub fn remaining(&self, player: Uuid, ability: Ability) -> Duration {
        self.table
            .remaining(player, ability, self.clock.now(), self.policy.get(ability))
    }

    #[must_use]
    pub const fn cooldowns(&self) -> &CooldownTable {
        &self.table
    }
}
