use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_with::DurationMilliSeconds;
use smart_default::SmartDefault;
use uuid::Uuid;

use crate::prelude::*;

/// Monotonic time source measured from an arbitrary fixed origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

#[derive(Debug)]
pub struct MonotonicClock(Instant);

impl Default for MonotonicClock {
    fn default() -> Self {
        Self(Instant::now())
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn set(&self, now: Duration) {
        self.0.store(as_millis(now), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(as_millis(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.0.load(Ordering::SeqCst))
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Time that must pass between two uses of the same ability.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault)]
#[serde(default)]
pub struct CooldownPolicy {
    #[default(Duration::from_secs(5))]
    #[serde_as(as = "DurationMilliSeconds")]
    pub launch: Duration,

    #[default(Duration::from_secs(8))]
    #[serde_as(as = "DurationMilliSeconds")]
    pub fire_burst: Duration,

    #[default(Duration::from_secs(6))]
    #[serde_as(as = "DurationMilliSeconds")]
    pub dash: Duration,

    #[default(Duration::from_secs(10))]
    #[serde_as(as = "DurationMilliSeconds")]
    pub rock_throw: Duration,
}

impl CooldownPolicy {
    #[must_use]
    pub const fn get(&self, ability: Ability) -> Duration {
        match ability {
            Ability::Launch => self.launch,
            Ability::FireBurst => self.fire_burst,
            Ability::Dash => self.dash,
            Ability::RockThrow => self.rock_throw,
        }
    }
}

/// Last use of every ability by every player.
///
/// Entries are created on first use and overwritten on every later use.
#[derive(Debug, Default)]
pub struct CooldownTable(Mutex<HashMap<Uuid, HashMap<Ability, Duration>>>);

impl CooldownTable {
    /// Records a use at `now` unless the previous use is less than `cooldown` ago.
    ///
    /// # Errors
    /// Will return `Err` with the time left when the ability is still cooling down.
    pub fn try_consume(
        &self,
        player: Uuid,
        ability: Ability,
        now: Duration,
        cooldown: Duration,
    ) -> Result<(), Duration> {
        let mut players = self.0.lock();
        let abilities = players.entry(player).or_default();

        if let Some(last_used) = abilities.get(&ability) {
            let elapsed = now.saturating_sub(*last_used);
            if elapsed < cooldown {
                return Err(cooldown - elapsed);
            }
        }

        abilities.insert(ability, now);
        Ok(())
    }

    #[must_use]
    pub fn last_used(&self, player: Uuid, ability: Ability) -> Option<Duration> {
        self.0
            .lock()
            .get(&player)
            .and_then(|abilities| abilities.get(&ability))
            .copied()
    }

    /// Time left before the ability is ready, zero when it already is.
    #[must_use]
    pub fn remaining(&self, player: Uuid, ability: Ability, now: Duration, cooldown: Duration) -> Duration {
        self.last_used(player, ability).map_or(Duration::ZERO, |last_used| {
            cooldown.saturating_sub(now.saturating_sub(last_used))
        })
    }

    /// Number of recorded (player, ability) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn default_policy() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.get(Ability::Launch), SEC * 5);
        assert_eq!(policy.get(Ability::FireBurst), SEC * 8);
        assert_eq!(policy.get(Ability::Dash), SEC * 6);
        assert_eq!(policy.get(Ability::RockThrow), SEC * 10);
    }

    #[test]
    fn first_use_is_free_and_recorded() {
        let table = CooldownTable::default();
        let player = Uuid::from_u128(1);

        assert!(table.is_empty());
        assert_eq!(table.try_consume(player, Ability::Dash, SEC, SEC * 6), Ok(()));
        assert_eq!(table.last_used(player, Ability::Dash), Some(SEC));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn blocked_use_does_not_overwrite() {
        let table = CooldownTable::default();
        let player = Uuid::from_u128(1);

        table.try_consume(player, Ability::Launch, Duration::ZERO, SEC * 5).unwrap();
        assert_eq!(
            table.try_consume(player, Ability::Launch, SEC * 3, SEC * 5),
            Err(SEC * 2)
        );
        assert_eq!(table.last_used(player, Ability::Launch), Some(Duration::ZERO));
        assert_eq!(table.remaining(player, Ability::Launch, SEC * 4, SEC * 5), SEC);
        assert_eq!(table.try_consume(player, Ability::Launch, SEC * 5, SEC * 5), Ok(()));
        assert_eq!(table.last_used(player, Ability::Launch), Some(SEC * 5));
    }

    #[test]
    fn remaining_is_zero_when_unused() {
        let table = CooldownTable::default();
        assert_eq!(
            table.remaining(Uuid::nil(), Ability::RockThrow, SEC, SEC * 10),
            Duration::ZERO
        );
    }

    #[test]
    fn manual_clock_moves_on_request() {
        let clock = ManualClock::default();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(SEC * 3);
        assert_eq!(clock.now(), SEC * 3);

        clock.set(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(250));
    }

    #[test]
    fn policy_reads_milliseconds() {
        let policy = toml::from_str::<CooldownPolicy>("launch = 1500\ndash = 0").unwrap();
        assert_eq!(policy.launch, Duration::from_millis(1500));
        assert_eq!(policy.dash, Duration::ZERO);
        assert_eq!(policy.fire_burst, SEC * 8);
    }
}
