use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::MissedTickBehavior,
};

use crate::prelude::*;

/// One line typed into the server console.
#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleLine {
    /// `Steve: /ability 1` or `Steve: hello`
    Chat { name: String, content: String },
    /// `/ability 1`, sent by the console itself
    Command(String),
    /// `spawn 0 1.5 3`
    Spawn(Vec3),
    /// `look Steve 0 0 1`
    Look { name: String, direction: Vec3 },
    /// `leave Steve`
    Leave(String),
}

impl ConsoleLine {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some((_whole, name, content)) = regex_captures!(r"^([a-zA-Z_0-9]{1,16}): (.+)$", line) {
            return Some(Self::Chat {
                name:    str!(name),
                content: str!(content),
            });
        }

        if line.starts_with(COMMAND_PREFIX) {
            return Some(Self::Command(str!(line)));
        }

        if let Some((_whole, x, y, z)) = regex_captures!(r"^spawn (\S+) (\S+) (\S+)$", line) {
            return parse_vec3(x, y, z).map(Self::Spawn);
        }

        if let Some((_whole, name, x, y, z)) =
            regex_captures!(r"^look ([a-zA-Z_0-9]{1,16}) (\S+) (\S+) (\S+)$", line)
        {
            let direction = parse_vec3(x, y, z)?;
            return Some(Self::Look {
                name: str!(name),
                direction,
            });
        }

        regex_captures!(r"^leave ([a-zA-Z_0-9]{1,16})$", line).map(|(_whole, name)| Self::Leave(str!(name)))
    }
}

fn parse_vec3(x: &str, y: &str, z: &str) -> Option<Vec3> {
    Some(Vec3::new(x.parse().ok()?, y.parse().ok()?, z.parse().ok()?))
}

/// Stand-in server: a simulated world, its tick scheduler, and the ability command.
pub struct Console {
    world:      Arc<SimWorld>,
    scheduler:  Arc<Mutex<TickScheduler<SimWorld>>>,
    dispatcher: Dispatcher,
}

impl Console {
    #[must_use]
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self::with_world(settings, clock, Arc::new(SimWorld::default()))
    }

    #[must_use]
    pub fn with_world(settings: &Settings, clock: Arc<dyn Clock>, world: Arc<SimWorld>) -> Self {
        let scheduler = Arc::new(Mutex::new(TickScheduler::default()));
        let effects = AbilityEffects::new(world.clone(), scheduler.clone());
        let dispatcher = Dispatcher::new(settings.cooldowns.clone(), clock, Arc::new(effects));

        Self {
            world,
            scheduler,
            dispatcher,
        }
    }

    #[must_use]
    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    /// Advances the world and runs scheduled effects for one host tick.
    pub fn tick(&self) {
        for hit in self.world.step() {
            rock_throw::on_projectile_hit(self.world.as_ref(), &hit);
        }

        self.scheduler.lock().tick(self.world.as_ref());
    }

    /// Handles a console line, returning the command reply if it produced one.
    pub fn handle_line(&self, line: &str) -> Option<MsgEvent> {
        let Some(parsed) = ConsoleLine::parse(line) else {
            warn!("Unknown console input: {line}");
            return None;
        };

        match parsed {
            ConsoleLine::Chat { name, content } => {
                let uuid = self.world.join(&name);
                let sender = CmdSender::Player(uuid);
                let Some(event) = CmdEvent::parse(sender, &content) else {
                    info!("<{name}> {content}");
                    return None;
                };

                let msg = event.cmd.execute(&event, &self.dispatcher);
                info!("[{name}] {}", msg.ansi());
                Some(msg)
            }
            ConsoleLine::Command(content) => {
                let Some(event) = CmdEvent::parse(CmdSender::Console, &content) else {
                    warn!("Unknown command: {content}");
                    return None;
                };

                let msg = event.cmd.execute(&event, &self.dispatcher);
                info!("{}", msg.ansi());
                Some(msg)
            }
            ConsoleLine::Spawn(position) => {
                let id = self.world.spawn_mob(position);
                info!("Spawned mob {id} at {position}");
                None
            }
            ConsoleLine::Look { name, direction } => {
                match self.world.player(SimWorld::offline_uuid(&name)) {
                    Some(id) => self.world.look(id, direction),
                    None => warn!("{name} is not online"),
                }
                None
            }
            ConsoleLine::Leave(name) => {
                if self.world.leave(SimWorld::offline_uuid(&name)) {
                    info!("{name} left the game");
                }
                None
            }
        }
    }
}

/// # Run the console host until stdin closes or Ctrl-C
///
/// # Errors
/// Will return `Err` if reading stdin fails.
pub async fn start() -> Result<()> {
    let settings = Settings::load().unwrap_or_else(|error| {
        error!("Error loading settings: {error}");
        Settings::default()
    });

    let console = Console::new(&settings, Arc::new(MonotonicClock::default()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticks = tokio::time::interval(settings.tick_interval());
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Multi-Ability plugin enabled");
    loop {
        tokio::select! {
            _ = ticks.tick() => console.tick(),
            line = lines.next_line() => match line? {
                Some(line) => {
                    console.handle_line(&line);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Multi-Ability plugin disabled");
    Ok(())
}
