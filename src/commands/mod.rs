pub mod ability;

use std::collections::VecDeque;

use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::prelude::*;

pub const COMMAND_PREFIX: &str = "/";

pub trait Cmd {
    fn aliases(&self) -> Vec<&'static str>;

    fn execute(&self, event: &CmdEvent, dispatcher: &Dispatcher) -> MsgEvent;
}

/// Compile time checked list of commands
#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter)]
pub enum Cmds {
    Ability(AbilityCommand),
}

impl Cmds {
    /// Case-insensitive alias lookup, without the prefix.
    #[must_use]
    pub fn find(alias: &str) -> Option<Self> {
        let alias = alias.to_lowercase();
        Self::iter().find(|cmds| match cmds {
            Self::Ability(cmd) => cmd.aliases().contains(&alias.as_str()),
        })
    }

    #[must_use]
    pub fn execute(&self, event: &CmdEvent, dispatcher: &Dispatcher) -> MsgEvent {
        match self {
            Self::Ability(cmd) => cmd.execute(event, dispatcher),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CmdSender {
    Console,
    Player(Uuid),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CmdEvent {
    /// Optional command arguments
    pub args:   VecDeque<String>,
    pub cmd:    Cmds,
    pub sender: CmdSender,
}

impl CmdEvent {
    /// Parses a chat line such as `/ability 2`; returns `None` for plain chat and unknown commands.
    #[must_use]
    pub fn parse(sender: CmdSender, content: &str) -> Option<Self> {
        let mut args = content
            .split(' ')
            .filter(|arg| !arg.is_empty())
            .map(String::from)
            .collect::<VecDeque<_>>();

        let alias = args.pop_front()?;
        let alias = alias.strip_prefix(COMMAND_PREFIX)?;
        let cmd = Cmds::find(alias)?;

        Some(Self { args, cmd, sender })
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ChatColor {
    #[strum(to_string = "§b")]
    Aqua,
    #[strum(to_string = "§9")]
    Blue,
    #[strum(to_string = "§7")]
    Gray,
    #[strum(to_string = "§c")]
    Red,
    #[strum(to_string = "§e")]
    Yellow,
}

impl ChatColor {
    /// ANSI escape used when echoing chat to a terminal.
    #[must_use]
    pub const fn ansi(self) -> &'static str {
        match self {
            Self::Aqua => "\x1b[96m",
            Self::Blue => "\x1b[94m",
            Self::Gray => "\x1b[37m",
            Self::Red => "\x1b[91m",
            Self::Yellow => "\x1b[93m",
        }
    }
}

/// Reply sent back to whoever ran the command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MsgEvent {
    pub color:   ChatColor,
    pub content: String,
    pub sender:  CmdSender,
}

impl MsgEvent {
    #[must_use]
    pub fn new(sender: CmdSender, color: ChatColor, content: impl Into<String>) -> Self {
        Self {
            color,
            content: content.into(),
            sender,
        }
    }

    /// Legacy section-sign formatted text, as a Minecraft server would send it.
    #[must_use]
    pub fn legacy(&self) -> String {
        format!("{}{}", self.color, self.content)
    }

    /// Text colored for an ANSI terminal.
    #[must_use]
    pub fn ansi(&self) -> String {
        format!("{}{}\x1b[0m", self.color.ansi(), self.content)
    }
}
