use std::{
    fs::File,
    io::{ErrorKind, Read, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::prelude::*;

const FILE_NAME: &str = "ability-settings.toml";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault)]
#[serde(default)]
pub struct Settings {
    /// Host game ticks per second.
    #[default(20)] /* Vanilla Default */
    pub ticks_per_second: u32,

    /// Per-ability cooldowns in milliseconds.
    pub cooldowns: CooldownPolicy,
}

impl Settings {
    /// Next to the executable in debug builds, in the working directory otherwise.
    ///
    /// # Errors
    /// Will return `Err` if `std::env::current_exe` or `std::env::current_dir` fails.
    pub fn path() -> Result<PathBuf> {
        let path = if cfg!(debug_assertions) {
            std::env::current_exe()?.with_file_name(FILE_NAME)
        } else {
            std::env::current_dir()?.join(FILE_NAME)
        };

        Ok(path)
    }

    /// # Errors
    /// Will return `Err` if `File::open`, `File::read_to_string`, or `toml::from_str` fails.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match File::open(&path) {
            Err(error) if error.kind() == ErrorKind::NotFound => Self::default().save(),
            Err(error) => bail!(error),
            Ok(mut file) => {
                let mut text = String::new();
                file.read_to_string(&mut text)?;

                Ok(toml::from_str(&text)?)
            }
        }
    }

    /// # Errors
    /// Will return `Err` if `File::options`, `toml::to_string_pretty`, or `File::write_all` fails.
    pub fn save(self) -> Result<Self> {
        let path = Self::path()?;
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let text = toml::to_string_pretty(&self)?;
        file.write_all(text.as_bytes())?;

        Ok(self)
    }

    /// Real time between two host ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second.max(1)
    }
}
