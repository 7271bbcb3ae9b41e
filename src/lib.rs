#[macro_use]
extern crate lazy_regex;
#[macro_use]
extern crate serde_with;
#[macro_use]
extern crate str_macro;
#[macro_use]
extern crate strum;
#[macro_use]
extern crate tracing;

pub mod abilities;
pub mod commands;
pub mod console;
pub mod cooldowns;
pub mod dispatcher;
pub mod prelude;
pub mod scheduler;
pub mod settings;
pub mod world;

pub use crate::{console::start, dispatcher::Dispatcher, settings::Settings};

pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
