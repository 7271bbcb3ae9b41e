pub use super::{
    abilities::*,
    commands::{ability::*, *},
    console::*,
    cooldowns::*,
    dispatcher::*,
    scheduler::*,
    settings::*,
    world::{sim::*, *},
    *,
};
