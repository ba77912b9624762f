pub mod cpm;
pub mod invaders;
pub mod registry;
pub mod rom_loader;

pub use cpm::{CpmError, CpmHarness, CpmReport};
pub use invaders::InvadersSystem;
