//! Machine registry for automatic front-end discovery.
//!
//! Each front-end-capable machine self-registers via [`inventory::submit!`]
//! with a [`MachineEntry`] containing its CLI name, MAME ROM set name, and a
//! factory function. The front-end discovers available machines at runtime
//! without any central list.

use invaders_core::core::machine::Machine;

use crate::rom_loader::{RomLoadError, RomSet};

/// Factory signature: build a machine from a ROM set, optionally checking
/// CRC32s.
pub type CreateFn = fn(&RomSet, bool) -> Result<Box<dyn Machine>, RomLoadError>;

/// Describes a front-end-capable arcade machine.
pub struct MachineEntry {
    /// CLI name used to select this machine (e.g., "invaders").
    pub name: &'static str,
    /// MAME ROM set name for ZIP lookup.
    pub rom_name: &'static str,
    pub create: CreateFn,
}

impl MachineEntry {
    pub const fn new(name: &'static str, rom_name: &'static str, create: CreateFn) -> Self {
        Self {
            name,
            rom_name,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// Return all registered front-end-capable machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a machine by its CLI name.
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
