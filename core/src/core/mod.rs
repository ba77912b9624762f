pub mod bus;
pub mod emulator;
pub mod machine;
pub mod memory;

pub use bus::Bus;
pub use emulator::Emulator;
pub use machine::{FrameStatus, InputButton, Machine};
pub use memory::{LoadError, Memory, MirrorPolicy, ProtectedWrite};
