pub mod core;
pub mod cpu;
pub mod device;

pub mod prelude {
    pub use crate::core::machine::{FrameStatus, InputButton, Machine};
    pub use crate::core::{Bus, Emulator, Memory, MirrorPolicy, ProtectedWrite};
    pub use crate::cpu::{Cpu, I8080, StepError};
    pub use crate::device::IoBus;
}
