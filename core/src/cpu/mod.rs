/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Return to the power-on state.
    fn reset(&mut self);

    /// Query if CPU is halted internally (HLT instruction)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, I8080State};

// Intel 8080
pub mod i8080;
pub use i8080::{I8080, StepError};
