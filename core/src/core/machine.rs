use crate::cpu::StepError;

/// Describes a single input button that a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "P1 Left", "Coin").
    pub name: &'static str,
}

/// Outcome of one emulated frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    /// The CPU executed HLT with interrupts disabled and can never resume.
    Halted,
}

/// Machine-agnostic interface for emulated systems.
///
/// The frontend drives a machine frame by frame and never touches the
/// board's ports, memory map or video format directly.
pub trait Machine {
    /// Native display resolution as (width, height) in pixels, after any
    /// monitor rotation.
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the clock by one frame's worth of
    /// cycles, raising the board's periodic interrupts on the way).
    ///
    /// A fatal fault (a write into ROM) ends the frame early with the error.
    fn run_frame(&mut self) -> Result<FrameStatus, StepError>;

    /// Render the current video state into an RGB24 pixel buffer.
    ///
    /// The buffer must be at least `width * height * 3` bytes (from `display_size()`).
    /// Pixels are stored left-to-right, top-to-bottom, 3 bytes per pixel (R, G, B).
    fn render_frame(&self, buffer: &mut [u8]);

    /// Handle an input event. `button` is a machine-defined ID from `input_map()`.
    /// `pressed` is true for key-down, false for key-up.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// Get the list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);

    /// Raw video RAM as the board lays it out.
    fn video_ram(&self) -> &[u8];

    /// Full-size snapshot of the address space.
    fn memory_dump(&self) -> Vec<u8>;

    fn frame_rate_hz(&self) -> f64 {
        60.0
    }
}
