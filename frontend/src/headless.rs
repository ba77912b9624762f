use std::path::Path;

use invaders_core::core::machine::{FrameStatus, Machine};
use invaders_core::cpu::StepError;
use log::{error, info};

use crate::error::FrontendError;
use crate::input::InputScript;
use crate::screenshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub halted: bool,
}

/// Run up to `frames` frames, feeding the scripted inputs before each one.
/// Stops early when the machine halts for good.
pub fn run_frames(
    machine: &mut dyn Machine,
    frames: u64,
    script: &InputScript,
) -> Result<RunSummary, StepError> {
    for frame in 0..frames {
        script.apply(machine, frame);
        if machine.run_frame()? == FrameStatus::Halted {
            info!("CPU halted with interrupts disabled after {} frames", frame + 1);
            return Ok(RunSummary {
                frames: frame + 1,
                halted: true,
            });
        }
    }
    Ok(RunSummary {
        frames,
        halted: false,
    })
}

/// [`run_frames`], dumping memory to `fault_dump` if the machine faults.
pub fn run_with_fault_dump(
    machine: &mut dyn Machine,
    frames: u64,
    script: &InputScript,
    fault_dump: &Path,
) -> Result<RunSummary, FrontendError> {
    match run_frames(machine, frames, script) {
        Ok(summary) => Ok(summary),
        Err(fault) => {
            error!("{fault}");
            if let Err(e) = screenshot::dump_core(machine, fault_dump) {
                error!("core dump failed: {e}");
            }
            Err(fault.into())
        }
    }
}
