//! Minimal CP/M environment for 8080 diagnostic programs (cpudiag, 8080PRE,
//! TST8080, 8080EXM).
//!
//! The program is loaded at the TPA (0x0100). BDOS is reduced to the two
//! console calls these programs use: when PC reaches 0x0005 the call is
//! serviced here and the `RET` planted at 0x0005 returns to the caller.
//! Reaching 0x0000 (warm boot) ends the run.

use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use invaders_core::core::{Emulator, LoadError, Memory};
use invaders_core::cpu::StepError;
use invaders_core::device::IoBus;

const TPA: u16 = 0x0100;
const BDOS: u16 = 0x0005;
const WARM_BOOT: u16 = 0x0000;

/// BDOS function 2: print the character in E.
const C_WRITE: u8 = 0x02;
/// BDOS function 9: print the `$`-terminated string at DE.
const C_WRITESTR: u8 = 0x09;

const RET: u8 = 0xC9;
const HLT: u8 = 0x76;

#[derive(Debug, Error)]
pub enum CpmError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("CPU fault: {0}")]
    Step(#[from] StepError),

    #[error("program did not return to CP/M within {0} instructions")]
    StepLimit(u64),
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpmReport {
    pub output: String,
    pub steps: u64,
    pub cycles: u64,
}

pub struct CpmHarness {
    emu: Emulator,
    output: String,
}

impl CpmHarness {
    /// Load a `.COM` file from disk.
    pub fn from_file(path: &Path) -> Result<Self, CpmError> {
        let mut memory = Memory::new();
        let end = memory.load_files(&[path], TPA, false)?;
        info!("{}: {} bytes", path.display(), end - TPA as usize);
        Self::with_memory(memory)
    }

    /// Load a program image held in memory.
    pub fn from_program(program: &[u8]) -> Result<Self, CpmError> {
        let mut memory = Memory::new();
        memory.load(TPA, program)?;
        Self::with_memory(memory)
    }

    fn with_memory(mut memory: Memory) -> Result<Self, CpmError> {
        // HLT at the warm-boot vector, RET at the BDOS entry. 0x0006/0x0007
        // hold the top of the TPA, which some tests load into SP.
        let page_zero = [HLT, 0x00, 0x00, 0x00, 0x00, RET, 0x00, 0xF0];
        memory.load(0x0000, &page_zero)?;
        let mut emu = Emulator::new(memory, IoBus::new());
        emu.cpu.pc = TPA;
        Ok(Self {
            emu,
            output: String::new(),
        })
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emu
    }

    /// Execute until the program warm-boots or `max_steps` instructions have
    /// run.
    pub fn run(&mut self, max_steps: u64) -> Result<CpmReport, CpmError> {
        let mut steps = 0;
        loop {
            if self.emu.cpu.pc == BDOS {
                self.bdos_call();
            }

            self.emu.step()?;
            steps += 1;

            if self.emu.cpu.pc == WARM_BOOT {
                info!("warm boot after {steps} instructions, {} cycles", self.emu.total_cycles());
                return Ok(CpmReport {
                    output: self.output.clone(),
                    steps,
                    cycles: self.emu.total_cycles(),
                });
            }
            if steps >= max_steps {
                return Err(CpmError::StepLimit(max_steps));
            }
        }
    }

    /// Console output collected so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    fn bdos_call(&mut self) {
        let cpu = &self.emu.cpu;
        match cpu.c {
            C_WRITE => self.output.push(cpu.e as char),
            C_WRITESTR => {
                let mut addr = cpu.get_de();
                // Bounded by the address space in case the terminator is missing.
                for _ in 0..=u16::MAX {
                    let ch = self.emu.memory.read(addr);
                    if ch == b'$' {
                        break;
                    }
                    self.output.push(ch as char);
                    addr = addr.wrapping_add(1);
                }
            }
            other => debug!("ignoring BDOS function {other}"),
        }
    }
}
