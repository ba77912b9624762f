//! The board aggregate: one CPU, its memory and its I/O devices.
//!
//! `Emulator` owns every piece of mutable state. Each step it lends the CPU a
//! short-lived [`BoardBus`] over memory and I/O, so nothing is shared and
//! nothing is global.

use log::warn;

use crate::core::{Bus, Memory, memory::ProtectedWrite};
use crate::cpu::{Cpu, I8080, StepError};
use crate::device::IoBus;

/// Borrowed view of the board handed to the CPU for one step.
struct BoardBus<'a> {
    memory: &'a mut Memory,
    io: &'a mut IoBus,
}

impl Bus for BoardBus<'_> {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    fn write(&mut self, addr: u16, data: u8) -> Result<(), ProtectedWrite> {
        self.memory.write(addr, data)
    }

    fn check_write(&self, addr: u16, data: u8) -> Result<(), ProtectedWrite> {
        self.memory.check_write(addr, data)
    }

    // The 8080 puts the port number on both halves of the address bus;
    // only the low byte matters.
    fn io_read(&mut self, port: u16) -> u8 {
        self.io.read(port as u8)
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.io.write(port as u8, data);
    }
}

pub struct Emulator {
    pub cpu: I8080,
    pub memory: Memory,
    pub io: IoBus,
    cycles: u64,
}

impl Emulator {
    pub fn new(memory: Memory, io: IoBus) -> Self {
        Self {
            cpu: I8080::new(),
            memory,
            io,
            cycles: 0,
        }
    }

    /// Execute one instruction (or one idle slot while halted).
    pub fn step(&mut self) -> Result<u32, StepError> {
        let mut bus = BoardBus {
            memory: &mut self.memory,
            io: &mut self.io,
        };
        match self.cpu.step(&mut bus) {
            Ok(cycles) => {
                self.cycles += cycles as u64;
                Ok(cycles)
            }
            Err(err) => {
                if !err.is_fatal() {
                    warn!("{err}");
                }
                Err(err)
            }
        }
    }

    /// Raise `RST vector`. Returns whether the CPU accepted it.
    pub fn interrupt(&mut self, vector: u8) -> Result<bool, StepError> {
        let mut bus = BoardBus {
            memory: &mut self.memory,
            io: &mut self.io,
        };
        self.cpu.interrupt(&mut bus, vector)
    }

    /// Re-zero the CPU, the I/O latches and every unprotected byte of memory.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.io.reset();
        self.memory.clear_unprotected();
        self.cycles = 0;
    }

    /// Cycles executed since construction or the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.cycles
    }
}
