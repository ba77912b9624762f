#![allow(dead_code)]

use std::collections::HashMap;

use invaders_core::core::{Bus, memory::ProtectedWrite};
use invaders_core::cpu::I8080;

/// Minimal bus for testing: flat 64KB read/write memory, one optional
/// protected range and a scripted port space.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub rom_end: Option<u16>,
    pub port_inputs: HashMap<u16, u8>,
    pub port_writes: Vec<(u16, u8)>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            rom_end: None,
            port_inputs: HashMap::new(),
            port_writes: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) -> Result<(), ProtectedWrite> {
        self.check_write(addr, data)?;
        self.memory[addr as usize] = data;
        Ok(())
    }

    fn check_write(&self, addr: u16, data: u8) -> Result<(), ProtectedWrite> {
        match self.rom_end {
            Some(end) if addr <= end => Err(ProtectedWrite {
                address: addr,
                value: data,
                start: 0,
                end,
            }),
            _ => Ok(()),
        }
    }

    fn io_read(&mut self, port: u16) -> u8 {
        self.port_inputs.get(&port).copied().unwrap_or(0)
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.port_writes.push((port, data));
    }
}

/// Execute `count` instructions, returning the total cycles.
pub fn run(cpu: &mut I8080, bus: &mut TestBus, count: usize) -> u32 {
    let mut cycles = 0;
    for _ in 0..count {
        cycles += cpu.step(bus).expect("step failed");
    }
    cycles
}
