use log::info;

use invaders_core::core::machine::{FrameStatus, InputButton, Machine};
use invaders_core::core::{Emulator, Memory, MirrorPolicy};
use invaders_core::cpu::StepError;
use invaders_core::device::IoBus;

use crate::registry::MachineEntry;
use crate::rom_loader::{RomEntry, RomLoadError, RomRegion, RomSet};

// ---------------------------------------------------------------------------
// Space Invaders ROM definitions
// ---------------------------------------------------------------------------

/// Program ROM: 8KB at 0x0000-0x1FFF, four 2KB chips loaded h, g, f, e.
pub static INVADERS_PROGRAM_ROM: RomRegion = RomRegion {
    size: 0x2000,
    entries: &[
        RomEntry {
            name: "invaders.h",
            size: 0x0800,
            offset: 0x0000,
            crc32: Some(0x734f5ad8),
        },
        RomEntry {
            name: "invaders.g",
            size: 0x0800,
            offset: 0x0800,
            crc32: Some(0x6bfaca4a),
        },
        RomEntry {
            name: "invaders.f",
            size: 0x0800,
            offset: 0x1000,
            crc32: Some(0x0ccead96),
        },
        RomEntry {
            name: "invaders.e",
            size: 0x0800,
            offset: 0x1800,
            crc32: Some(0x14e538b0),
        },
    ],
};

const ROM_END: u16 = 0x1FFF;
/// A0-A13 are decoded; everything above folds back onto ROM/RAM.
const ADDRESS_MASK: u16 = 0x3FFF;

pub const VRAM_START: u16 = 0x2400;
pub const VRAM_END: u16 = 0x3FFF;

/// Native raster before the monitor's rotation: 256 pixels per line, 224 lines.
const NATIVE_WIDTH: usize = 256;
const NATIVE_HEIGHT: usize = 224;

// ---------------------------------------------------------------------------
// Input button IDs
// ---------------------------------------------------------------------------
pub const INPUT_COIN: u8 = 0;
pub const INPUT_P2_START: u8 = 1;
pub const INPUT_P1_START: u8 = 2;
pub const INPUT_P1_FIRE: u8 = 3;
pub const INPUT_P1_LEFT: u8 = 4;
pub const INPUT_P1_RIGHT: u8 = 5;
pub const INPUT_TILT: u8 = 6;
pub const INPUT_P2_FIRE: u8 = 7;
pub const INPUT_P2_LEFT: u8 = 8;
pub const INPUT_P2_RIGHT: u8 = 9;

const INVADERS_INPUT_MAP: &[InputButton] = &[
    InputButton { id: INPUT_COIN, name: "Coin" },
    InputButton { id: INPUT_P2_START, name: "P2 Start" },
    InputButton { id: INPUT_P1_START, name: "P1 Start" },
    InputButton { id: INPUT_P1_FIRE, name: "P1 Fire" },
    InputButton { id: INPUT_P1_LEFT, name: "P1 Left" },
    InputButton { id: INPUT_P1_RIGHT, name: "P1 Right" },
    InputButton { id: INPUT_TILT, name: "Tilt" },
    InputButton { id: INPUT_P2_FIRE, name: "P2 Fire" },
    InputButton { id: INPUT_P2_LEFT, name: "P2 Left" },
    InputButton { id: INPUT_P2_RIGHT, name: "P2 Right" },
];

/// (port, bit) wired to each button, indexed by button ID. All active-high.
const INPUT_WIRING: [(u8, u8); 10] = [
    (1, 0), // Coin
    (1, 1), // P2 Start
    (1, 2), // P1 Start
    (1, 4), // P1 Fire
    (1, 5), // P1 Left
    (1, 6), // P1 Right
    (2, 2), // Tilt
    (2, 4), // P2 Fire
    (2, 5), // P2 Left
    (2, 6), // P2 Right
];

/// Port 1 bit 3 is tied high. Port 2 DIP switches: 3 lives, bonus at 1500.
const INPUT1_POWER_ON: u8 = 0x08;
const INPUT2_POWER_ON: u8 = 0x00;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
// CPU clock: 2 MHz, 60 Hz refresh.
// RST 1 fires when the beam reaches mid-screen, RST 2 at VBLANK.
const CYCLES_PER_FRAME: u32 = 2_000_000 / 60;
const CYCLES_PER_HALF_FRAME: u32 = CYCLES_PER_FRAME / 2;

/// Space Invaders (Taito / Midway, 1978)
///
/// Hardware: Intel 8080 @ 2 MHz, MB14241 shift register, discrete sound.
/// Video: 256x224 1bpp bitmap, monitor rotated 90 degrees counter-clockwise.
///
/// Memory map:
///   0x0000-0x1FFF  Program ROM (8KB)
///   0x2000-0x23FF  Work RAM (1KB)
///   0x2400-0x3FFF  Video RAM (7KB)
///   0x4000-0xFFFF  Mirror of 0x0000-0x3FFF
pub struct InvadersSystem {
    emu: Emulator,
    /// Cycles already executed into the current frame.
    frame_cycles: u32,
}

impl Default for InvadersSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InvadersSystem {
    /// Board with blank (but already write-protected) ROM.
    pub fn new() -> Self {
        let mut memory = Memory::with_mirror(MirrorPolicy::Mask(ADDRESS_MASK));
        memory.protect(0x0000, ROM_END);
        Self {
            emu: Emulator::new(memory, IoBus::with_inputs(INPUT1_POWER_ON, INPUT2_POWER_ON)),
            frame_cycles: 0,
        }
    }

    pub fn load_rom_set(&mut self, rom_set: &RomSet, verify_checksums: bool) -> Result<(), RomLoadError> {
        let program = INVADERS_PROGRAM_ROM.load(rom_set, verify_checksums)?;
        self.load_program(&program)?;
        info!("loaded {} bytes of program ROM", program.len());
        Ok(())
    }

    /// Place raw bytes at 0x0000 (test programs, patched ROMs).
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), RomLoadError> {
        self.emu.memory.load(0x0000, program)?;
        Ok(())
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emu
    }

    pub fn emulator_mut(&mut self) -> &mut Emulator {
        &mut self.emu
    }

    /// Run until the frame counter reaches `target`, stopping early if the
    /// CPU halts for good.
    fn run_until(&mut self, target: u32) -> Result<FrameStatus, StepError> {
        while self.frame_cycles < target {
            if !self.emu.cpu.can_wake() {
                return Ok(FrameStatus::Halted);
            }
            self.frame_cycles += self.emu.step()?;
        }
        Ok(FrameStatus::Running)
    }
}

impl Machine for InvadersSystem {
    fn display_size(&self) -> (u32, u32) {
        (NATIVE_HEIGHT as u32, NATIVE_WIDTH as u32)
    }

    fn run_frame(&mut self) -> Result<FrameStatus, StepError> {
        if self.run_until(CYCLES_PER_HALF_FRAME)? == FrameStatus::Halted {
            return Ok(FrameStatus::Halted);
        }
        self.emu.interrupt(1)?;

        if self.run_until(CYCLES_PER_FRAME)? == FrameStatus::Halted {
            return Ok(FrameStatus::Halted);
        }
        self.emu.interrupt(2)?;

        // Overshoot from the last instruction counts toward the next frame.
        self.frame_cycles -= CYCLES_PER_FRAME;
        Ok(FrameStatus::Running)
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        let out_w = NATIVE_HEIGHT;
        buffer.fill(0);

        // Each native line is 32 bytes, LSB = leftmost pixel. The monitor is
        // rotated CCW, so native (x, y) lands at (y, 255 - x).
        for (i, &byte) in self.video_ram().iter().enumerate() {
            if byte == 0 {
                continue;
            }
            let native_y = i / 32;
            for bit in 0..8 {
                if byte & (1 << bit) == 0 {
                    continue;
                }
                let native_x = (i % 32) * 8 + bit;
                let out_x = native_y;
                let out_y = NATIVE_WIDTH - 1 - native_x;
                let offset = (out_y * out_w + out_x) * 3;
                buffer[offset..offset + 3].fill(0xFF);
            }
        }
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        if let Some(&(port, bit)) = INPUT_WIRING.get(button as usize) {
            self.emu.io.handle_input(port, bit, pressed);
        }
    }

    fn input_map(&self) -> &[InputButton] {
        INVADERS_INPUT_MAP
    }

    fn reset(&mut self) {
        self.emu.reset();
        self.frame_cycles = 0;
    }

    fn video_ram(&self) -> &[u8] {
        self.emu.memory.slice(VRAM_START..=VRAM_END)
    }

    fn memory_dump(&self) -> Vec<u8> {
        self.emu.memory.copy_all()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn create_machine(rom_set: &RomSet, verify_checksums: bool) -> Result<Box<dyn Machine>, RomLoadError> {
    let mut sys = InvadersSystem::new();
    sys.load_rom_set(rom_set, verify_checksums)?;
    Ok(Box::new(sys))
}

inventory::submit! {
    MachineEntry::new("invaders", "invaders", create_machine)
}
