use invaders_core::core::machine::{FrameStatus, Machine};
use invaders_core::cpu::StepError;
use invaders_machines::invaders::{
    INPUT_COIN, INPUT_P1_FIRE, INPUT_TILT, INVADERS_PROGRAM_ROM, InvadersSystem,
};
use invaders_machines::registry;
use invaders_machines::rom_loader::{RomLoadError, RomSet};

/// Sets up a stack, enables interrupts and spins. RST 1 counts in C, RST 2
/// counts in B.
const FRAME_COUNTER: &[u8] = &[
    0x31, 0x00, 0x24, // 0000 LXI SP,2400h
    0xFB, //             0003 EI
    0xC3, 0x04, 0x00, // 0004 JMP 0004h
    0x00, //             0007
    0x0C, 0xFB, 0xC9, // 0008 INR C; EI; RET
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x04, 0xFB, 0xC9, // 0010 INR B; EI; RET
];

fn system_with(program: &[u8]) -> InvadersSystem {
    let mut sys = InvadersSystem::new();
    sys.load_program(program).unwrap();
    sys
}

// =================================================================
// Machine Trait Tests
// =================================================================

#[test]
fn test_display_size_is_rotated() {
    let sys = InvadersSystem::new();
    assert_eq!(sys.display_size(), (224, 256));
}

#[test]
fn test_input_map_has_all_buttons() {
    let sys = InvadersSystem::new();
    let map = sys.input_map();
    assert_eq!(map.len(), 10);
    for (i, button) in map.iter().enumerate() {
        assert_eq!(button.id as usize, i);
        assert!(!button.name.is_empty());
    }
}

#[test]
fn test_video_ram_view() {
    let sys = InvadersSystem::new();
    assert_eq!(sys.video_ram().len(), 0x1C00);
}

#[test]
fn test_memory_dump_is_full_size() {
    let sys = InvadersSystem::new();
    assert_eq!(sys.memory_dump().len(), 0x10000);
}

// =================================================================
// Frame timing and interrupts
// =================================================================

#[test]
fn test_frame_fires_both_interrupts() {
    let mut sys = system_with(FRAME_COUNTER);

    assert_eq!(sys.run_frame(), Ok(FrameStatus::Running));
    assert_eq!(sys.emulator().cpu.c, 1, "RST 1 handler ran at mid-frame");
    // RST 2 is taken last: the handler is entered but has not run yet.
    assert_eq!(sys.emulator().cpu.pc, 0x0010);
    assert_eq!(sys.emulator().cpu.b, 0);

    sys.run_frame().unwrap();
    assert_eq!(sys.emulator().cpu.b, 1, "RST 2 handler ran at start of frame");
    assert_eq!(sys.emulator().cpu.c, 2);
    assert_eq!(sys.emulator().cpu.pc, 0x0010);
}

#[test]
fn test_frame_runs_about_one_sixtieth_of_a_second() {
    let mut sys = system_with(FRAME_COUNTER);
    for _ in 0..10 {
        sys.run_frame().unwrap();
    }
    let cycles = sys.emulator().total_cycles();
    // 10 frames of 33 333 cycles, with at most one instruction of overshoot.
    assert!((333_330..333_330 + 20).contains(&cycles), "{cycles}");
}

#[test]
fn test_hlt_with_interrupts_disabled_reports_halted() {
    let mut sys = system_with(&[0x76]);
    assert_eq!(sys.run_frame(), Ok(FrameStatus::Halted));
    assert_eq!(sys.run_frame(), Ok(FrameStatus::Halted));
}

#[test]
fn test_write_into_rom_is_fatal() {
    let mut sys = system_with(&[0x32, 0x00, 0x00]); // STA 0000h
    let err = sys.run_frame().unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, StepError::ProtectedWrite(w) if w.address == 0x0000));
}

#[test]
fn test_mirrored_write_reaches_video_ram() {
    // MVI A,01h; STA 6400h; HLT
    let mut sys = system_with(&[0x3E, 0x01, 0x32, 0x00, 0x64, 0x76]);
    assert_eq!(sys.run_frame(), Ok(FrameStatus::Halted));
    assert_eq!(sys.video_ram()[0], 0x01);
}

// =================================================================
// Rendering
// =================================================================

#[test]
fn test_render_rotates_counter_clockwise() {
    // First byte of VRAM, bit 0 = native (0, 0) -> bottom-left of the screen.
    // Last byte, bit 7 = native (255, 223) -> top-right.
    let mut sys = system_with(&[0x3E, 0x01, 0x32, 0x00, 0x24, 0x3E, 0x80, 0x32, 0xFF, 0x3F, 0x76]);
    sys.run_frame().unwrap();

    let (w, h) = sys.display_size();
    let (w, h) = (w as usize, h as usize);
    let mut buffer = vec![0u8; w * h * 3];
    sys.render_frame(&mut buffer);

    let pixel = |x: usize, y: usize| &buffer[(y * w + x) * 3..(y * w + x) * 3 + 3];
    assert_eq!(pixel(0, h - 1), &[0xFF, 0xFF, 0xFF]);
    assert_eq!(pixel(w - 1, 0), &[0xFF, 0xFF, 0xFF]);
    assert_eq!(pixel(0, 0), &[0, 0, 0]);
    assert_eq!(buffer.iter().filter(|&&b| b == 0xFF).count(), 6);
}

// =================================================================
// Inputs
// =================================================================

#[test]
fn test_inputs_map_to_ports() {
    let mut sys = InvadersSystem::new();
    assert_eq!(sys.emulator().io.input(1), Some(0x08), "bit 3 tied high");

    sys.set_input(INPUT_COIN, true);
    sys.set_input(INPUT_P1_FIRE, true);
    assert_eq!(sys.emulator().io.input(1), Some(0x19));

    sys.set_input(INPUT_COIN, false);
    assert_eq!(sys.emulator().io.input(1), Some(0x18));

    sys.set_input(INPUT_TILT, true);
    assert_eq!(sys.emulator().io.input(2), Some(0x04));
}

#[test]
fn test_unknown_button_is_ignored() {
    let mut sys = InvadersSystem::new();
    sys.set_input(200, true);
    assert_eq!(sys.emulator().io.input(1), Some(0x08));
    assert_eq!(sys.emulator().io.input(2), Some(0x00));
}

#[test]
fn test_reset_keeps_rom_clears_ram() {
    let mut sys = system_with(FRAME_COUNTER);
    sys.run_frame().unwrap();
    // Low byte of the interrupted PC (the JMP at 0x0004).
    assert_eq!(sys.emulator().memory.read(0x23FE), 0x04);

    sys.reset();

    assert_eq!(sys.emulator().cpu.pc, 0);
    assert_eq!(sys.emulator().memory.read(0x0000), 0x31);
    assert_eq!(sys.emulator().memory.read(0x23FE), 0);
}

// =================================================================
// ROM loading and registry
// =================================================================

fn blank_rom_set() -> RomSet {
    let blank = [0u8; 0x800];
    RomSet::from_slices(&[
        ("invaders.h", &blank),
        ("invaders.g", &blank),
        ("invaders.f", &blank),
        ("invaders.e", &blank),
    ])
}

#[test]
fn test_rom_region_layout() {
    assert_eq!(INVADERS_PROGRAM_ROM.size, 0x2000);
    let names: Vec<_> = INVADERS_PROGRAM_ROM.entries.iter().map(|e| e.name).collect();
    assert_eq!(names, ["invaders.h", "invaders.g", "invaders.f", "invaders.e"]);
}

#[test]
fn test_bad_checksum_rejected_unless_skipped() {
    let set = blank_rom_set();
    let mut sys = InvadersSystem::new();
    assert!(matches!(
        sys.load_rom_set(&set, true),
        Err(RomLoadError::ChecksumMismatch { .. })
    ));
    assert!(sys.load_rom_set(&set, false).is_ok());
}

#[test]
fn test_registry_finds_invaders() {
    let entry = registry::find("invaders").expect("registered");
    assert_eq!(entry.rom_name, "invaders");
    assert!(registry::all().iter().any(|e| e.name == "invaders"));

    let machine = (entry.create)(&blank_rom_set(), false).unwrap();
    assert_eq!(machine.display_size(), (224, 256));
}
