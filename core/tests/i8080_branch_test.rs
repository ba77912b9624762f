use invaders_core::cpu::I8080;
mod common;
use common::{TestBus, run};

fn setup(program: &[u8]) -> (I8080, TestBus) {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.pc = 0x0100;
    cpu.sp = 0x2400;
    bus.load(0x0100, program);
    (cpu, bus)
}

// ============================================================
// Jumps
// ============================================================

#[test]
fn test_jmp() {
    let (mut cpu, mut bus) = setup(&[0xC3, 0x00, 0x02]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 10);
    assert_eq!(cpu.pc, 0x0200);
}

#[test]
fn test_jz_not_taken_falls_through() {
    let (mut cpu, mut bus) = setup(&[0xCA, 0x00, 0x02]);
    cpu.flags.z = false;
    assert_eq!(run(&mut cpu, &mut bus, 1), 10);
    assert_eq!(cpu.pc, 0x0103);
}

#[test]
fn test_jnz_taken() {
    let (mut cpu, mut bus) = setup(&[0xC2, 0x34, 0x12]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 10);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_jcc_condition_table() {
    // (opcode, flag setter, taken when flag set)
    type Setter = fn(&mut I8080, bool);
    let cases: [(u8, Setter, bool); 8] = [
        (0xC2, |c, v| c.flags.z = v, false), // JNZ
        (0xCA, |c, v| c.flags.z = v, true),  // JZ
        (0xD2, |c, v| c.flags.cy = v, false), // JNC
        (0xDA, |c, v| c.flags.cy = v, true), // JC
        (0xE2, |c, v| c.flags.p = v, false), // JPO
        (0xEA, |c, v| c.flags.p = v, true),  // JPE
        (0xF2, |c, v| c.flags.s = v, false), // JP
        (0xFA, |c, v| c.flags.s = v, true),  // JM
    ];

    for (opcode, set, taken_when_set) in cases {
        for flag in [false, true] {
            let (mut cpu, mut bus) = setup(&[opcode, 0x00, 0x30]);
            set(&mut cpu, flag);
            run(&mut cpu, &mut bus, 1);
            let expected = if flag == taken_when_set { 0x3000 } else { 0x0103 };
            assert_eq!(cpu.pc, expected, "opcode 0x{opcode:02X} flag={flag}");
        }
    }
}

#[test]
fn test_pchl() {
    let (mut cpu, mut bus) = setup(&[0xE9]);
    cpu.set_hl(0x4321);
    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc, 0x4321);
}

// ============================================================
// Calls and returns
// ============================================================

#[test]
fn test_call_then_ret_returns_past_call() {
    let (mut cpu, mut bus) = setup(&[0xCD, 0x00, 0x02]);
    bus.load(0x0200, &[0xC9]);

    assert_eq!(run(&mut cpu, &mut bus, 1), 17);
    assert_eq!(cpu.pc, 0x0200);
    assert_eq!(cpu.sp, 0x23FE);
    assert_eq!(bus.memory[0x23FF], 0x01, "return address high byte");
    assert_eq!(bus.memory[0x23FE], 0x03, "return address low byte");

    assert_eq!(run(&mut cpu, &mut bus, 1), 10);
    assert_eq!(cpu.pc, 0x0103);
    assert_eq!(cpu.sp, 0x2400);
}

#[test]
fn test_cnz_not_taken() {
    let (mut cpu, mut bus) = setup(&[0xC4, 0x00, 0x02]);
    cpu.flags.z = true;
    assert_eq!(run(&mut cpu, &mut bus, 1), 11);
    assert_eq!(cpu.pc, 0x0103);
    assert_eq!(cpu.sp, 0x2400);
}

#[test]
fn test_cz_taken() {
    let (mut cpu, mut bus) = setup(&[0xCC, 0x00, 0x02]);
    cpu.flags.z = true;
    assert_eq!(run(&mut cpu, &mut bus, 1), 17);
    assert_eq!(cpu.pc, 0x0200);
    assert_eq!(cpu.sp, 0x23FE);
}

#[test]
fn test_rz_not_taken() {
    let (mut cpu, mut bus) = setup(&[0xC8]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc, 0x0101);
    assert_eq!(cpu.sp, 0x2400);
}

#[test]
fn test_rz_taken() {
    let (mut cpu, mut bus) = setup(&[0xC8]);
    cpu.flags.z = true;
    cpu.sp = 0x23FE;
    bus.load(0x23FE, &[0x50, 0x00]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 11);
    assert_eq!(cpu.pc, 0x0050);
    assert_eq!(cpu.sp, 0x2400);
}

#[test]
fn test_rst_pushes_next_address() {
    let (mut cpu, mut bus) = setup(&[0xFF]); // RST 7
    assert_eq!(run(&mut cpu, &mut bus, 1), 11);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(bus.memory[0x23FF], 0x01);
    assert_eq!(bus.memory[0x23FE], 0x01);
}

#[test]
fn test_rst_vectors() {
    for n in 0..8u8 {
        let (mut cpu, mut bus) = setup(&[0xC7 | (n << 3)]);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.pc, n as u16 * 8);
    }
}
