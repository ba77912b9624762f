use invaders_core::cpu::{I8080, StepError};
mod common;
use common::{TestBus, run};

#[test]
fn test_push_b() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    cpu.set_bc(0x1234);
    bus.load(0x0000, &[0xC5]); // PUSH B

    assert_eq!(run(&mut cpu, &mut bus, 1), 11);
    assert_eq!(cpu.sp, 0x23FE);
    assert_eq!(bus.memory[0x23FF], 0x12);
    assert_eq!(bus.memory[0x23FE], 0x34);
}

#[test]
fn test_push_pop_moves_pair() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    cpu.set_hl(0xBEEF);
    bus.load(0x0000, &[0xE5, 0xD1]); // PUSH H; POP D

    assert_eq!(run(&mut cpu, &mut bus, 2), 21);
    assert_eq!(cpu.get_de(), 0xBEEF);
    assert_eq!(cpu.sp, 0x2400);
}

#[test]
fn test_push_psw_layout() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    cpu.a = 0x42;
    cpu.flags.s = true;
    cpu.flags.z = true;
    cpu.flags.ac = true;
    cpu.flags.p = true;
    cpu.flags.cy = true;
    bus.load(0x0000, &[0xF5]); // PUSH PSW

    run(&mut cpu, &mut bus, 1);

    assert_eq!(bus.memory[0x23FF], 0x42);
    assert_eq!(bus.memory[0x23FE], 0b1101_0111);
}

#[test]
fn test_pop_psw_restores_all_flags() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x23FE;
    bus.load(0x23FE, &[0xFF, 0x42]);
    bus.load(0x0000, &[0xF1]); // POP PSW

    assert_eq!(run(&mut cpu, &mut bus, 1), 10);
    assert_eq!(cpu.a, 0x42);
    assert!(cpu.flags.s && cpu.flags.z && cpu.flags.ac && cpu.flags.p && cpu.flags.cy);
    assert_eq!(cpu.get_psw(), 0x42D7);
}

#[test]
fn test_xthl() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x23FE;
    cpu.set_hl(0x1234);
    bus.load(0x23FE, &[0x78, 0x56]);
    bus.load(0x0000, &[0xE3]);

    assert_eq!(run(&mut cpu, &mut bus, 1), 18);
    assert_eq!(cpu.get_hl(), 0x5678);
    assert_eq!(bus.memory[0x23FE], 0x34);
    assert_eq!(bus.memory[0x23FF], 0x12);
    assert_eq!(cpu.sp, 0x23FE);
}

#[test]
fn test_sphl() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0x2300);
    bus.load(0x0000, &[0xF9]);

    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.sp, 0x2300);
}

#[test]
fn test_push_into_rom_is_fatal() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.rom_end = Some(0x1FFF);
    cpu.pc = 0x3000;
    cpu.sp = 0x2000;
    bus.load(0x3000, &[0xC5]);

    let err = cpu.step(&mut bus).unwrap_err();
    assert!(matches!(err, StepError::ProtectedWrite(w) if w.address == 0x1FFF));
    assert_eq!(cpu.pc, 0x3000);
}

#[test]
fn test_push_straddling_rom_stores_nothing() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.rom_end = Some(0x1FFF);
    cpu.pc = 0x3000;
    cpu.sp = 0x2001;
    cpu.set_bc(0x1234);
    bus.memory[0x2000] = 0xEE;
    bus.load(0x3000, &[0xC5]); // PUSH B: 2000h is RAM, 1FFFh is ROM

    let err = cpu.step(&mut bus).unwrap_err();
    assert!(matches!(err, StepError::ProtectedWrite(w) if w.address == 0x1FFF && w.value == 0x34));
    assert_eq!(bus.memory[0x2000], 0xEE, "high byte not written");
    assert_eq!(cpu.sp, 0x2001);
    assert_eq!(cpu.pc, 0x3000);
}

#[test]
fn test_call_straddling_rom_stores_nothing() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.rom_end = Some(0x1FFF);
    cpu.pc = 0x3000;
    cpu.sp = 0x2001;
    bus.load(0x3000, &[0xCD, 0x00, 0x40]); // CALL 4000h

    assert!(matches!(cpu.step(&mut bus), Err(StepError::ProtectedWrite(_))));
    assert_eq!(bus.memory[0x2000], 0x00);
    assert_eq!(cpu.sp, 0x2001);
    assert_eq!(cpu.pc, 0x3000);
}
