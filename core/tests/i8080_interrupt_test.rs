use invaders_core::cpu::I8080;
mod common;
use common::{TestBus, run};

#[test]
fn test_interrupt_ignored_while_disabled() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.pc = 0x0123;
    cpu.sp = 0x2400;

    assert_eq!(cpu.interrupt(&mut bus, 1), Ok(false));
    assert_eq!(cpu.pc, 0x0123);
    assert_eq!(cpu.sp, 0x2400);
}

#[test]
fn test_interrupt_pushes_pc_and_vectors() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.pc = 0x1A2B;
    cpu.sp = 0x2400;
    cpu.interrupts_enabled = true;

    assert_eq!(cpu.interrupt(&mut bus, 2), Ok(true));
    assert_eq!(cpu.pc, 0x0010);
    assert_eq!(cpu.sp, 0x23FE);
    assert_eq!(bus.memory[0x23FF], 0x1A);
    assert_eq!(bus.memory[0x23FE], 0x2B);
    assert!(!cpu.interrupts_enabled, "acceptance disables further interrupts");
}

#[test]
fn test_vector_is_masked_to_three_bits() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    cpu.interrupts_enabled = true;
    cpu.interrupt(&mut bus, 9).unwrap();
    assert_eq!(cpu.pc, 0x0008);
}

#[test]
fn test_ei_takes_effect_one_instruction_later() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    bus.load(0x0000, &[0xFB, 0x00, 0x00]); // EI; NOP; NOP

    run(&mut cpu, &mut bus, 1);
    assert!(!cpu.interrupts_enabled);
    assert!(cpu.ei_pending);
    assert_eq!(cpu.interrupt(&mut bus, 1), Ok(false));

    run(&mut cpu, &mut bus, 1);
    assert!(cpu.interrupts_enabled);
    assert!(!cpu.ei_pending);

    assert_eq!(cpu.interrupt(&mut bus, 1), Ok(true));
    assert_eq!(cpu.pc, 0x0008);
    assert_eq!(bus.memory[0x23FE], 0x02, "returns to the instruction after the NOP");
}

#[test]
fn test_di_cancels_pending_enable() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0x0000, &[0xFB, 0xF3, 0x00]); // EI; DI; NOP

    run(&mut cpu, &mut bus, 3);
    assert!(!cpu.interrupts_enabled);
    assert!(!cpu.ei_pending);
}

#[test]
fn test_interrupt_wakes_hlt_and_returns_past_it() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    bus.load(0x0000, &[0xFB, 0x76]); // EI; HLT

    run(&mut cpu, &mut bus, 2);
    assert!(cpu.halted);
    assert_eq!(cpu.pc, 0x0001);
    assert!(cpu.can_wake());

    assert_eq!(cpu.interrupt(&mut bus, 2), Ok(true));
    assert!(!cpu.halted);
    assert_eq!(cpu.pc, 0x0010);
    assert_eq!(bus.memory[0x23FF], 0x00);
    assert_eq!(bus.memory[0x23FE], 0x02);
}

#[test]
fn test_ei_pending_applies_while_halted() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.halted = true;
    cpu.ei_pending = true;

    run(&mut cpu, &mut bus, 1);
    assert!(cpu.interrupts_enabled);
}

#[test]
fn test_interrupt_with_stack_in_rom_is_fatal() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.rom_end = Some(0x1FFF);
    cpu.sp = 0x1000;
    cpu.interrupts_enabled = true;

    let err = cpu.interrupt(&mut bus, 1).unwrap_err();
    assert!(err.is_fatal());
}
