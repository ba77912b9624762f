mod alu;
mod branch;
mod control;
mod load_store;
pub mod operand;
mod stack;
pub mod table;

use log::trace;
use thiserror::Error;

use crate::core::{Bus, memory::ProtectedWrite};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, I8080State},
};

pub use operand::{Operand, Reg, RegPair};
pub use table::{OPCODES, Op, OpcodeInfo};

/// Cycles reported for each `step` while the CPU sits in HLT.
pub const HALT_IDLE_CYCLES: u32 = 4;

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    CY = 0x01, // Carry
    P = 0x04,  // Parity (even)
    AC = 0x10, // Auxiliary carry (bit 3 -> 4)
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

/// Bits of the program status byte that are fixed regardless of flags.
const PSW_ALWAYS_SET: u8 = 0x02;

/// Condition flags, kept unpacked so handlers can set them individually.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub s: bool,
    pub z: bool,
    pub ac: bool,
    pub p: bool,
    pub cy: bool,
}

impl Flags {
    /// Pack into the program status byte: `S Z 0 AC 0 P 1 CY`.
    pub fn pack(self) -> u8 {
        let mut psw = PSW_ALWAYS_SET;
        if self.s { psw |= Flag::S as u8; }
        if self.z { psw |= Flag::Z as u8; }
        if self.ac { psw |= Flag::AC as u8; }
        if self.p { psw |= Flag::P as u8; }
        if self.cy { psw |= Flag::CY as u8; }
        psw
    }

    /// Unpack a program status byte. Bits 5, 3 and 1 are ignored.
    pub fn unpack(psw: u8) -> Self {
        Self {
            s: psw & Flag::S as u8 != 0,
            z: psw & Flag::Z as u8 != 0,
            ac: psw & Flag::AC as u8 != 0,
            p: psw & Flag::P as u8 != 0,
            cy: psw & Flag::CY as u8 != 0,
        }
    }

    /// Set Z, S and P from a result byte.
    #[inline]
    pub(crate) fn set_zsp(&mut self, result: u8) {
        self.z = result == 0;
        self.s = result & 0x80 != 0;
        self.p = parity(result);
    }
}

/// True when `value` has an even number of set bits.
#[inline]
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

/// What the dispatcher knows about the instruction being executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepInfo {
    /// Address the opcode was fetched from.
    pub pc: u16,
    pub opcode: u8,
}

/// How a handler leaves the program counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to `pc + length`.
    Next,
    /// Control transferred to the given address.
    Jump(u16),
    /// HLT: PC stays on the HLT opcode.
    Halt,
}

/// Handler outcome: cycles consumed and the resulting control flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Exec {
    pub cycles: u32,
    pub flow: Flow,
}

impl Exec {
    #[inline]
    pub(crate) fn next(cycles: u32) -> Self {
        Self { cycles, flow: Flow::Next }
    }

    #[inline]
    pub(crate) fn jump(cycles: u32, target: u16) -> Self {
        Self { cycles, flow: Flow::Jump(target) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// Opcode with no 8080 instruction behind it. CPU state is untouched.
    #[error("illegal opcode 0x{opcode:02X} at 0x{pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    #[error(transparent)]
    ProtectedWrite(#[from] ProtectedWrite),
}

impl StepError {
    /// Writes into ROM mean the program has gone off the rails; the driver
    /// should stop rather than carry on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProtectedWrite(_))
    }
}

#[derive(Clone, Debug)]
pub struct I8080 {
    // Registers
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    pub flags: Flags,

    // Interrupt state
    pub interrupts_enabled: bool,
    pub ei_pending: bool, // EI executed; enable lands at the start of the next step
    pub halted: bool,
}

impl Default for I8080 {
    fn default() -> Self {
        Self::new()
    }
}

impl I8080 {
    pub fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            flags: Flags::default(),
            interrupts_enabled: false,
            ei_pending: false,
            halted: false,
        }
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn get_de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn get_hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    pub fn get_psw(&self) -> u16 { ((self.a as u16) << 8) | self.flags.pack() as u16 }
    pub fn set_psw(&mut self, val: u16) { self.a = (val >> 8) as u8; self.flags = Flags::unpack(val as u8); }

    /// False once the CPU is halted with no way for an interrupt to wake it.
    pub fn can_wake(&self) -> bool {
        !self.halted || self.interrupts_enabled || self.ei_pending
    }

    // --- Operand fetch ---

    #[inline]
    pub(crate) fn imm8<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &self,
        bus: &mut B,
        info: StepInfo,
    ) -> u8 {
        bus.read(info.pc.wrapping_add(1))
    }

    #[inline]
    pub(crate) fn imm16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &self,
        bus: &mut B,
        info: StepInfo,
    ) -> u16 {
        let lo = bus.read(info.pc.wrapping_add(1));
        let hi = bus.read(info.pc.wrapping_add(2));
        ((hi as u16) << 8) | lo as u16
    }

    /// Execute one instruction and return the cycles it took.
    ///
    /// A pending EI takes effect before anything else. While halted nothing
    /// is fetched and [`HALT_IDLE_CYCLES`] is returned.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<u32, StepError> {
        if self.halted {
            self.apply_pending_enable();
            return Ok(HALT_IDLE_CYCLES);
        }

        let opcode = bus.read(self.pc);
        let entry = &OPCODES[opcode as usize];
        if entry.op == Op::Illegal {
            return Err(StepError::IllegalOpcode {
                opcode,
                pc: self.pc,
            });
        }

        trace!("{}", self.trace_line(opcode));

        self.apply_pending_enable();
        let info = StepInfo { pc: self.pc, opcode };
        let exec = self.execute(entry.op, info, bus)?;

        self.pc = match exec.flow {
            Flow::Next => info.pc.wrapping_add(entry.length as u16),
            Flow::Jump(target) => target,
            Flow::Halt => {
                self.halted = true;
                info.pc
            }
        };
        Ok(exec.cycles)
    }

    /// Request a vectored interrupt (`RST vector`).
    ///
    /// Ignored (returns `false`) while interrupts are disabled. When accepted
    /// the return address is pushed, PC moves to `8 * vector` and further
    /// interrupts are disabled until the program executes EI.
    pub fn interrupt<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        vector: u8,
    ) -> Result<bool, StepError> {
        if !self.interrupts_enabled {
            return Ok(false);
        }

        // A halted CPU resumes after the HLT, not on it.
        let ret = if self.halted {
            self.halted = false;
            self.pc.wrapping_add(1)
        } else {
            self.pc
        };
        self.push16(bus, ret)?;
        self.pc = (vector & 0x07) as u16 * 8;
        self.interrupts_enabled = false;
        trace!("interrupt RST {} accepted, return to 0x{ret:04X}", vector & 0x07);
        Ok(true)
    }

    /// One-line description of the machine state before executing `opcode`.
    pub fn trace_line(&self, opcode: u8) -> String {
        let entry = &OPCODES[opcode as usize];
        format!(
            "PC: 0x{:04X}, SP: 0x{:04X}, Flags: {:08b}, Opcode: 0x{:02X} ({}) - {:<10} [A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X}]",
            self.pc,
            self.sp,
            self.flags.pack(),
            opcode,
            entry.length,
            entry.mnemonic,
            self.a,
            self.b,
            self.c,
            self.d,
            self.e,
            self.h,
            self.l,
        )
    }

    fn apply_pending_enable(&mut self) {
        if self.ei_pending {
            self.ei_pending = false;
            self.interrupts_enabled = true;
        }
    }

    fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: Op,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, StepError> {
        let exec = match op {
            // --- Data transfer ---
            Op::Mov => self.op_mov(info, bus)?,
            Op::Mvi => self.op_mvi(info, bus)?,
            Op::Lxi => self.op_lxi(info, bus),
            Op::Lda => self.op_lda(info, bus),
            Op::Sta => self.op_sta(info, bus)?,
            Op::Lhld => self.op_lhld(info, bus),
            Op::Shld => self.op_shld(info, bus)?,
            Op::Ldax => self.op_ldax(info, bus),
            Op::Stax => self.op_stax(info, bus)?,
            Op::Xchg => self.op_xchg(),

            // --- Arithmetic / logic ---
            Op::Alu => self.op_alu_r(info, bus),
            Op::AluImm => self.op_alu_imm(info, bus),
            Op::Inr => self.op_inr(info, bus)?,
            Op::Dcr => self.op_dcr(info, bus)?,
            Op::Inx => self.op_inx(info),
            Op::Dcx => self.op_dcx(info),
            Op::Dad => self.op_dad(info),
            Op::Rlc => self.op_rlc(),
            Op::Rrc => self.op_rrc(),
            Op::Ral => self.op_ral(),
            Op::Rar => self.op_rar(),
            Op::Daa => self.op_daa(),
            Op::Cma => self.op_cma(),
            Op::Stc => self.op_stc(),
            Op::Cmc => self.op_cmc(),

            // --- Branch ---
            Op::Jmp => self.op_jmp(info, bus),
            Op::Jcc => self.op_jcc(info, bus),
            Op::Call => self.op_call(info, bus)?,
            Op::Ccc => self.op_ccc(info, bus)?,
            Op::Ret => self.op_ret(bus),
            Op::Rcc => self.op_rcc(info, bus),
            Op::Rst => self.op_rst(info, bus)?,
            Op::Pchl => self.op_pchl(),

            // --- Stack ---
            Op::Push => self.op_push(info, bus)?,
            Op::Pop => self.op_pop(info, bus),
            Op::Xthl => self.op_xthl(bus)?,
            Op::Sphl => self.op_sphl(),

            // --- I/O and machine control ---
            Op::In => self.op_in(info, bus),
            Op::Out => self.op_out(info, bus),
            Op::Ei => self.op_ei(),
            Op::Di => self.op_di(),
            Op::Nop => Exec::next(4),
            Op::Hlt => self.op_hlt(),

            Op::Illegal => {
                return Err(StepError::IllegalOpcode {
                    opcode: info.opcode,
                    pc: info.pc,
                });
            }
        };
        Ok(exec)
    }
}

impl Cpu for I8080 {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }
}

impl CpuStateTrait for I8080 {
    type Snapshot = I8080State;

    fn snapshot(&self) -> I8080State {
        I8080State {
            a: self.a,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            sp: self.sp,
            pc: self.pc,
            psw: self.flags.pack(),
            inte: self.interrupts_enabled,
            ei_pending: self.ei_pending,
            halted: self.halted,
        }
    }
}
