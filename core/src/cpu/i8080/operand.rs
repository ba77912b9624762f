//! Register-or-memory operand resolution.
//!
//! 8080 opcodes encode an 8-bit operand in a 3-bit field (`DDD` / `SSS`) and a
//! register pair in a 2-bit field (`RP`). Selector `110` means "the byte at
//! (HL)", so resolving a selector yields either a register handle or a memory
//! address, never a raw pointer.

use crate::core::{Bus, memory::ProtectedWrite};
use crate::cpu::i8080::I8080;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(Reg),
    Memory(u16),
}

impl Operand {
    /// Memory operands cost extra bus cycles.
    pub fn is_memory(self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegPair {
    Bc,
    De,
    Hl,
    Sp,
    Psw,
}

impl RegPair {
    /// `RP` field of LXI/INX/DCX/DAD: 00=BC 01=DE 10=HL 11=SP.
    pub fn from_selector(sel: u8) -> Self {
        match sel & 0x03 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Sp,
        }
    }

    /// `RP` field of PUSH/POP, where 11 selects A + flags.
    pub fn from_stack_selector(sel: u8) -> Self {
        match sel & 0x03 {
            3 => Self::Psw,
            other => Self::from_selector(other),
        }
    }
}

impl I8080 {
    /// Map a 3-bit selector to its operand: 111=A 000=B 001=C 010=D 011=E
    /// 100=H 101=L 110=(HL).
    pub fn resolve(&self, selector: u8) -> Operand {
        match selector & 0x07 {
            0 => Operand::Register(Reg::B),
            1 => Operand::Register(Reg::C),
            2 => Operand::Register(Reg::D),
            3 => Operand::Register(Reg::E),
            4 => Operand::Register(Reg::H),
            5 => Operand::Register(Reg::L),
            6 => Operand::Memory(self.get_hl()),
            _ => Operand::Register(Reg::A),
        }
    }

    pub fn reg(&self, reg: Reg) -> u8 {
        match reg {
            Reg::A => self.a,
            Reg::B => self.b,
            Reg::C => self.c,
            Reg::D => self.d,
            Reg::E => self.e,
            Reg::H => self.h,
            Reg::L => self.l,
        }
    }

    pub fn set_reg(&mut self, reg: Reg, val: u8) {
        match reg {
            Reg::A => self.a = val,
            Reg::B => self.b = val,
            Reg::C => self.c = val,
            Reg::D => self.d = val,
            Reg::E => self.e = val,
            Reg::H => self.h = val,
            Reg::L => self.l = val,
        }
    }

    pub fn load<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &self,
        bus: &mut B,
        operand: Operand,
    ) -> u8 {
        match operand {
            Operand::Register(reg) => self.reg(reg),
            Operand::Memory(addr) => bus.read(addr),
        }
    }

    pub fn store<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        val: u8,
    ) -> Result<(), ProtectedWrite> {
        match operand {
            Operand::Register(reg) => {
                self.set_reg(reg, val);
                Ok(())
            }
            Operand::Memory(addr) => bus.write(addr, val),
        }
    }

    pub fn get_pair(&self, pair: RegPair) -> u16 {
        match pair {
            RegPair::Bc => self.get_bc(),
            RegPair::De => self.get_de(),
            RegPair::Hl => self.get_hl(),
            RegPair::Sp => self.sp,
            RegPair::Psw => self.get_psw(),
        }
    }

    pub fn set_pair(&mut self, pair: RegPair, val: u16) {
        match pair {
            RegPair::Bc => self.set_bc(val),
            RegPair::De => self.set_de(val),
            RegPair::Hl => self.set_hl(val),
            RegPair::Sp => self.sp = val,
            RegPair::Psw => self.set_psw(val),
        }
    }
}
