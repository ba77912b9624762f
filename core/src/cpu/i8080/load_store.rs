use crate::core::{Bus, memory::ProtectedWrite};
use crate::cpu::i8080::stack::write_pair;
use crate::cpu::i8080::{Exec, I8080, RegPair, StepInfo};

impl I8080 {
    /// MOV d, s: 5 T (register) or 7 T (either side is M)
    /// Opcode mask: 01 ddd sss
    pub(crate) fn op_mov<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let dst = self.resolve(info.opcode >> 3);
        let src = self.resolve(info.opcode);
        let val = self.load(bus, src);
        self.store(bus, dst, val)?;
        let cycles = if dst.is_memory() || src.is_memory() { 7 } else { 5 };
        Ok(Exec::next(cycles))
    }

    /// MVI d, d8: 7 T (register) or 10 T (M)
    /// Opcode mask: 00 ddd 110
    pub(crate) fn op_mvi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let dst = self.resolve(info.opcode >> 3);
        let val = self.imm8(bus, info);
        self.store(bus, dst, val)?;
        Ok(Exec::next(if dst.is_memory() { 10 } else { 7 }))
    }

    /// LXI rp, d16: 10 T
    /// Opcode mask: 00 rp0 001
    pub(crate) fn op_lxi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let pair = RegPair::from_selector(info.opcode >> 4);
        let val = self.imm16(bus, info);
        self.set_pair(pair, val);
        Exec::next(10)
    }

    /// LDA a16: 13 T
    pub(crate) fn op_lda<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let addr = self.imm16(bus, info);
        self.a = bus.read(addr);
        Exec::next(13)
    }

    /// STA a16: 13 T
    pub(crate) fn op_sta<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let addr = self.imm16(bus, info);
        bus.write(addr, self.a)?;
        Ok(Exec::next(13))
    }

    /// LHLD a16: 16 T. L <- (a16), H <- (a16 + 1)
    pub(crate) fn op_lhld<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let addr = self.imm16(bus, info);
        self.l = bus.read(addr);
        self.h = bus.read(addr.wrapping_add(1));
        Exec::next(16)
    }

    /// SHLD a16: 16 T. (a16) <- L, (a16 + 1) <- H
    pub(crate) fn op_shld<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let addr = self.imm16(bus, info);
        write_pair(bus, [(addr, self.l), (addr.wrapping_add(1), self.h)])?;
        Ok(Exec::next(16))
    }

    /// LDAX B / LDAX D: 7 T
    /// Opcode mask: 00 0r1 010
    pub(crate) fn op_ldax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let addr = self.get_pair(RegPair::from_selector(info.opcode >> 4));
        self.a = bus.read(addr);
        Exec::next(7)
    }

    /// STAX B / STAX D: 7 T
    /// Opcode mask: 00 0r0 010
    pub(crate) fn op_stax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let addr = self.get_pair(RegPair::from_selector(info.opcode >> 4));
        bus.write(addr, self.a)?;
        Ok(Exec::next(7))
    }

    /// XCHG: 4 T. HL <-> DE
    pub(crate) fn op_xchg(&mut self) -> Exec {
        std::mem::swap(&mut self.h, &mut self.d);
        std::mem::swap(&mut self.l, &mut self.e);
        Exec::next(4)
    }
}
