use crate::core::{Bus, memory::ProtectedWrite};
use crate::cpu::i8080::{Exec, I8080, RegPair, StepInfo};

/// Store two bytes, or neither when either address is protected.
pub(super) fn write_pair<B: Bus<Address = u16, Data = u8> + ?Sized>(
    bus: &mut B,
    writes: [(u16, u8); 2],
) -> Result<(), ProtectedWrite> {
    for (addr, data) in writes {
        bus.check_write(addr, data)?;
    }
    for (addr, data) in writes {
        bus.write(addr, data)?;
    }
    Ok(())
}

impl I8080 {
    /// Push a word: high byte at SP-1, low byte at SP-2. On a fault neither
    /// byte is stored and SP is unchanged.
    pub(crate) fn push16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        val: u16,
    ) -> Result<(), ProtectedWrite> {
        let sp = self.sp.wrapping_sub(2);
        write_pair(
            bus,
            [(sp.wrapping_add(1), (val >> 8) as u8), (sp, val as u8)],
        )?;
        self.sp = sp;
        Ok(())
    }

    /// Pop a word pushed by [`push16`](Self::push16).
    pub(crate) fn pop16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        let hi = bus.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        ((hi as u16) << 8) | lo as u16
    }

    /// PUSH rp: 11 T
    /// Opcode mask: 11 rp0 101 (rp: 0=BC, 1=DE, 2=HL, 3=PSW)
    pub(crate) fn op_push<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let val = self.get_pair(RegPair::from_stack_selector(info.opcode >> 4));
        self.push16(bus, val)?;
        Ok(Exec::next(11))
    }

    /// POP rp: 10 T. POP PSW restores every flag.
    /// Opcode mask: 11 rp0 001 (rp: 0=BC, 1=DE, 2=HL, 3=PSW)
    pub(crate) fn op_pop<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let val = self.pop16(bus);
        self.set_pair(RegPair::from_stack_selector(info.opcode >> 4), val);
        Exec::next(10)
    }

    /// XTHL: 18 T. Exchange HL with the word on top of the stack
    pub(crate) fn op_xthl<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let lo = bus.read(self.sp);
        let hi = bus.read(self.sp.wrapping_add(1));
        write_pair(bus, [(self.sp, self.l), (self.sp.wrapping_add(1), self.h)])?;
        self.l = lo;
        self.h = hi;
        Ok(Exec::next(18))
    }

    /// SPHL: 5 T
    pub(crate) fn op_sphl(&mut self) -> Exec {
        self.sp = self.get_hl();
        Exec::next(5)
    }
}
