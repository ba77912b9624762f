use crate::core::{Bus, memory::ProtectedWrite};
use crate::cpu::i8080::{Exec, I8080, StepInfo};

impl I8080 {
    /// Evaluate the condition in bits 5-3:
    /// 0=NZ 1=Z 2=NC 3=C 4=PO 5=PE 6=P 7=M
    pub(crate) fn condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x07 {
            0 => !self.flags.z,
            1 => self.flags.z,
            2 => !self.flags.cy,
            3 => self.flags.cy,
            4 => !self.flags.p,
            5 => self.flags.p,
            6 => !self.flags.s,
            _ => self.flags.s,
        }
    }

    /// JMP a16: 10 T
    pub(crate) fn op_jmp<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let target = self.imm16(bus, info);
        Exec::jump(10, target)
    }

    /// Jcc a16: 10 T taken or not
    /// Opcode mask: 11 ccc 010
    pub(crate) fn op_jcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let target = self.imm16(bus, info);
        if self.condition(info.opcode) {
            Exec::jump(10, target)
        } else {
            Exec::next(10)
        }
    }

    /// CALL a16: 17 T. Pushes the address of the next instruction
    pub(crate) fn op_call<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let target = self.imm16(bus, info);
        self.push16(bus, info.pc.wrapping_add(3))?;
        Ok(Exec::jump(17, target))
    }

    /// Ccc a16: 17 T taken, 11 T not taken
    /// Opcode mask: 11 ccc 100
    pub(crate) fn op_ccc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        if !self.condition(info.opcode) {
            return Ok(Exec::next(11));
        }
        self.op_call(info, bus)
    }

    /// RET: 10 T
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> Exec {
        let target = self.pop16(bus);
        Exec::jump(10, target)
    }

    /// Rcc: 11 T taken, 5 T not taken
    /// Opcode mask: 11 ccc 000
    pub(crate) fn op_rcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        if self.condition(info.opcode) {
            let target = self.pop16(bus);
            Exec::jump(11, target)
        } else {
            Exec::next(5)
        }
    }

    /// RST n: 11 T. CALL 8 * n
    /// Opcode mask: 11 nnn 111
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        self.push16(bus, info.pc.wrapping_add(1))?;
        Ok(Exec::jump(11, (info.opcode & 0x38) as u16))
    }

    /// PCHL: 5 T
    pub(crate) fn op_pchl(&mut self) -> Exec {
        Exec::jump(5, self.get_hl())
    }
}
