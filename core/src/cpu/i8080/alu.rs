use crate::core::{Bus, memory::ProtectedWrite};
use crate::cpu::i8080::{Exec, I8080, RegPair, StepInfo};

impl I8080 {
    // --- Flag helpers ---

    /// A + val (+ carry). CY is the carry out of bit 7; AC is bit 4 of
    /// `a ^ val ^ result`.
    fn do_add(&mut self, val: u8, carry_in: bool) -> u8 {
        let a = self.a;
        let wide = a as u16 + val as u16 + carry_in as u16;
        let result = wide as u8;
        self.flags.cy = wide > 0xFF;
        self.flags.ac = (a ^ val ^ result) & 0x10 != 0;
        self.flags.set_zsp(result);
        result
    }

    /// A - val (- borrow). CY is set on borrow out of bit 7. The ALU adds
    /// the complement, so AC is the carry into bit 4 of `a + !val`, i.e. set
    /// when no borrow leaves the low nibble.
    fn do_sub(&mut self, val: u8, borrow_in: bool) -> u8 {
        let a = self.a;
        let wide = (a as u16)
            .wrapping_sub(val as u16)
            .wrapping_sub(borrow_in as u16);
        let result = wide as u8;
        self.flags.cy = wide > 0xFF;
        self.flags.ac = (a ^ !val ^ result) & 0x10 != 0;
        self.flags.set_zsp(result);
        result
    }

    fn update_flags_logic(&mut self, result: u8, ac: bool) {
        self.flags.cy = false;
        self.flags.ac = ac;
        self.flags.set_zsp(result);
    }

    /// Shared body of the eight accumulator operations, selected by bits 5-3.
    pub(crate) fn perform_alu_op(&mut self, op: u8, val: u8) {
        match op & 0x07 {
            0 => self.a = self.do_add(val, false),          // ADD
            1 => self.a = self.do_add(val, self.flags.cy),  // ADC
            2 => self.a = self.do_sub(val, false),          // SUB
            3 => self.a = self.do_sub(val, self.flags.cy),  // SBB
            4 => {
                // ANA: AC reflects bit 3 of either operand
                let ac = (self.a | val) & 0x08 != 0;
                self.a &= val;
                self.update_flags_logic(self.a, ac);
            }
            5 => { self.a ^= val; self.update_flags_logic(self.a, false); } // XRA
            6 => { self.a |= val; self.update_flags_logic(self.a, false); } // ORA
            _ => { self.do_sub(val, false); }                               // CMP
        }
    }

    // --- Instructions ---

    /// ALU A, s: 4 T (register) or 7 T (M)
    /// ADD, ADC, SUB, SBB, ANA, XRA, ORA, CMP
    /// Opcode mask: 10 ooo sss
    pub(crate) fn op_alu_r<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let src = self.resolve(info.opcode);
        let val = self.load(bus, src);
        self.perform_alu_op(info.opcode >> 3, val);
        Exec::next(if src.is_memory() { 7 } else { 4 })
    }

    /// ALU A, d8: 7 T
    /// ADI, ACI, SUI, SBI, ANI, XRI, ORI, CPI
    /// Opcode mask: 11 ooo 110
    pub(crate) fn op_alu_imm<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let val = self.imm8(bus, info);
        self.perform_alu_op(info.opcode >> 3, val);
        Exec::next(7)
    }

    /// INR d: 5 T (register) or 10 T (M). CY is preserved.
    /// Opcode mask: 00 ddd 100
    pub(crate) fn op_inr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let dst = self.resolve(info.opcode >> 3);
        let val = self.load(bus, dst);
        let result = val.wrapping_add(1);
        self.flags.ac = (val ^ 1 ^ result) & 0x10 != 0;
        self.flags.set_zsp(result);
        self.store(bus, dst, result)?;
        Ok(Exec::next(if dst.is_memory() { 10 } else { 5 }))
    }

    /// DCR d: 5 T (register) or 10 T (M). CY is preserved.
    /// Opcode mask: 00 ddd 101
    pub(crate) fn op_dcr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Result<Exec, ProtectedWrite> {
        let dst = self.resolve(info.opcode >> 3);
        let val = self.load(bus, dst);
        let result = val.wrapping_sub(1);
        // Set unless the low nibble wrapped from 0 to F.
        self.flags.ac = result & 0x0F != 0x0F;
        self.flags.set_zsp(result);
        self.store(bus, dst, result)?;
        Ok(Exec::next(if dst.is_memory() { 10 } else { 5 }))
    }

    /// INX rp: 5 T, no flags
    pub(crate) fn op_inx(&mut self, info: StepInfo) -> Exec {
        let pair = RegPair::from_selector(info.opcode >> 4);
        self.set_pair(pair, self.get_pair(pair).wrapping_add(1));
        Exec::next(5)
    }

    /// DCX rp: 5 T, no flags
    pub(crate) fn op_dcx(&mut self, info: StepInfo) -> Exec {
        let pair = RegPair::from_selector(info.opcode >> 4);
        self.set_pair(pair, self.get_pair(pair).wrapping_sub(1));
        Exec::next(5)
    }

    /// DAD rp: 10 T. HL += rp, only CY affected
    pub(crate) fn op_dad(&mut self, info: StepInfo) -> Exec {
        let pair = RegPair::from_selector(info.opcode >> 4);
        let wide = self.get_hl() as u32 + self.get_pair(pair) as u32;
        self.flags.cy = wide > 0xFFFF;
        self.set_hl(wide as u16);
        Exec::next(10)
    }

    // --- Accumulator rotates (4 T, CY only) ---

    pub(crate) fn op_rlc(&mut self) -> Exec {
        self.flags.cy = self.a & 0x80 != 0;
        self.a = self.a.rotate_left(1);
        Exec::next(4)
    }

    pub(crate) fn op_rrc(&mut self) -> Exec {
        self.flags.cy = self.a & 0x01 != 0;
        self.a = self.a.rotate_right(1);
        Exec::next(4)
    }

    /// RAL: rotate left through carry
    pub(crate) fn op_ral(&mut self) -> Exec {
        let carry_in = self.flags.cy as u8;
        self.flags.cy = self.a & 0x80 != 0;
        self.a = (self.a << 1) | carry_in;
        Exec::next(4)
    }

    /// RAR: rotate right through carry
    pub(crate) fn op_rar(&mut self) -> Exec {
        let carry_in = self.flags.cy as u8;
        self.flags.cy = self.a & 0x01 != 0;
        self.a = (self.a >> 1) | (carry_in << 7);
        Exec::next(4)
    }

    // --- Misc accumulator / carry ---

    /// DAA: 4 T
    ///
    /// Low nibble: add 0x06 if it exceeds 9 or AC is set (AC becomes the
    /// carry out of bit 3). High nibble of the adjusted value: add 0x60 if it
    /// exceeds 9 or CY is set (CY is set, never cleared).
    pub(crate) fn op_daa(&mut self) -> Exec {
        let mut a = self.a as u16;

        if a & 0x0F > 9 || self.flags.ac {
            self.flags.ac = (a & 0x0F) + 0x06 > 0x0F;
            a += 0x06;
        } else {
            self.flags.ac = false;
        }

        // Widened so a low-nibble carry out of bit 7 still counts as > 9.
        if a >> 4 > 9 || self.flags.cy {
            a += 0x60;
            self.flags.cy = true;
        }

        self.a = a as u8;
        self.flags.set_zsp(self.a);
        Exec::next(4)
    }

    /// CMA: 4 T, no flags
    pub(crate) fn op_cma(&mut self) -> Exec {
        self.a = !self.a;
        Exec::next(4)
    }

    /// STC: 4 T
    pub(crate) fn op_stc(&mut self) -> Exec {
        self.flags.cy = true;
        Exec::next(4)
    }

    /// CMC: 4 T
    pub(crate) fn op_cmc(&mut self) -> Exec {
        self.flags.cy = !self.flags.cy;
        Exec::next(4)
    }
}
