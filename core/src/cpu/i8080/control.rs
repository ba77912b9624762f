use log::debug;

use crate::core::Bus;
use crate::cpu::i8080::{Exec, Flow, I8080, StepInfo};

impl I8080 {
    /// IN d8: 10 T
    pub(crate) fn op_in<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let port = self.imm8(bus, info);
        self.a = bus.io_read(port as u16);
        Exec::next(10)
    }

    /// OUT d8: 10 T
    pub(crate) fn op_out<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        info: StepInfo,
        bus: &mut B,
    ) -> Exec {
        let port = self.imm8(bus, info);
        bus.io_write(port as u16, self.a);
        Exec::next(10)
    }

    /// EI: 4 T. Interrupts open after the following instruction starts.
    pub(crate) fn op_ei(&mut self) -> Exec {
        self.ei_pending = true;
        Exec::next(4)
    }

    /// DI: 4 T. Immediate, and cancels an EI still in flight.
    pub(crate) fn op_di(&mut self) -> Exec {
        self.interrupts_enabled = false;
        self.ei_pending = false;
        Exec::next(4)
    }

    /// HLT: 7 T. PC stays on the HLT opcode until an interrupt arrives.
    pub(crate) fn op_hlt(&mut self) -> Exec {
        debug!(
            "HLT at 0x{:04X} (interrupts {})",
            self.pc,
            if self.interrupts_enabled || self.ei_pending { "enabled" } else { "disabled" }
        );
        Exec { cycles: 7, flow: Flow::Halt }
    }
}
