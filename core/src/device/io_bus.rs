use log::{debug, trace};

use crate::device::mb14241::Mb14241;

/// Space Invaders port map.
///
/// | port | read              | write                 |
/// |------|-------------------|-----------------------|
/// | 1    | input latch 1     |                       |
/// | 2    | input latch 2     | shift offset          |
/// | 3    | shift result      | sound latch 1         |
/// | 4    |                   | shift data            |
/// | 5    |                   | sound latch 2         |
/// | 6    |                   | watchdog              |
///
/// Unmapped reads return 0 and unmapped writes are ignored.
pub struct IoBus {
    shifter: Mb14241,
    inputs: [u8; 2],
    power_on_inputs: [u8; 2],
    sound: [u8; 2],
}

pub const PORT_INPUT_1: u8 = 1;
pub const PORT_INPUT_2: u8 = 2;
pub const PORT_SHIFT_RESULT: u8 = 3;
pub const PORT_SHIFT_OFFSET: u8 = 2;
pub const PORT_SHIFT_DATA: u8 = 4;
pub const PORT_SOUND_1: u8 = 3;
pub const PORT_SOUND_2: u8 = 5;
pub const PORT_WATCHDOG: u8 = 6;

impl IoBus {
    pub fn new() -> Self {
        Self::with_inputs(0x00, 0x00)
    }

    /// Bus whose input latches power on with fixed bits set (hard-wired lines,
    /// DIP switches).
    pub fn with_inputs(input1: u8, input2: u8) -> Self {
        Self {
            shifter: Mb14241::new(),
            inputs: [input1, input2],
            power_on_inputs: [input1, input2],
            sound: [0; 2],
        }
    }

    pub fn read(&mut self, port: u8) -> u8 {
        let value = match port {
            PORT_INPUT_1 => self.inputs[0],
            PORT_INPUT_2 => self.inputs[1],
            PORT_SHIFT_RESULT => self.shifter.result(),
            _ => 0,
        };
        trace!("IN  port {port}: 0b{value:08b}");
        value
    }

    pub fn write(&mut self, port: u8, value: u8) {
        match port {
            PORT_SHIFT_OFFSET => {
                self.shifter.set_offset(value);
                debug!("shift offset = {}", self.shifter.offset());
            }
            PORT_SHIFT_DATA => {
                self.shifter.push(value);
                let (hi, lo) = self.shifter.register();
                debug!("shift data hi=0x{hi:02X} lo=0x{lo:02X}");
            }
            PORT_SOUND_1 => self.sound[0] = value,
            PORT_SOUND_2 => self.sound[1] = value,
            PORT_WATCHDOG => {}
            _ => trace!("OUT port {port}: 0x{value:02X} (unmapped)"),
        }
    }

    /// Latch a button edge. Only ports 1 and 2 carry inputs.
    pub fn handle_input(&mut self, port: u8, bit: u8, pressed: bool) {
        let latch = match port {
            PORT_INPUT_1 => &mut self.inputs[0],
            PORT_INPUT_2 => &mut self.inputs[1],
            _ => return,
        };
        let mask = 1u8 << (bit & 0x07);
        if pressed {
            *latch |= mask;
        } else {
            *latch &= !mask;
        }
    }

    /// Current contents of input latch 1 or 2.
    pub fn input(&self, port: u8) -> Option<u8> {
        match port {
            PORT_INPUT_1 => Some(self.inputs[0]),
            PORT_INPUT_2 => Some(self.inputs[1]),
            _ => None,
        }
    }

    /// Last values written to the two sound latches.
    pub fn sound_latches(&self) -> (u8, u8) {
        (self.sound[0], self.sound[1])
    }

    pub fn shifter(&self) -> &Mb14241 {
        &self.shifter
    }

    pub fn reset(&mut self) {
        self.shifter.reset();
        self.inputs = self.power_on_inputs;
        self.sound = [0; 2];
    }
}

impl Default for IoBus {
    fn default() -> Self {
        Self::new()
    }
}
