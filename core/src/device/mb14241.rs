/// Fujitsu MB14241 barrel shifter (Midway 8080 boards)
///
/// The 8080 has no multi-bit shift instruction, so the board provides a
/// 16-bit shift register. Each data write pushes the new byte into the high
/// half and moves the old high half into the low half. Reading returns the
/// 8-bit window that starts `offset` bits below the top of the register.
pub struct Mb14241 {
    hi: u8,
    lo: u8,
    offset: u8,
}

impl Mb14241 {
    pub fn new() -> Self {
        Self {
            hi: 0,
            lo: 0,
            offset: 0,
        }
    }

    /// Load the shift amount (only the low 3 bits are wired).
    pub fn set_offset(&mut self, value: u8) {
        self.offset = value & 0b111;
    }

    /// Two-stage data load: old high byte moves down, `value` goes on top.
    pub fn push(&mut self, value: u8) {
        self.lo = self.hi;
        self.hi = value;
    }

    /// Current shifted result.
    pub fn result(&self) -> u8 {
        let word = ((self.hi as u16) << 8) | self.lo as u16;
        (word >> (8 - self.offset)) as u8
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Raw register contents as (high, low).
    pub fn register(&self) -> (u8, u8) {
        (self.hi, self.lo)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Mb14241 {
    fn default() -> Self {
        Self::new()
    }
}
