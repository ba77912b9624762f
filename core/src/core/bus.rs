use crate::core::memory::ProtectedWrite;

/// Generic bus interface between a CPU and the board it runs on.
///
/// Memory writes are fallible: a board may refuse writes into ROM, and the
/// refusal is surfaced to the CPU instead of being silently dropped.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for 8-bit
    type Data; // u8

    fn read(&mut self, addr: Self::Address) -> Self::Data;
    fn write(&mut self, addr: Self::Address, data: Self::Data) -> Result<(), ProtectedWrite>;

    /// Report whether [`write`](Self::write) would refuse `addr`, without
    /// storing anything. Lets multi-byte stores fault before touching memory.
    fn check_write(&self, _addr: Self::Address, _data: Self::Data) -> Result<(), ProtectedWrite> {
        Ok(())
    }

    /// Read from the I/O port address space (separate from memory on the 8080).
    fn io_read(&mut self, port: Self::Address) -> Self::Data;

    /// Write to the I/O port address space (separate from memory on the 8080).
    fn io_write(&mut self, port: Self::Address, data: Self::Data);
}
