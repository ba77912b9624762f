//! Flat 64 KiB address space with write-protected ranges.
//!
//! The board owns exactly one [`Memory`]; the CPU only ever sees it through a
//! borrowed [`Bus`](crate::core::Bus). ROM images are placed with
//! [`Memory::load`] / [`Memory::load_files`] and then fenced off with
//! [`Memory::protect`], after which any CPU write into them is reported as a
//! [`ProtectedWrite`].

use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

/// Size of the full 8080 address space.
pub const MEMORY_SIZE: usize = 0x10000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A CPU write landed inside a protected range. Memory is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "write of 0x{value:02X} to 0x{address:04X} inside protected range 0x{start:04X}..=0x{end:04X}"
)]
pub struct ProtectedWrite {
    pub address: u16,
    pub value: u8,
    pub start: u16,
    pub end: u16,
}

/// Errors raised while placing an image into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image of {len} bytes at 0x{base:04X} runs past the end of the address space")]
    ImageTooLarge { base: u16, len: usize },
}

// ---------------------------------------------------------------------------
// Mirroring
// ---------------------------------------------------------------------------

/// How CPU addresses are folded onto the physical array.
///
/// Space Invaders only decodes A0-A13, so the 16 KiB of ROM + RAM repeat
/// across the whole address space (`Mask(0x3FFF)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorPolicy {
    #[default]
    None,
    Mask(u16),
}

impl MirrorPolicy {
    #[inline]
    pub fn apply(self, addr: u16) -> u16 {
        match self {
            Self::None => addr,
            Self::Mask(mask) => addr & mask,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

pub struct Memory {
    data: Box<[u8]>,
    protected: Vec<RangeInclusive<u16>>,
    mirror: MirrorPolicy,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::with_mirror(MirrorPolicy::None)
    }

    pub fn with_mirror(mirror: MirrorPolicy) -> Self {
        Self {
            data: vec![0u8; MEMORY_SIZE].into_boxed_slice(),
            protected: Vec::new(),
            mirror,
        }
    }

    pub fn mirror(&self) -> MirrorPolicy {
        self.mirror
    }

    /// Read a byte. Never fails.
    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[self.mirror.apply(addr) as usize]
    }

    /// Write a byte unless the (mirrored) address lies in a protected range.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), ProtectedWrite> {
        let address = self.writable_address(addr, value)?;
        self.data[address as usize] = value;
        Ok(())
    }

    /// The error [`write`](Self::write) would return, without writing.
    pub fn check_write(&self, addr: u16, value: u8) -> Result<(), ProtectedWrite> {
        self.writable_address(addr, value).map(|_| ())
    }

    fn writable_address(&self, addr: u16, value: u8) -> Result<u16, ProtectedWrite> {
        let address = self.mirror.apply(addr);
        match self.protected_range(address) {
            Some(range) => Err(ProtectedWrite {
                address,
                value,
                start: *range.start(),
                end: *range.end(),
            }),
            None => Ok(address),
        }
    }

    /// Mark `start..=end` read-only for CPU writes. Ranges may overlap.
    pub fn protect(&mut self, start: u16, end: u16) {
        self.protected.push(start..=end);
    }

    /// The first protected range containing `addr`, if any.
    pub fn protected_range(&self, addr: u16) -> Option<&RangeInclusive<u16>> {
        self.protected.iter().find(|r| r.contains(&addr))
    }

    pub fn protected_ranges(&self) -> &[RangeInclusive<u16>] {
        &self.protected
    }

    /// Place raw bytes at `base`, bypassing protection. Returns the address
    /// one past the last byte written.
    pub fn load(&mut self, base: u16, bytes: &[u8]) -> Result<usize, LoadError> {
        let start = base as usize;
        let end = start + bytes.len();
        if end > MEMORY_SIZE {
            return Err(LoadError::ImageTooLarge {
                base,
                len: bytes.len(),
            });
        }
        self.data[start..end].copy_from_slice(bytes);
        Ok(end)
    }

    /// Load files back to back starting at `base`.
    ///
    /// Returns the next free address. With `protect_after_load`, the range
    /// `0..=cursor-1` becomes read-only once every file is in place.
    pub fn load_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        base: u16,
        protect_after_load: bool,
    ) -> Result<usize, LoadError> {
        let mut cursor = base as usize;
        for path in paths {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if cursor + bytes.len() > MEMORY_SIZE {
                return Err(LoadError::ImageTooLarge {
                    base: cursor as u16,
                    len: bytes.len(),
                });
            }
            self.data[cursor..cursor + bytes.len()].copy_from_slice(&bytes);
            info!(
                "loaded {} ({} bytes) at 0x{:04X}",
                path.display(),
                bytes.len(),
                cursor
            );
            cursor += bytes.len();
        }

        if protect_after_load && cursor > 0 {
            self.protect(0, (cursor - 1) as u16);
        }
        Ok(cursor)
    }

    /// Borrow the bytes in `range`, without mirroring. Empty if the range is.
    pub fn slice(&self, range: RangeInclusive<u16>) -> &[u8] {
        if range.is_empty() {
            return &[];
        }
        let (start, end) = range.into_inner();
        &self.data[start as usize..=end as usize]
    }

    /// Owned snapshot of the full address space.
    pub fn copy_all(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Write the raw, full-size image.
    pub fn dump<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }

    /// Zero every byte outside the protected ranges (power-on RAM state).
    pub fn clear_unprotected(&mut self) {
        for addr in 0..MEMORY_SIZE {
            if self.protected_range(addr as u16).is_none() {
                self.data[addr] = 0;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Mirroring -----------------------------------------------------------

    #[test]
    fn mirror_none_is_identity() {
        assert_eq!(MirrorPolicy::None.apply(0xABCD), 0xABCD);
    }

    #[test]
    fn mirror_mask_folds_high_addresses() {
        let m = MirrorPolicy::Mask(0x3FFF);
        assert_eq!(m.apply(0x4000), 0x0000);
        assert_eq!(m.apply(0x6400), 0x2400);
        assert_eq!(m.apply(0xFFFF), 0x3FFF);
    }

    #[test]
    fn mirrored_write_visible_at_base_address() {
        let mut mem = Memory::with_mirror(MirrorPolicy::Mask(0x3FFF));
        mem.write(0x6400, 0x5A).unwrap();
        assert_eq!(mem.read(0x2400), 0x5A);
        assert_eq!(mem.read(0xA400), 0x5A);
    }

    #[test]
    fn mirrored_write_into_rom_is_rejected() {
        let mut mem = Memory::with_mirror(MirrorPolicy::Mask(0x3FFF));
        mem.protect(0x0000, 0x1FFF);
        let err = mem.write(0x4010, 0x01).unwrap_err();
        assert_eq!(err.address, 0x0010);
    }

    // -- Protection ----------------------------------------------------------

    #[test]
    fn protected_error_carries_range() {
        let mut mem = Memory::new();
        mem.protect(0x0100, 0x01FF);
        let err = mem.write(0x0150, 0x77).unwrap_err();
        assert_eq!(
            err,
            ProtectedWrite {
                address: 0x0150,
                value: 0x77,
                start: 0x0100,
                end: 0x01FF,
            }
        );
        assert_eq!(mem.read(0x0150), 0x00);
    }

    #[test]
    fn protected_range_is_inclusive() {
        let mut mem = Memory::new();
        mem.protect(0x10, 0x20);
        assert!(mem.write(0x0F, 1).is_ok());
        assert!(mem.write(0x10, 1).is_err());
        assert!(mem.write(0x20, 1).is_err());
        assert!(mem.write(0x21, 1).is_ok());
    }

    #[test]
    fn clear_unprotected_keeps_rom() {
        let mut mem = Memory::new();
        mem.load(0x0000, &[0xAA; 4]).unwrap();
        mem.protect(0x0000, 0x0003);
        mem.write(0x2000, 0x55).unwrap();
        mem.clear_unprotected();
        assert_eq!(mem.slice(0..=3), &[0xAA; 4]);
        assert_eq!(mem.read(0x2000), 0x00);
    }

    // -- Loading -------------------------------------------------------------

    #[test]
    fn load_returns_end_address() {
        let mut mem = Memory::new();
        assert_eq!(mem.load(0x0100, &[1, 2, 3]).unwrap(), 0x0103);
        assert_eq!(mem.slice(0x0100..=0x0102), &[1, 2, 3]);
    }

    #[test]
    fn load_past_end_fails() {
        let mut mem = Memory::new();
        let result = mem.load(0xFFFF, &[1, 2]);
        assert!(matches!(result, Err(LoadError::ImageTooLarge { .. })));
    }

    #[test]
    fn load_exactly_to_end_fits() {
        let mut mem = Memory::new();
        assert_eq!(mem.load(0xFFFE, &[1, 2]).unwrap(), MEMORY_SIZE);
    }

    #[test]
    fn slice_is_inclusive() {
        let mem = Memory::new();
        assert_eq!(mem.slice(0xFFF0..=0xFFFF).len(), 0x10);
        assert_eq!(mem.slice(0x10..=0x10).len(), 1);
        let (start, end) = (0x10, 0x08);
        assert!(mem.slice(start..=end).is_empty());
    }

    #[test]
    fn dump_writes_full_image() {
        let mut mem = Memory::new();
        mem.write(0x1234, 0x99).unwrap();
        let mut out = Vec::new();
        mem.dump(&mut out).unwrap();
        assert_eq!(out.len(), MEMORY_SIZE);
        assert_eq!(out[0x1234], 0x99);
        assert_eq!(out, mem.copy_all());
    }
}
