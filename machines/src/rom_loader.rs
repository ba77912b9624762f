//! ROM set loading and CRC32 validation.
//!
//! A [`RomSet`] is a bag of named files (from a directory, a ZIP archive
//! unpacked by the frontend, or byte slices in tests). A [`RomRegion`]
//! describes how those files are laid out back to back in one address
//! range and validates each against its expected size and checksum.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CRC-32 (private)
// ---------------------------------------------------------------------------

/// CRC-32 lookup table (reflected polynomial 0xEDB88320), as used by ZIP
/// and MAME ROM listings.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    crc ^ 0xFFFF_FFFF
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RomLoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ROM archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    #[error("missing ROM file: {0}")]
    MissingFile(String),

    #[error("ROM {file}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    #[error("ROM {file}: CRC32 expected 0x{expected:08X}, got 0x{actual:08X}")]
    ChecksumMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },

    #[error("ROM image does not fit the address space")]
    Placement(#[from] invaders_core::core::LoadError),
}

impl RomLoadError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// RomSet
// ---------------------------------------------------------------------------

/// Named ROM files, keyed by file name without directories.
#[derive(Debug)]
pub struct RomSet {
    files: HashMap<String, Vec<u8>>,
}

impl RomSet {
    /// Read every regular file in `path` (non-recursive).
    pub fn from_directory(path: &Path) -> Result<Self, RomLoadError> {
        let mut files = HashMap::new();
        let dir = std::fs::read_dir(path).map_err(|e| RomLoadError::io(path, e))?;
        for entry in dir {
            let file_path = entry.map_err(|e| RomLoadError::io(path, e))?.path();
            if !file_path.is_file() {
                continue;
            }
            let Some(name) = file_path.file_name() else {
                continue;
            };
            let data = std::fs::read(&file_path).map_err(|e| RomLoadError::io(&file_path, e))?;
            debug!("found ROM file {} ({} bytes)", file_path.display(), data.len());
            files.insert(name.to_string_lossy().into_owned(), data);
        }
        Ok(Self { files })
    }

    /// Build a set from owned (name, data) pairs, e.g. ZIP entries. Any
    /// directory prefix in the name is dropped.
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        let files = entries
            .into_iter()
            .map(|(name, data)| {
                let base = name.rsplit('/').next().unwrap_or(&name).to_string();
                (base, data)
            })
            .collect();
        Self { files }
    }

    /// Create a RomSet from programmatic byte slices (for testing).
    pub fn from_slices(entries: &[(&str, &[u8])]) -> Self {
        let files = entries
            .iter()
            .map(|(name, data)| (name.to_string(), data.to_vec()))
            .collect();
        Self { files }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(|v| v.as_slice())
    }

    pub fn require(&self, name: &str) -> Result<&[u8], RomLoadError> {
        self.get(name)
            .ok_or_else(|| RomLoadError::MissingFile(name.to_string()))
    }

    pub fn require_sized(&self, name: &str, expected_size: usize) -> Result<&[u8], RomLoadError> {
        let data = self.require(name)?;
        if data.len() != expected_size {
            return Err(RomLoadError::SizeMismatch {
                file: name.to_string(),
                expected: expected_size,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(|s| s.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// RomEntry / RomRegion
// ---------------------------------------------------------------------------

/// One ROM chip within a region.
pub struct RomEntry {
    pub name: &'static str,
    pub size: usize,
    /// Offset within the region.
    pub offset: usize,
    /// `None` accepts any contents.
    pub crc32: Option<u32>,
}

/// A contiguous address range assembled from several ROM chips.
pub struct RomRegion {
    pub size: usize,
    pub entries: &'static [RomEntry],
}

impl RomRegion {
    /// Assemble the region, checking sizes and (optionally) CRC32s.
    pub fn load(&self, rom_set: &RomSet, verify_checksums: bool) -> Result<Vec<u8>, RomLoadError> {
        let mut region = vec![0u8; self.size];

        for entry in self.entries {
            debug_assert!(
                entry.offset + entry.size <= self.size,
                "RomEntry '{}' exceeds region bounds",
                entry.name,
            );

            let data = rom_set.require_sized(entry.name, entry.size)?;

            if let (true, Some(expected)) = (verify_checksums, entry.crc32) {
                let actual = crc32(data);
                if actual != expected {
                    return Err(RomLoadError::ChecksumMismatch {
                        file: entry.name.to_string(),
                        expected,
                        actual,
                    });
                }
            }

            region[entry.offset..entry.offset + entry.size].copy_from_slice(data);
        }

        Ok(region)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
