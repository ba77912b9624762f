//! ROM path resolution: loads a [`RomSet`] from a MAME-style rompath,
//! a direct ZIP file, or a directory of loose ROM files.

use invaders_machines::rom_loader::{RomLoadError, RomSet};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::FrontendError;

/// Resolve a ROM path and load all ROM files into a [`RomSet`].
///
/// Resolution order:
/// 1. If `path` ends with `.zip` → load directly as a ZIP archive.
/// 2. If `path` is a directory containing `{rom_name}.zip` → load that ZIP.
/// 3. If `path` is a directory of loose files → load via [`RomSet::from_directory`].
pub fn load_rom_set(rom_name: &str, path: &Path) -> Result<RomSet, FrontendError> {
    // Direct ZIP file
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        return Ok(load_from_zip(path)?);
    }

    // MAME-style rompath: directory containing {rom_name}.zip
    if path.is_dir() {
        let zip_path = path.join(format!("{rom_name}.zip"));
        if zip_path.exists() {
            return Ok(load_from_zip(&zip_path)?);
        }

        // Fallback: directory of loose ROM files
        debug!("loading loose ROM files from {}", path.display());
        return Ok(RomSet::from_directory(path)?);
    }

    Err(FrontendError::RomPathNotFound(path.to_path_buf()))
}

/// Extract all files from a ZIP archive into a [`RomSet`].
fn load_from_zip(path: &Path) -> Result<RomSet, RomLoadError> {
    debug!("loading ROM archive {}", path.display());
    let file = File::open(path).map_err(|e| RomLoadError::io(path, e))?;
    let reader = BufReader::new(file);
    let archive_error = |e: zip::result::ZipError| RomLoadError::Archive {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut archive = zip::ZipArchive::new(reader).map_err(archive_error)?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;

        // Skip directories
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        std::io::Read::read_to_end(&mut entry, &mut data).map_err(|e| RomLoadError::io(path, e))?;
        entries.push((name, data));
    }

    Ok(RomSet::from_entries(entries))
}
