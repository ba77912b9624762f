//! Headless capture: PNG screenshots and raw memory dumps.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use invaders_core::core::machine::Machine;
use log::info;

use crate::error::FrontendError;

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> FrontendError + '_ {
    move |source| FrontendError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Save the machine's current display as an RGB PNG.
pub fn save_screenshot(machine: &dyn Machine, path: &Path) -> Result<(), FrontendError> {
    let (width, height) = machine.display_size();
    let mut rgb = vec![0u8; (width * height * 3) as usize];
    machine.render_frame(&mut rgb);

    let file = fs::File::create(path).map_err(write_error(path))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgb)?;

    info!("screenshot written to {}", path.display());
    Ok(())
}

/// Write the full address space, byte for byte.
pub fn dump_core(machine: &dyn Machine, path: &Path) -> Result<(), FrontendError> {
    let image = machine.memory_dump();
    fs::write(path, &image).map_err(write_error(path))?;
    info!("{} bytes of memory dumped to {}", image.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_machines::InvadersSystem;

    fn fresh_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn core_dump_is_full_address_space() {
        let dir = fresh_dir("invaders_dump_test");
        let mut sys = InvadersSystem::new();
        sys.load_program(&[0xAA, 0xBB]).unwrap();

        let path = dir.join("core.dump");
        dump_core(&sys, &path).unwrap();
        let image = fs::read(&path).unwrap();
        assert_eq!(image.len(), 0x10000);
        assert_eq!(&image[..2], &[0xAA, 0xBB]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn screenshot_has_png_signature() {
        let dir = fresh_dir("invaders_screenshot_test");
        let sys = InvadersSystem::new();

        let path = dir.join("frame.png");
        save_screenshot(&sys, &path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unwritable_path_is_reported() {
        let sys = InvadersSystem::new();
        let path = std::env::temp_dir()
            .join("invaders_no_such_dir")
            .join("core.dump");
        let _ = fs::remove_dir_all(path.parent().unwrap());
        assert!(matches!(
            dump_core(&sys, &path),
            Err(FrontendError::Write { .. })
        ));
    }
}
