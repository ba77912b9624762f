//! Optional TOML settings file. Command-line flags take precedence over
//! anything set here.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::FrontendError;

pub const DEFAULT_FRAMES: u64 = 600;
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Where a fault dumps memory when no `dump_path` is configured.
pub const FAULT_DUMP_PATH: &str = "core.dump";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rompath used when `run` is not given one.
    pub rom_path: Option<PathBuf>,
    pub frames: Option<u64>,
    pub dump_path: Option<PathBuf>,
    pub skip_checksums: bool,
    pub log_level: Option<String>,
    pub max_steps: Option<u64>,
}

impl Config {
    pub fn parse(path: &Path, text: &str) -> Result<Self, FrontendError> {
        toml::from_str(text).map_err(|source| FrontendError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given (it must exist), otherwise the per-user file
    /// if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self, FrontendError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&path).map_err(|source| FrontendError::ConfigIo {
            path: path.clone(),
            source,
        })?;
        debug!("config loaded from {}", path.display());
        Self::parse(&path, &text)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn frames(&self) -> u64 {
        self.frames.unwrap_or(DEFAULT_FRAMES)
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps.unwrap_or(DEFAULT_MAX_STEPS)
    }
}

/// `<config dir>/invaders/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("invaders").join("config.toml"))
}
