use std::path::PathBuf;

use invaders_core::cpu::StepError;
use invaders_machines::CpmError;
use invaders_machines::rom_loader::RomLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown machine '{name}' (available: {available})")]
    UnknownMachine { name: String, available: String },

    #[error("no ROM path given on the command line or in the config file")]
    MissingRomPath,

    #[error("ROM path not found: {}", .0.display())]
    RomPathNotFound(PathBuf),

    #[error(transparent)]
    RomLoad(#[from] RomLoadError),

    #[error("machine fault: {0}")]
    Machine(#[from] StepError),

    #[error(transparent)]
    Cpm(#[from] CpmError),

    #[error("bad --press '{press}': {reason}")]
    InputScript { press: String, reason: String },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
