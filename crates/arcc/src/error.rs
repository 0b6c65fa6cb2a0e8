use std::path::PathBuf;

use thiserror::Error;

/// Driver errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open file \"{path}\": {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ELF error: {0}")]
    Elf(#[from] arcc_elf::ElfError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input")]
    Invalid,
}

pub type Result<T> = std::result::Result<T, Error>;
