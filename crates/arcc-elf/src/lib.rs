//! ELF64 relocatable object writer and validating reader for AArch64.

mod constants;
mod read;
mod write;

pub use constants::*;
pub use read::validate;
pub use write::{ObjectData, object_bytes, write_object};

use thiserror::Error;

/// ELF reading and writing errors.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("ELF data too small")]
    TooSmall,
    #[error("Invalid ELF magic number")]
    InvalidMagic,
    #[error("Only little-endian ELF supported")]
    NotLittleEndian,
    #[error("Unsupported ELF class: {0}")]
    UnsupportedClass(u8),
    #[error("Unsupported ELF version")]
    BadVersion,
    #[error("Not a relocatable object")]
    NotRelocatable,
    #[error("Not an AArch64 object")]
    WrongMachine,
    #[error("Header sizes do not match ELF64")]
    HeaderMismatch,
    #[error("Section header out of bounds")]
    SectionOutOfBounds,
    #[error("Malformed section table")]
    BadSectionTable,
    #[error("First section header must be reserved")]
    BadFirstSection,
    #[error("Malformed string table")]
    BadStringTable,
    #[error("Malformed symbol table")]
    BadSymbolTable,
    #[error("More than one symbol table")]
    MultipleSymbolTables,
    #[error("Malformed relocation section")]
    BadRelocationSection,
    #[error("Section {0} has the wrong type or flags")]
    SectionTypeMismatch(String),
    #[error("Section alignment must be non-zero")]
    BadAlignment,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ElfError>;
