//! arcc — a C front-end and AArch64 assembler toolchain.
//!
//! The front-end lexes and parses a subset of C into an AST; the
//! assembler path encodes AArch64 mnemonics into code words and packs
//! them into relocatable ELF64 objects. Both report through the shared
//! diagnostics machinery of `arcc-diag`.

pub mod cli;
mod compile;
mod error;

pub use compile::{Options, Standard, compile_file, run};
pub use error::{Error, Result};
