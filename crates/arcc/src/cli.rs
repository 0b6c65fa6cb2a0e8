//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::{Options, Standard};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "arcc")]
#[command(about = "C compiler and assembler targeting AArch64")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// Input files: C sources, or AArch64 assembly (.s)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output path (the last one given wins)
    #[arg(short, long, value_name = "FILE", overrides_with = "output")]
    pub output: Option<PathBuf>,

    /// Compile in debug mode
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// C standard to compile for
    #[arg(long, value_enum, value_name = "STD", default_value = "c23")]
    pub standard: StandardArg,

    /// Tab width for position tracking and diagnostics
    #[arg(
        long,
        value_name = "N",
        default_value = "8",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub tab_width: u8,

    /// Print version information
    #[arg(
        short = 'v',
        long = "version",
        action = ArgAction::Version,
        value_parser = clap::value_parser!(bool)
    )]
    pub version: Option<bool>,
}

impl Cli {
    /// Resolves the command line into driver options.
    pub fn options(&self) -> Options {
        Options {
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            standard: self.standard.into(),
            tab_width: self.tab_width,
            debug: self.debug,
        }
    }
}

/// C standard argument.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum StandardArg {
    C90,
    C95,
    C99,
    C11,
    C17,
    #[default]
    C23,
}

impl From<StandardArg> for Standard {
    fn from(argument: StandardArg) -> Self {
        match argument {
            StandardArg::C90 => Self::C90,
            StandardArg::C95 => Self::C95,
            StandardArg::C99 => Self::C99,
            StandardArg::C11 => Self::C11,
            StandardArg::C17 => Self::C17,
            StandardArg::C23 => Self::C23,
        }
    }
}
