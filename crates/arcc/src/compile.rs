//! The per-file pipeline: read, lex, parse — or assemble and pack.

use std::fs;
use std::path::{Path, PathBuf};

use arcc_asm::assemble;
use arcc_ast::parse;
use arcc_diag::{Diagnostics, Parse};
use arcc_elf::{ObjectData, write_object};
use arcc_lex::lex;
use tracing::{debug, info};

use crate::{Error, Result};

/// The C standard to compile for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Standard {
    C90,
    C95,
    C99,
    C11,
    C17,
    #[default]
    C23,
}

/// Resolved driver options.
#[derive(Clone, Debug)]
pub struct Options {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub standard: Standard,
    pub tab_width: u8,
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            standard: Standard::default(),
            tab_width: 8,
            debug: false,
        }
    }
}

/// Runs the pipeline over every input. Diagnostics go to stderr; the
/// first failing input stops the run.
pub fn run(options: &Options) -> Result<()> {
    for input in &options.inputs {
        compile_file(input, options)?;
    }
    Ok(())
}

/// Compiles or assembles one input file, depending on its extension.
pub fn compile_file(path: &Path, options: &Options) -> Result<()> {
    let source = fs::read_to_string(path).map_err(|source| Error::Input {
        path: path.to_path_buf(),
        source,
    })?;

    let mut diagnostics = Diagnostics::new(path.display().to_string(), options.tab_width);

    let is_assembly = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("s"));

    let result = if is_assembly {
        assemble_file(&source, options, &mut diagnostics)
    } else {
        compile_source(&source, &mut diagnostics)
    };

    if !diagnostics.is_empty() {
        eprint!("{}", diagnostics.render());
    }
    match result {
        Ok(()) if diagnostics.is_empty() => Ok(()),
        Ok(()) => Err(Error::Invalid),
        Err(error) => Err(error),
    }
}

/// Lexes and parses a C source.
fn compile_source<'src>(source: &'src str, diagnostics: &mut Diagnostics<'src>) -> Result<()> {
    let (tokens, valid) = lex(source, diagnostics);
    debug!(tokens = tokens.len(), valid, "lexed");

    let (tree, result) = parse(&tokens, diagnostics);
    debug!(nodes = tree.len(), "parsed");

    if !valid || !result.is_match() {
        return Err(Error::Invalid);
    }
    info!(
        file = diagnostics.file(),
        nodes = tree.len(),
        "front-end finished"
    );
    Ok(())
}

/// Assembles an AArch64 source and, when an output path is configured,
/// packs the code into a relocatable object.
fn assemble_file<'src>(
    source: &'src str,
    options: &Options,
    diagnostics: &mut Diagnostics<'src>,
) -> Result<()> {
    let Parse::Match(codes) = assemble(source, diagnostics) else {
        return Err(Error::Invalid);
    };
    info!(
        file = diagnostics.file(),
        instructions = codes.len(),
        "assembled"
    );

    if let Some(output) = &options.output {
        let text: Vec<u8> = codes.iter().flat_map(|code| code.to_le_bytes()).collect();
        write_object(
            output,
            &ObjectData {
                text: &text,
                ..ObjectData::default()
            },
        )?;
        info!(output = %output.display(), bytes = text.len(), "wrote object");
    }
    Ok(())
}
