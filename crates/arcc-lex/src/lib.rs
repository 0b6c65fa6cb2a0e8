//! C lexical analyzer: source text in, token list out.
//!
//! The lexer dispatches five sub-lexers at each non-space position, in a
//! fixed order: string, character constant, punctuator, integer
//! constant, identifier/keyword. Each reports match, no-match, or
//! invalid; invalid tokens are recorded with diagnostics so downstream
//! stages can still run.

mod lexer;
mod tables;
mod token;

pub use lexer::{
    Scan, lex, scan_character, scan_constant, scan_identifier, scan_punctuator, scan_string,
    scan_unsigned,
};
pub use token::{Constant, ConstantKind, Token, TokenKind};
