//! Immediate operand parsing.

use arcc_diag::{DiagnosticInfo, DiagnosticKind, Diagnostics, Parse, Reader};
use arcc_lex::scan_unsigned;

/// A parsed immediate. Negative values keep their magnitude here and are
/// two's-complemented into `value` at the end of parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Immediate {
    pub value: u64,
    pub is_negative: bool,
}

/// Parses `#[-]<integer>` in any base the lexer accepts.
pub fn parse_immediate<'src>(
    reader: &mut Reader<'src>,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<Immediate> {
    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();

    let fail = |reader: &mut Reader<'src>, diagnostics: &mut Diagnostics<'src>| {
        let hint = if reader.offset() > start {
            reader.slice(start)
        } else {
            &reader.source()[start..(start + 1).min(reader.source().len())]
        };
        diagnostics.push(
            DiagnosticKind::InvalidImmediate,
            DiagnosticInfo {
                position,
                line,
                hint,
            },
        );
        Parse::Invalid
    };

    if reader.peek() != b'#' {
        return fail(reader, diagnostics);
    }
    reader.pop();
    reader.skip_spaces_in_line();

    let mut is_negative = false;
    if reader.peek() == b'-' {
        is_negative = true;
        reader.pop();
    }

    let value = match scan_unsigned(reader, diagnostics) {
        Parse::Match(value) => value,
        Parse::NoMatch => return fail(reader, diagnostics),
        Parse::Invalid => return Parse::Invalid,
    };

    // A suffix or other identifier tail is not a number.
    if is_identifier_byte(reader.peek()) {
        while is_identifier_byte(reader.peek()) {
            reader.pop();
        }
        return fail(reader, diagnostics);
    }

    if value == 0 {
        is_negative = false;
    }

    let value = if is_negative {
        if value > 1 << 63 {
            return fail(reader, diagnostics);
        }
        value.wrapping_neg()
    } else {
        value
    };

    Parse::Match(Immediate { value, is_negative })
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
