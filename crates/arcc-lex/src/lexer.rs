//! The lexer: five sub-lexers dispatched in a fixed order.

use arcc_diag::{DiagnosticInfo, DiagnosticKind, Diagnostics, Parse, Position, Reader};

use crate::tables;
use crate::{Constant, ConstantKind, Token, TokenKind};

/// Outcome of one sub-lexer attempt.
///
/// `Invalid` still carries a token: the lexer records malformed tokens so
/// the parser can keep going, but the overall result is flagged invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scan<'src> {
    Match(Token<'src>),
    NoMatch,
    Invalid(Token<'src>),
}

/// Lexes a whole source buffer.
///
/// Returns the token list and a validity flag. The list is usable for
/// error recovery even when the flag is false; the caller must not treat
/// the program as well-formed in that case.
pub fn lex<'src>(
    source: &'src str,
    diagnostics: &mut Diagnostics<'src>,
) -> (Vec<Token<'src>>, bool) {
    let mut reader = Reader::new(source, diagnostics.tab_width());
    let mut tokens = Vec::new();
    let mut valid = true;

    type ScanFn<'src> = fn(&mut Reader<'src>, &mut Diagnostics<'src>) -> Scan<'src>;
    let scanners: [ScanFn<'src>; 5] = [
        scan_string as ScanFn<'src>,
        scan_character as ScanFn<'src>,
        scan_punctuator as ScanFn<'src>,
        scan_constant as ScanFn<'src>,
        scan_identifier as ScanFn<'src>,
    ];

    'outer: while !reader.is_at_end() {
        reader.skip_spaces();
        if reader.is_at_end() {
            break;
        }

        for scanner in scanners {
            match scanner(&mut reader, diagnostics) {
                Scan::Match(token) => {
                    tokens.push(token);
                    continue 'outer;
                }
                Scan::Invalid(token) => {
                    tokens.push(token);
                    valid = false;
                    continue 'outer;
                }
                Scan::NoMatch => {}
            }
        }

        // Nothing matched: report the byte and move on.
        let start = reader.offset();
        let info = DiagnosticInfo {
            position: reader.position(),
            line: reader.line(),
            hint: hint_at(reader.source(), start, start + 1),
        };
        diagnostics.push(DiagnosticKind::UnknownToken, info);
        reader.pop();
        valid = false;
    }

    (tokens, valid)
}

/// Lexes a string literal.
///
/// The literal must close on its own line; `\"` does not terminate it.
/// Non-printable bytes are diagnosed but do not end the string.
pub fn scan_string<'src>(
    reader: &mut Reader<'src>,
    diagnostics: &mut Diagnostics<'src>,
) -> Scan<'src> {
    if reader.peek() != b'"' {
        return Scan::NoMatch;
    }

    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();
    let mut invalid = false;

    let mut previous = reader.peek();
    reader.pop();

    loop {
        let byte = reader.peek();
        if reader.is_at_end() || byte == b'\n' || (byte == b'"' && previous != b'\\') {
            break;
        }

        if !byte.is_ascii_graphic() && byte != b' ' {
            let offset = reader.offset();
            diagnostics.push(
                DiagnosticKind::InvalidStringCharacter,
                DiagnosticInfo {
                    position: reader.position(),
                    line,
                    hint: hint_at(reader.source(), offset, offset + 1),
                },
            );
            invalid = true;
        }

        previous = byte;
        reader.pop();
    }

    if reader.peek() == b'"' {
        reader.pop();
    } else {
        invalid = true;
        diagnostics.push(
            DiagnosticKind::UnfinishedString,
            DiagnosticInfo {
                position,
                line,
                hint: reader.slice(start),
            },
        );
    }

    let token = Token::new(
        TokenKind::String,
        DiagnosticInfo {
            position,
            line,
            hint: reader.slice(start),
        },
    );
    if invalid { Scan::Invalid(token) } else { Scan::Match(token) }
}

/// Lexes a character constant: exactly one byte between single quotes.
pub fn scan_character<'src>(
    reader: &mut Reader<'src>,
    diagnostics: &mut Diagnostics<'src>,
) -> Scan<'src> {
    if reader.peek() != b'\'' {
        return Scan::NoMatch;
    }

    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();
    let source = reader.source();

    reader.pop();

    let first = reader.peek();
    let second = reader.peek_at(1);
    let at_line_end = reader.is_at_end() || first == b'\n';

    let mut invalid = false;
    let mut hint_length = 3;
    if at_line_end || first == b'\'' || second != b'\'' {
        invalid = true;
        hint_length = if at_line_end { 1 } else { 2 };
    }

    let value;
    if at_line_end {
        value = 0;
    } else if first == b'\'' {
        value = 0;
        reader.pop();
    } else {
        value = u64::from(first);
        reader.skip(1 + usize::from(second == b'\''));
    }

    let info = DiagnosticInfo {
        position,
        line,
        hint: hint_at(source, start, start + hint_length),
    };
    if invalid {
        diagnostics.push(DiagnosticKind::InvalidCharacterConstant, info);
    }

    let token = Token::constant(ConstantKind::Int, value, info);
    if invalid { Scan::Invalid(token) } else { Scan::Match(token) }
}

/// Lexes a punctuator by longest-first table lookup.
pub fn scan_punctuator<'src>(
    reader: &mut Reader<'src>,
    _diagnostics: &mut Diagnostics<'src>,
) -> Scan<'src> {
    let Some((text, kind)) = tables::punctuator(reader.rest()) else {
        return Scan::NoMatch;
    };

    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();
    reader.skip(text.len());

    Scan::Match(Token::new(
        kind,
        DiagnosticInfo {
            position,
            line,
            hint: reader.slice(start),
        },
    ))
}

/// True if `byte` is a digit in `base` (2, 8, 10, or 16).
fn is_digit(byte: u8, base: u32) -> bool {
    char::from(byte).to_digit(base).is_some()
}

/// True if `byte` can continue an identifier.
fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Lexes an unsigned integer in any base, for assembler immediates.
///
/// The base is detected from the `0x`/`0b`/`0` prefix as for constants.
/// Overflow is diagnosed as a too-large constant.
pub fn scan_unsigned<'src>(
    reader: &mut Reader<'src>,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<u64> {
    if !reader.peek().is_ascii_digit() {
        return Parse::NoMatch;
    }

    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();

    let base = scan_base(reader);

    let mut value = 0u64;
    while is_digit(reader.peek(), base) {
        let digit = u64::from(char::from(reader.peek()).to_digit(base).unwrap_or(0));
        let Some(shifted) = value
            .checked_mul(u64::from(base))
            .and_then(|value| value.checked_add(digit))
        else {
            diagnostics.push(
                DiagnosticKind::ConstantTooLarge,
                DiagnosticInfo {
                    position,
                    line,
                    hint: reader.slice(start),
                },
            );
            return Parse::Invalid;
        };
        value = shifted;
        reader.pop();
    }

    Parse::Match(value)
}

/// Detects the base prefix of a constant and consumes it.
///
/// `0x`/`0X` is 16 and `0b`/`0B` is 2 when a digit of that base follows
/// (digit separators are looked through); a remaining leading `0` means
/// octal. The prefix is only consumed for bases 2 and 16.
fn scan_base(reader: &mut Reader<'_>) -> u32 {
    if reader.peek() != b'0' {
        return 10;
    }

    let base = match reader.peek_at(1).to_ascii_lowercase() {
        b'x' => 16,
        b'b' => 2,
        _ => return 8,
    };

    let mut lookahead = 2;
    while reader.peek_at(lookahead) == b'\'' {
        lookahead += 1;
    }
    if !is_digit(reader.peek_at(lookahead), base) {
        return 8;
    }

    reader.skip(2);
    base
}

/// Lexes an integer constant with base prefix, digit separators, and
/// suffix, and derives the promoted type.
pub fn scan_constant<'src>(
    reader: &mut Reader<'src>,
    diagnostics: &mut Diagnostics<'src>,
) -> Scan<'src> {
    if !reader.peek().is_ascii_digit() {
        return Scan::NoMatch;
    }

    let position = reader.position();
    let line = reader.line();
    let source = reader.source();
    let start = reader.offset();
    let mut invalid = false;

    let base = scan_base(reader);

    // The full token extends past the digits over any alphanumeric tail,
    // which is either a suffix or garbage.
    let bytes = source.as_bytes();
    let mut end = reader.offset();
    while end < bytes.len() && (is_digit(bytes[end], base) || bytes[end] == b'\'') {
        end += 1;
    }
    while end < bytes.len() && is_identifier_byte(bytes[end]) {
        end += 1;
    }
    let info = DiagnosticInfo {
        position,
        line,
        hint: &source[start..end],
    };

    // Value, diagnosing separator misuse.
    let mut value = 0u64;
    let mut previous_separator = false;
    if reader.peek() == b'\'' {
        let offset = reader.offset();
        diagnostics.push(
            DiagnosticKind::SeparatorAfterBase,
            DiagnosticInfo {
                position: reader.position(),
                line,
                hint: &source[offset..=offset],
            },
        );
        reader.pop();
        previous_separator = true;
    }
    while is_digit(reader.peek(), base) || reader.peek() == b'\'' {
        if reader.peek() == b'\'' {
            if previous_separator {
                let offset = reader.offset();
                diagnostics.push(
                    DiagnosticKind::DuplicateSeparator,
                    DiagnosticInfo {
                        position: reader.position(),
                        line,
                        hint: &source[offset..=offset],
                    },
                );
            }
            previous_separator = true;
            reader.pop();
            continue;
        }
        previous_separator = false;

        let digit = u64::from(char::from(reader.peek()).to_digit(base).unwrap_or(0));
        let Some(next) = value
            .checked_mul(u64::from(base))
            .and_then(|value| value.checked_add(digit))
        else {
            invalid = true;
            diagnostics.push(DiagnosticKind::ConstantTooLarge, info);
            break;
        };
        value = next;
        reader.pop();
    }

    if previous_separator {
        invalid = true;
        let offset = reader.offset() - 1;
        diagnostics.push(
            DiagnosticKind::TrailingSeparator,
            DiagnosticInfo {
                position: Position::new(position.line, reader.position().column - 1),
                line,
                hint: &source[offset..=offset],
            },
        );
    }

    // Suffix and promotion.
    let kind = scan_suffix_and_promote(reader, base, value, info, diagnostics, &mut invalid);

    // Consume the rest of the token (suffix or garbage tail).
    reader.skip(end - reader.offset());

    let token = Token::constant(kind, value, info);
    if invalid { Scan::Invalid(token) } else { Scan::Match(token) }
}

/// Recognizes the constant suffix at the reader and applies the
/// promotion rules of the suffix, base, and value.
fn scan_suffix_and_promote<'src>(
    reader: &Reader<'src>,
    base: u32,
    value: u64,
    info: DiagnosticInfo<'src>,
    diagnostics: &mut Diagnostics<'src>,
    invalid: &mut bool,
) -> ConstantKind {
    const INT_MAX: u64 = i32::MAX as u64;
    const UINT_MAX: u64 = u32::MAX as u64;
    const LONG_MAX: u64 = i64::MAX as u64;

    let raw = [
        reader.peek(),
        reader.peek_at(1),
        reader.peek_at(2),
        reader.peek_at(3),
    ];
    let lower = raw.map(|byte| byte.to_ascii_lowercase());

    // ull / llu, with both `l`s in the same case.
    if ((lower[0] == b'u' && lower[1] == b'l' && raw[2] == raw[1])
        || (lower[0] == b'l' && raw[1] == raw[0] && lower[2] == b'u'))
        && !is_identifier_byte(raw[3])
    {
        return ConstantKind::UnsignedLongLong;
    }

    // ul / lu.
    if ((lower[0] == b'u' && lower[1] == b'l') || (lower[0] == b'l' && lower[1] == b'u'))
        && !is_identifier_byte(raw[2])
    {
        return ConstantKind::UnsignedLong;
    }

    // u.
    if lower[0] == b'u' && !is_identifier_byte(raw[1]) {
        if value > UINT_MAX {
            return ConstantKind::UnsignedLong;
        }
        return ConstantKind::UnsignedInt;
    }

    // ll, both in the same case.
    if lower[0] == b'l' && raw[1] == raw[0] && !is_identifier_byte(raw[2]) {
        if base == 10 {
            if value > LONG_MAX {
                *invalid = true;
                diagnostics.push(DiagnosticKind::ConstantTooLarge, info);
            }
            return ConstantKind::LongLong;
        }
        if value > LONG_MAX {
            return ConstantKind::UnsignedLongLong;
        }
        return ConstantKind::LongLong;
    }

    // l. Non-decimal values walk the unsigned ladder, and with long as
    // wide as long long the steps above unsigned long collapse into
    // unsigned long long.
    if lower[0] == b'l' && !is_identifier_byte(raw[1]) {
        if base == 10 {
            if value > LONG_MAX {
                *invalid = true;
                diagnostics.push(DiagnosticKind::ConstantTooLarge, info);
                return ConstantKind::LongLong;
            }
            return ConstantKind::Long;
        }
        if value > LONG_MAX {
            return ConstantKind::UnsignedLongLong;
        }
        return ConstantKind::Long;
    }

    // No suffix. The same collapse applies past long.
    let kind = if base == 10 {
        if value > LONG_MAX {
            *invalid = true;
            diagnostics.push(DiagnosticKind::ConstantTooLarge, info);
            ConstantKind::LongLong
        } else if value > INT_MAX {
            ConstantKind::Long
        } else {
            ConstantKind::Int
        }
    } else if value > LONG_MAX {
        ConstantKind::UnsignedLongLong
    } else if value > UINT_MAX {
        ConstantKind::Long
    } else if value > INT_MAX {
        ConstantKind::UnsignedInt
    } else {
        ConstantKind::Int
    };

    if is_identifier_byte(raw[0]) {
        *invalid = true;
        let offset = reader.offset();
        let hint_end = hint_start(info, reader) + info.hint.len();
        diagnostics.push(
            DiagnosticKind::InvalidConstantSuffix,
            DiagnosticInfo {
                position: reader.position(),
                line: info.line,
                hint: &reader.source()[offset..hint_end],
            },
        );
    }

    kind
}

/// Byte offset of a token's hint in the source.
fn hint_start(info: DiagnosticInfo<'_>, reader: &Reader<'_>) -> usize {
    info.hint.as_ptr() as usize - reader.source().as_ptr() as usize
}

/// Slices a hint out of the source, widening to character boundaries so
/// stray non-ASCII bytes cannot split a character.
fn hint_at(source: &str, start: usize, end: usize) -> &str {
    let mut start = start.min(source.len());
    while !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end.min(source.len());
    while !source.is_char_boundary(end) {
        end += 1;
    }
    &source[start..end]
}

/// Lexes an identifier and resolves keywords.
pub fn scan_identifier<'src>(
    reader: &mut Reader<'src>,
    _diagnostics: &mut Diagnostics<'src>,
) -> Scan<'src> {
    let first = reader.peek();
    if !first.is_ascii_alphabetic() && first != b'_' {
        return Scan::NoMatch;
    }

    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();

    reader.pop();
    while is_identifier_byte(reader.peek()) {
        reader.pop();
    }

    let hint = reader.slice(start);
    let kind = tables::keyword(hint).unwrap_or(TokenKind::Identifier);

    Scan::Match(Token::new(
        kind,
        DiagnosticInfo {
            position,
            line,
            hint,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcc_diag::DiagnosticKind;

    fn diagnostics() -> Diagnostics<'static> {
        Diagnostics::new("test.c", 8)
    }

    fn lex_valid(source: &'static str) -> Vec<Token<'static>> {
        let mut diagnostics = diagnostics();
        let (tokens, valid) = lex(source, &mut diagnostics);
        assert!(valid, "{source}: {:?}", diagnostics.entries());
        assert!(diagnostics.is_empty());
        tokens
    }

    fn kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
        tokens.iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_lex_empty() {
        assert!(lex_valid("").is_empty());
        assert!(lex_valid("  \t\n ").is_empty());
    }

    #[test]
    fn test_lex_is_deterministic() {
        let source = "int main(void) { return 0x1F; }";
        let mut first_diagnostics = diagnostics();
        let mut second_diagnostics = diagnostics();
        let first = lex(source, &mut first_diagnostics);
        let second = lex(source, &mut second_diagnostics);
        assert_eq!(first, second);
        assert_eq!(first_diagnostics.entries(), second_diagnostics.entries());
    }

    #[test]
    fn test_lex_stream() {
        // The packed stream exercises every sub-lexer.
        let tokens = lex_valid("i-*=p[\"s\"'c'5ul/x");
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Identifier,
                TokenKind::Minus,
                TokenKind::StarEqual,
                TokenKind::Identifier,
                TokenKind::OpenBracket,
                TokenKind::String,
                TokenKind::Constant,
                TokenKind::Constant,
                TokenKind::Slash,
                TokenKind::Identifier,
            ]
        );
        assert_eq!(tokens[0].text(), "i");
        assert_eq!(tokens[3].text(), "p");
        assert_eq!(tokens[5].text(), "\"s\"");
        assert_eq!(
            tokens[6].constant,
            Some(Constant::new(ConstantKind::Int, u64::from(b'c')))
        );
        assert_eq!(
            tokens[7].constant,
            Some(Constant::new(ConstantKind::UnsignedLong, 5))
        );
        assert_eq!(tokens[9].text(), "x");
    }

    #[test]
    fn test_token_hints_reconstruct_source() {
        let source = "int a = b + 42;";
        let tokens = lex_valid(source);
        let mut rebuilt = String::new();
        for token in &tokens {
            let start = token.info.hint.as_ptr() as usize - source.as_ptr() as usize;
            assert_eq!(&source[start..start + token.info.hint.len()], token.text());
            if !rebuilt.is_empty() {
                rebuilt.push(' ');
            }
            rebuilt.push_str(token.text());
        }
        assert_eq!(rebuilt, "int a = b + 42 ;");
    }

    #[test]
    fn test_positions_track_columns() {
        let tokens = lex_valid("a bb\n ccc");
        assert_eq!(tokens[0].info.position, Position::new(1, 1));
        assert_eq!(tokens[1].info.position, Position::new(1, 3));
        assert_eq!(tokens[2].info.position, Position::new(2, 2));
        // End column of a token is its column plus hint length.
        assert_eq!(
            tokens[0].info.position.column + u32::try_from(tokens[0].text().len()).unwrap(),
            2
        );
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds(&lex_valid("+++")),
            [TokenKind::PlusPlus, TokenKind::Plus]
        );
        assert_eq!(
            kinds(&lex_valid("+===")),
            [TokenKind::PlusEqual, TokenKind::EqualEqual]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = lex_valid("while whilex _Bool bool");
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::While,
                TokenKind::Identifier,
                TokenKind::UnderscoreBool,
                TokenKind::Bool,
            ]
        );
    }

    #[test]
    fn test_decimal_promotion() {
        let cases: &[(&str, ConstantKind, u64)] = &[
            ("0", ConstantKind::Int, 0),
            ("2147483647", ConstantKind::Int, 2_147_483_647),
            ("2147483648", ConstantKind::Long, 2_147_483_648),
            ("4294967295", ConstantKind::Long, 4_294_967_295),
            ("9223372036854775807", ConstantKind::Long, i64::MAX as u64),
            ("5u", ConstantKind::UnsignedInt, 5),
            ("4294967296u", ConstantKind::UnsignedLong, 4_294_967_296),
            ("5l", ConstantKind::Long, 5),
            ("5ll", ConstantKind::LongLong, 5),
            ("5ul", ConstantKind::UnsignedLong, 5),
            ("5lu", ConstantKind::UnsignedLong, 5),
            ("5ull", ConstantKind::UnsignedLongLong, 5),
            ("5llu", ConstantKind::UnsignedLongLong, 5),
            ("5LL", ConstantKind::LongLong, 5),
        ];
        for &(source, kind, value) in cases {
            let tokens = lex_valid(source);
            assert_eq!(tokens.len(), 1, "{source}");
            assert_eq!(tokens[0].constant, Some(Constant::new(kind, value)), "{source}");
        }
    }

    #[test]
    fn test_hexadecimal_promotion() {
        let cases: &[(&str, ConstantKind, u64)] = &[
            ("0x7FFFFFFF", ConstantKind::Int, 0x7FFF_FFFF),
            ("0x80000000", ConstantKind::UnsignedInt, 0x8000_0000),
            ("0xFFFFFFFF", ConstantKind::UnsignedInt, 0xFFFF_FFFF),
            ("0x100000000", ConstantKind::Long, 0x1_0000_0000),
            ("0x8000000000000000", ConstantKind::UnsignedLongLong, 1 << 63),
            ("0xFFFFFFFFFFFFFFFF", ConstantKind::UnsignedLongLong, u64::MAX),
            ("0xFFFFFFFFFFFFFFFFull", ConstantKind::UnsignedLongLong, u64::MAX),
            ("0xabcdef", ConstantKind::Int, 0x00AB_CDEF),
            ("0x42L", ConstantKind::Long, 0x42),
        ];
        for &(source, kind, value) in cases {
            let tokens = lex_valid(source);
            assert_eq!(tokens[0].constant, Some(Constant::new(kind, value)), "{source}");
        }
    }

    #[test]
    fn test_binary_and_octal() {
        let cases: &[(&str, u64)] = &[("0b101", 5), ("0B11", 3), ("017", 15), ("0", 0)];
        for &(source, value) in cases {
            let tokens = lex_valid(source);
            assert_eq!(
                tokens[0].constant,
                Some(Constant::new(ConstantKind::Int, value)),
                "{source}"
            );
        }
    }

    #[test]
    fn test_decimal_too_large() {
        // 2^63 has no signed representation.
        let mut diagnostics = diagnostics();
        let (tokens, valid) = lex("9223372036854775808", &mut diagnostics);
        assert!(!valid);
        assert_eq!(tokens.len(), 1);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::ConstantTooLarge);
    }

    #[test]
    fn test_invalid_suffix() {
        let source = "int a = 0xyz;";
        let mut diagnostics = diagnostics();
        let (tokens, valid) = lex(source, &mut diagnostics);
        assert!(!valid);
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Constant,
                TokenKind::Semicolon,
            ]
        );
        // `0xyz` has no hex digit after the prefix, so the constant is an
        // octal 0 with the garbage tail as its suffix.
        assert_eq!(tokens[3].constant, Some(Constant::new(ConstantKind::Int, 0)));
        assert_eq!(tokens[3].text(), "0xyz");
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.entries()[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::InvalidConstantSuffix);
        assert_eq!(diagnostic.info.hint, "xyz");
    }

    #[test]
    fn test_digit_separators() {
        let tokens = lex_valid("1'000'000");
        assert_eq!(
            tokens[0].constant,
            Some(Constant::new(ConstantKind::Int, 1_000_000))
        );
        assert_eq!(tokens[0].text(), "1'000'000");
    }

    #[test]
    fn test_separator_after_base() {
        let mut diagnostics = diagnostics();
        let (tokens, _) = lex("0x'12''3'''4'", &mut diagnostics);
        assert_eq!(tokens[0].constant, Some(Constant::new(ConstantKind::Int, 0x1234)));
        let kinds: Vec<_> = diagnostics.entries().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            [
                DiagnosticKind::SeparatorAfterBase,
                DiagnosticKind::DuplicateSeparator,
                DiagnosticKind::DuplicateSeparator,
                DiagnosticKind::DuplicateSeparator,
                DiagnosticKind::TrailingSeparator,
            ]
        );
    }

    #[test]
    fn test_trailing_separator_before_suffix() {
        let mut diagnostics = diagnostics();
        let (tokens, valid) = lex("0b'''101'''lu", &mut diagnostics);
        assert!(!valid);
        assert_eq!(
            tokens[0].constant,
            Some(Constant::new(ConstantKind::UnsignedLong, 0b101))
        );
    }

    #[test]
    fn test_character_constants() {
        let tokens = lex_valid("'a' ' '");
        assert_eq!(
            tokens[0].constant,
            Some(Constant::new(ConstantKind::Int, u64::from(b'a')))
        );
        assert_eq!(
            tokens[1].constant,
            Some(Constant::new(ConstantKind::Int, u64::from(b' ')))
        );
    }

    #[test]
    fn test_invalid_character_constants() {
        for source in ["''", "'ab'", "'"] {
            let mut diagnostics = diagnostics();
            let (_, valid) = lex(source, &mut diagnostics);
            assert!(!valid, "{source}");
            assert!(
                diagnostics
                    .entries()
                    .iter()
                    .any(|d| d.kind == DiagnosticKind::InvalidCharacterConstant),
                "{source}"
            );
        }
    }

    #[test]
    fn test_unfinished_string() {
        let mut diagnostics = diagnostics();
        let (tokens, valid) = lex("\"abc", &mut diagnostics);
        assert!(!valid);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::UnfinishedString);
    }

    #[test]
    fn test_string_escaped_quote_does_not_terminate() {
        let tokens = lex_valid("\"a\\\"b\"");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(), "\"a\\\"b\"");
    }

    #[test]
    fn test_unknown_token() {
        let mut diagnostics = diagnostics();
        let (tokens, valid) = lex("a @ b", &mut diagnostics);
        assert!(!valid);
        assert_eq!(kinds(&tokens), [TokenKind::Identifier, TokenKind::Identifier]);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::UnknownToken);
        assert_eq!(diagnostics.entries()[0].info.hint, "@");
    }

    #[test]
    fn test_scan_unsigned() {
        let mut diagnostics = diagnostics();
        let mut reader = Reader::new("4095, LSL", 8);
        assert_eq!(scan_unsigned(&mut reader, &mut diagnostics), Parse::Match(4095));
        assert_eq!(reader.peek(), b',');

        let mut reader = Reader::new("0x10", 8);
        assert_eq!(scan_unsigned(&mut reader, &mut diagnostics), Parse::Match(16));

        let mut reader = Reader::new("abc", 8);
        assert_eq!(scan_unsigned(&mut reader, &mut diagnostics), Parse::NoMatch);
    }
}
