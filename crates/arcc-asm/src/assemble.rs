//! Two-pass assembler: labels first, then instructions.

use arcc_diag::{DiagnosticInfo, DiagnosticKind, Diagnostics, Parse, Position, Reader};
use rustc_hash::FxHashMap;

use crate::immediate::parse_immediate;
use crate::register::{Register, parse_register};
use crate::table::{FORMS, Form, Operand, mnemonic_group};
use crate::bitmask;

/// A label: the offset of the instruction it precedes, in words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Label {
    pub offset: usize,
}

pub(crate) type Labels<'src> = FxHashMap<&'src str, Label>;

/// Longest mnemonic length.
const MNEMONIC_MAX: usize = 4;

/// Assembles a source text into 32-bit code words.
///
/// Pass one registers the labels, pass two encodes the instructions; a
/// mnemonic with several forms is resolved by trying each form under a
/// speculative checkpoint.
pub fn assemble<'src>(
    source: &'src str,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<Vec<u32>> {
    let mut labels = Labels::default();
    if collect_labels(source, &mut labels, diagnostics) == Parse::Invalid {
        return Parse::Invalid;
    }

    let mut reader = Reader::new(source, diagnostics.tab_width());
    let mut codes = Vec::new();

    loop {
        reader.skip_spaces();
        while try_skip_label(&mut reader) {
            reader.skip_spaces();
        }
        if reader.is_at_end() {
            break;
        }

        match assemble_instruction(&mut reader, &labels, codes.len(), diagnostics) {
            Parse::Match(code) => codes.push(code),
            _ => return Parse::Invalid,
        }
    }

    Parse::Match(codes)
}

/// Pass one: registers every label definition with the offset of the
/// instruction that follows it.
fn collect_labels<'src>(
    source: &'src str,
    labels: &mut Labels<'src>,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse {
    let mut reader = Reader::new(source, diagnostics.tab_width());
    let mut offset = 0usize;

    loop {
        reader.skip_spaces();
        if reader.is_at_end() {
            return Parse::Match(());
        }

        if !reader.line_rest().contains(':') {
            // An instruction line; only plausible instructions count.
            if reader.peek().is_ascii_alphabetic() || reader.peek() == b'_' {
                offset += 1;
            }
            reader.skip_line();
            continue;
        }

        // A label definition: identifier, optional spaces, colon.
        let position = reader.position();
        let line = reader.line();
        let start = reader.offset();

        let valid = reader.peek().is_ascii_alphabetic() || reader.peek() == b'_';
        while is_identifier_byte(reader.peek()) {
            reader.pop();
        }
        let name = reader.slice(start);
        reader.skip_spaces_in_line();

        if !valid || reader.peek() != b':' {
            // Extend the hint to just before the colon.
            let colon = reader.offset()
                + reader
                    .line_rest()
                    .find(':')
                    .unwrap_or(reader.line_rest().len());
            let mut end = colon;
            while end > start && source.as_bytes()[end - 1].is_ascii_whitespace() {
                end -= 1;
            }
            diagnostics.push(
                DiagnosticKind::InvalidLabel,
                DiagnosticInfo {
                    position,
                    line,
                    hint: &source[start..end],
                },
            );
            return Parse::Invalid;
        }

        let info = DiagnosticInfo {
            position,
            line,
            hint: name,
        };
        if labels.contains_key(name) {
            diagnostics.push(DiagnosticKind::DuplicateLabel, info);
            return Parse::Invalid;
        }
        labels.insert(name, Label { offset });

        reader.pop();
    }
}

/// Consumes a `label:` prefix at the cursor if one is there.
fn try_skip_label(reader: &mut Reader<'_>) -> bool {
    if !reader.peek().is_ascii_alphabetic() && reader.peek() != b'_' {
        return false;
    }

    let snapshot = *reader;
    while is_identifier_byte(reader.peek()) {
        reader.pop();
    }
    reader.skip_spaces_in_line();

    if reader.peek() == b':' {
        reader.pop();
        true
    } else {
        *reader = snapshot;
        false
    }
}

/// Pass two, one instruction: resolves the mnemonic group and tries each
/// form, rolling the reader and diagnostics back between attempts.
fn assemble_instruction<'src>(
    reader: &mut Reader<'src>,
    labels: &Labels<'src>,
    offset: usize,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<u32> {
    let position = reader.position();
    let line = reader.line();
    let start = reader.offset();

    let mut mnemonic = [0u8; MNEMONIC_MAX];
    let mut length = 0usize;
    while length < MNEMONIC_MAX && is_identifier_byte(reader.peek()) {
        mnemonic[length] = reader.peek().to_ascii_uppercase();
        length += 1;
        reader.pop();
    }

    if length == MNEMONIC_MAX && is_identifier_byte(reader.peek()) {
        while is_identifier_byte(reader.peek()) {
            reader.pop();
        }
        diagnostics.push(
            DiagnosticKind::UnknownInstruction,
            DiagnosticInfo {
                position,
                line,
                hint: reader.slice(start),
            },
        );
        return Parse::Invalid;
    }

    let mnemonic = std::str::from_utf8(&mnemonic[..length]).unwrap_or("");
    let Some((first, last)) = mnemonic_group(mnemonic) else {
        diagnostics.push(
            DiagnosticKind::UnknownInstruction,
            DiagnosticInfo {
                position,
                line,
                hint: reader.slice(start),
            },
        );
        return Parse::Invalid;
    };

    for index in first..=last {
        let snapshot = *reader;
        let diagnostics_mark = diagnostics.len();

        match encode_instruction(reader, labels, offset, &FORMS[index], diagnostics) {
            Parse::NoMatch => {
                if index < last {
                    *reader = snapshot;
                    diagnostics.truncate(diagnostics_mark);
                }
            }
            outcome => return outcome,
        }
    }

    Parse::Invalid
}

/// Encodes one instruction against one form.
///
/// No-match means another form of the mnemonic should be tried; the
/// caller rolls back the reader and any diagnostics this attempt pushed.
fn encode_instruction<'src>(
    reader: &mut Reader<'src>,
    labels: &Labels<'src>,
    offset: usize,
    form: &Form,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<u32> {
    let mut encoder = Encoder {
        reader,
        labels,
        offset,
        diagnostics,
        code: form.base,
        sf_bit: None,
        is_x: true,
        registers: Vec::new(),
        first_argument: true,
    };

    for operand in form.operands {
        match encoder.operand(operand) {
            Parse::Match(()) => {}
            outcome => return failed(outcome),
        }
    }
    encoder.finish()
}

/// State threaded through the operands of one instruction.
struct Encoder<'r, 'd, 'src> {
    reader: &'r mut Reader<'src>,
    labels: &'r Labels<'src>,
    offset: usize,
    diagnostics: &'d mut Diagnostics<'src>,
    code: u32,
    sf_bit: Option<u8>,
    is_x: bool,
    registers: Vec<Register>,
    first_argument: bool,
}

impl<'src> Encoder<'_, '_, 'src> {
    fn operand(&mut self, operand: &Operand) -> Parse {
        match *operand {
            Operand::Sf { bit } => {
                self.sf_bit = Some(bit);
                Parse::Match(())
            }
            Operand::Reg { shift } => self.register(shift, false),
            Operand::RegOrSp { shift } => self.register(shift, true),
            Operand::Extended {
                shift,
                option_shift,
                amount_shift,
            } => self.extended(shift, option_shift, amount_shift),
            Operand::Imm { width, shift } => self.immediate(width, shift),
            Operand::Shift {
                kind_shift,
                amount_shift,
                allow_ror,
            } => self.shift(kind_shift, amount_shift, allow_ror),
            Operand::Bitmask => self.bitmask(),
            Operand::Label => self.label(),
            Operand::SpRequired => self.sp_required(),
        }
    }

    /// Diagnostic info pointing at the byte before the cursor.
    fn previous_byte_info(&self) -> DiagnosticInfo<'src> {
        let position = self.reader.position();
        let offset = self.reader.offset();
        DiagnosticInfo {
            position: Position::new(position.line, position.column.saturating_sub(1)),
            line: self.reader.line(),
            hint: &self.reader.source()[offset.saturating_sub(1)..offset],
        }
    }

    /// Info covering everything from `start` to the cursor.
    fn span_info(&self, position: Position, start: usize) -> DiagnosticInfo<'src> {
        DiagnosticInfo {
            position,
            line: self.reader.line(),
            hint: self.reader.slice(start),
        }
    }

    fn at_line_end(&self) -> bool {
        self.reader.peek() == b'\n' || self.reader.is_at_end()
    }

    /// Enforces the separator before an operand: one space after the
    /// mnemonic, a comma between operands.
    fn separator(&mut self) -> Parse {
        if self.first_argument {
            if !self.reader.peek().is_ascii_whitespace() {
                let info = self.previous_byte_info();
                self.diagnostics.push(DiagnosticKind::MissingSpace, info);
                return Parse::Invalid;
            }
        } else {
            self.reader.skip_spaces_in_line();
            if self.reader.peek() != b',' {
                let info = self.previous_byte_info();
                self.diagnostics.push(DiagnosticKind::MissingComma, info);
                return Parse::Invalid;
            }
            self.reader.pop();
        }
        self.first_argument = false;
        self.reader.skip_spaces_in_line();
        Parse::Match(())
    }

    fn register(&mut self, shift: u8, allow_sp: bool) -> Parse {
        match self.separator() {
            Parse::Match(()) => {}
            outcome => return outcome,
        }

        if self.at_line_end() {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::ExpectedRegister, info);
            return Parse::Invalid;
        }

        let position = self.reader.position();
        let start = self.reader.offset();
        let register = match parse_register(self.reader, self.diagnostics) {
            Parse::Match(register) => register,
            _ => return Parse::Invalid,
        };
        let info = self.span_info(position, start);

        if !allow_sp && register.is_sp {
            self.diagnostics.push(DiagnosticKind::InvalidSp, info);
            return Parse::NoMatch;
        }
        if allow_sp && register.is_zr {
            self.diagnostics.push(DiagnosticKind::InvalidZr, info);
            return Parse::NoMatch;
        }

        if self.sf_bit.is_some() && self.registers.is_empty() {
            self.is_x = register.is_x;
        } else if register.is_x != self.is_x {
            self.diagnostics
                .push(DiagnosticKind::InvalidRegisterWidth, info);
            return Parse::Invalid;
        }

        self.code |= u32::from(register.number) << shift;
        self.registers.push(register);
        Parse::Match(())
    }

    fn extended(&mut self, shift: u8, option_shift: u8, amount_shift: u8) -> Parse {
        self.reader.skip_spaces_in_line();
        if self.reader.peek() != b',' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        if self.at_line_end() {
            return Parse::NoMatch;
        }

        let position = self.reader.position();
        let start = self.reader.offset();
        let register = match parse_register(self.reader, self.diagnostics) {
            Parse::Match(register) => register,
            _ => return Parse::NoMatch,
        };
        let info = self.span_info(position, start);

        if register.is_sp {
            self.diagnostics.push(DiagnosticKind::InvalidSp, info);
            return Parse::NoMatch;
        }
        if !self.is_x && register.is_x {
            self.diagnostics
                .push(DiagnosticKind::InvalidRegisterWidth, info);
            return Parse::Invalid;
        }

        self.code |= u32::from(register.number) << shift;

        self.reader.skip_spaces_in_line();
        if self.at_line_end() {
            // No extension: only the SP forms take a bare register here,
            // defaulting to LSL.
            if self.is_x && !register.is_x {
                self.diagnostics
                    .push(DiagnosticKind::InvalidRegisterWidth, info);
                return Parse::Invalid;
            }
            if !self.registers.iter().any(|register| register.is_sp) {
                return Parse::NoMatch;
            }
            let lsl = if self.is_x { 0b011 } else { 0b010 };
            self.code |= lsl << option_shift;
            self.registers.push(register);
            return Parse::Match(());
        }

        if self.reader.peek() != b',' {
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        let word = [
            self.reader.peek().to_ascii_uppercase(),
            self.reader.peek_at(1).to_ascii_uppercase(),
            self.reader.peek_at(2).to_ascii_uppercase(),
            self.reader.peek_at(3).to_ascii_uppercase(),
        ];

        let mut is_lsl = false;
        if word[0] == b'L'
            && word[1] == b'S'
            && word[2] == b'L'
            && !is_identifier_byte(self.reader.peek_at(3))
        {
            if self.is_x && !register.is_x {
                self.diagnostics
                    .push(DiagnosticKind::InvalidRegisterWidth, info);
                return Parse::Invalid;
            }
            is_lsl = true;
            self.code |= (0b010 + u32::from(self.is_x)) << option_shift;
            self.reader.skip(3);
        } else {
            if (word[0] != b'U' && word[0] != b'S')
                || word[1] != b'X'
                || word[2] != b'T'
                || !matches!(word[3], b'B' | b'H' | b'W' | b'X')
            {
                self.diagnostics.push(DiagnosticKind::InvalidExtension, info);
                return Parse::Invalid;
            }

            if word[0] == b'S' {
                self.code |= 0b100 << option_shift;
            }
            let extension: u32 = match word[3] {
                b'B' => 0b00,
                b'H' => 0b01,
                b'W' => 0b10,
                _ => 0b11,
            };
            self.code |= extension << option_shift;

            self.reader.skip(4);
            if is_identifier_byte(self.reader.peek()) {
                self.diagnostics.push(DiagnosticKind::InvalidExtension, info);
                return Parse::Invalid;
            }
        }

        self.reader.skip_spaces_in_line();
        if self.at_line_end() {
            if is_lsl {
                self.diagnostics.push(DiagnosticKind::ExpectedImmediate, info);
                return Parse::Invalid;
            }
            self.registers.push(register);
            return Parse::Match(());
        }

        let immediate = match parse_immediate(self.reader, self.diagnostics) {
            Parse::Match(immediate) => immediate,
            _ => return Parse::Invalid,
        };
        if immediate.is_negative || immediate.value > 4 {
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        }
        self.code |= (immediate.value as u32) << amount_shift;

        self.registers.push(register);
        Parse::Match(())
    }

    fn immediate(&mut self, width: u8, shift: u8) -> Parse {
        self.reader.skip_spaces_in_line();
        if self.reader.peek() != b',' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        if self.reader.peek() != b'#' {
            return Parse::NoMatch;
        }

        let position = self.reader.position();
        let start = self.reader.offset();
        let immediate = match parse_immediate(self.reader, self.diagnostics) {
            Parse::Match(immediate) => immediate,
            _ => return Parse::Invalid,
        };
        let info = self.span_info(position, start);

        if immediate.is_negative || immediate.value >= 1 << width {
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        }
        self.code |= (immediate.value as u32) << shift;

        // Optional `, LSL #0` or `, LSL #12`.
        self.reader.skip_spaces_in_line();
        if self.at_line_end() {
            return Parse::Match(());
        }
        if self.reader.peek() != b',' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        let word = [
            self.reader.peek().to_ascii_uppercase(),
            self.reader.peek_at(1).to_ascii_uppercase(),
            self.reader.peek_at(2).to_ascii_uppercase(),
        ];
        if word != [b'L', b'S', b'L'] || is_identifier_byte(self.reader.peek_at(3)) {
            self.diagnostics.push(DiagnosticKind::InvalidExtension, info);
            return Parse::Invalid;
        }
        self.reader.skip(3);
        self.reader.skip_spaces_in_line();

        let lsl = match parse_immediate(self.reader, self.diagnostics) {
            Parse::Match(immediate) => immediate,
            _ => return Parse::Invalid,
        };
        if lsl.is_negative || (lsl.value != 0 && lsl.value != 12) {
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        }
        self.code |= u32::from(lsl.value == 12) << (shift + width);
        Parse::Match(())
    }

    fn shift(&mut self, kind_shift: u8, amount_shift: u8, allow_ror: bool) -> Parse {
        self.reader.skip_spaces_in_line();
        if self.at_line_end() {
            return Parse::Match(());
        }
        if self.reader.peek() != b',' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        let position = self.reader.position();
        let start = self.reader.offset();
        let word = [
            self.reader.peek().to_ascii_uppercase(),
            self.reader.peek_at(1).to_ascii_uppercase(),
            self.reader.peek_at(2).to_ascii_uppercase(),
        ];
        let kind: u32 = match &word {
            b"LSL" => 0b00,
            b"LSR" => 0b01,
            b"ASR" => 0b10,
            b"ROR" if allow_ror => 0b11,
            _ => {
                let info = self.span_info(position, start);
                self.diagnostics.push(DiagnosticKind::InvalidExtension, info);
                return Parse::Invalid;
            }
        };
        self.code |= kind << kind_shift;

        self.reader.skip(3);
        self.reader.skip_spaces_in_line();

        let immediate = match parse_immediate(self.reader, self.diagnostics) {
            Parse::Match(immediate) => immediate,
            _ => return Parse::Invalid,
        };
        if immediate.is_negative
            || immediate.value >= 64
            || (!self.is_x && immediate.value >= 32)
        {
            let info = self.span_info(position, start);
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        }
        self.code |= (immediate.value as u32) << amount_shift;
        Parse::Match(())
    }

    fn bitmask(&mut self) -> Parse {
        self.reader.skip_spaces_in_line();
        if self.reader.peek() != b',' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        let position = self.reader.position();
        let start = self.reader.offset();
        let immediate = match parse_immediate(self.reader, self.diagnostics) {
            Parse::Match(immediate) => immediate,
            _ => return Parse::NoMatch,
        };
        let info = self.span_info(position, start);

        if immediate.is_negative
            || immediate.value == 0
            || (!self.is_x && immediate.value > u64::from(u32::MAX))
        {
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        }

        let mut value = immediate.value;
        if !self.is_x {
            value |= value << 32;
        }
        if value == u64::MAX {
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        }

        let Some((n, immr, imms)) = bitmask::encode(value) else {
            self.diagnostics.push(DiagnosticKind::InvalidImmediate, info);
            return Parse::Invalid;
        };
        self.code |= u32::from(imms) << 10;
        self.code |= u32::from(immr) << 16;
        self.code |= u32::from(n) << 22;
        Parse::Match(())
    }

    fn label(&mut self) -> Parse {
        self.reader.skip_spaces_in_line();
        if self.reader.peek() != b',' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::MissingComma, info);
            return Parse::Invalid;
        }
        self.reader.pop();
        self.reader.skip_spaces_in_line();

        // A dot refers to the current instruction: displacement zero.
        if self.reader.peek() == b'.' {
            self.reader.pop();
            return Parse::Match(());
        }

        let start = self.reader.offset();
        if !self.reader.peek().is_ascii_alphabetic() && self.reader.peek() != b'_' {
            let info = self.previous_byte_info();
            self.diagnostics.push(DiagnosticKind::InvalidLabel, info);
            return Parse::Invalid;
        }
        while is_identifier_byte(self.reader.peek()) {
            self.reader.pop();
        }
        let name = self.reader.slice(start);

        if let Some(label) = self.labels.get(name) {
            let displacement =
                i32::try_from(label.offset as i64 - self.offset as i64).unwrap_or(0) * 4;
            let low = (displacement as u32) & 0b11;
            self.code |= low << 29;
            let high = ((displacement >> 2) as u32) & 0x3_FFFF;
            self.code |= high << 5;
            self.code |= u32::from(displacement < 0) << 23;
        }
        Parse::Match(())
    }

    fn sp_required(&mut self) -> Parse {
        let has_sp = self
            .registers
            .iter()
            .take(2)
            .any(|register| register.is_sp);
        if !has_sp {
            self.diagnostics
                .push(DiagnosticKind::ExpectedSp, DiagnosticInfo::detached(""));
            return Parse::Invalid;
        }
        Parse::Match(())
    }

    /// Checks for trailing garbage, consumes the newline, and applies
    /// the sf flag.
    fn finish(mut self) -> Parse<u32> {
        self.reader.skip_spaces_in_line();
        if !self.at_line_end() {
            let info = DiagnosticInfo {
                position: self.reader.position(),
                line: self.reader.line(),
                hint: self.reader.line_rest(),
            };
            self.diagnostics
                .push(DiagnosticKind::UnexpectedCharactersAfterInstruction, info);
            return Parse::Invalid;
        }
        if !self.reader.is_at_end() {
            self.reader.pop();
        }

        if let Some(bit) = self.sf_bit {
            if self.is_x {
                self.code |= 1 << bit;
            }
        }
        Parse::Match(self.code)
    }
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Converts a failed parse to one with a different payload type.
fn failed<T, U>(parse: Parse<T>) -> Parse<U> {
    match parse {
        Parse::Match(_) => unreachable!("only failures are converted"),
        Parse::NoMatch => Parse::NoMatch,
        Parse::Invalid => Parse::Invalid,
    }
}
