//! Disassembler: 32-bit code words back to canonical text.

use std::fmt::Write;

use arcc_diag::{DiagnosticInfo, DiagnosticKind, Diagnostics, Parse};

use crate::bitmask;
use crate::table::{AliasCondition, FORMS, Form, Operand};

/// Disassembles code words, one instruction per line.
///
/// Each word is matched against the form table; when a form declares a
/// preferred alias and its condition holds, the alias's mnemonic and
/// operand layout are rendered instead.
pub fn disassemble(codes: &[u32], diagnostics: &mut Diagnostics<'_>) -> Parse<String> {
    let mut text = String::new();

    for (index, &code) in codes.iter().enumerate() {
        let Some(form) = decode_form(code) else {
            diagnostics.push(
                DiagnosticKind::UnknownInstruction,
                DiagnosticInfo::detached(""),
            );
            return Parse::Invalid;
        };

        if render_instruction(&mut text, form, code, index).is_none() {
            diagnostics.push(
                DiagnosticKind::UnknownInstruction,
                DiagnosticInfo::detached(""),
            );
            return Parse::Invalid;
        }
        text.push('\n');
    }

    Parse::Match(text)
}

/// Finds the form a word decodes as, applying the preferred alias.
fn decode_form(code: u32) -> Option<&'static Form> {
    let form = FORMS.iter().find(|form| code & form.mask == form.base)?;

    if let Some(alias) = form.alias {
        let holds = match alias.condition {
            AliasCondition::LowRegisterSp => {
                let first = code & 0b1_1111;
                let second = (code >> 5) & 0b1_1111;
                first == 31 || second == 31
            }
            AliasCondition::DestinationZr => code & 0b1_1111 == 31,
        };
        if holds {
            return Some(&FORMS[alias.target]);
        }
    }

    Some(form)
}

/// Renders one instruction; `None` marks an undecodable field.
fn render_instruction(out: &mut String, form: &Form, code: u32, index: usize) -> Option<()> {
    out.push_str(form.mnemonic);

    let mut first_parameter = true;
    let mut is_x = true;
    let mut has_sp = false;

    for operand in form.operands {
        match *operand {
            Operand::Sf { bit } => {
                is_x = (code >> bit) & 1 != 0;
            }
            Operand::Reg { shift } | Operand::RegOrSp { shift } => {
                if first_parameter {
                    out.push(' ');
                } else {
                    out.push_str(", ");
                }
                first_parameter = false;

                let number = (code >> shift) & 0b1_1111;
                let allow_sp = matches!(operand, Operand::RegOrSp { .. });
                if number == 31 {
                    if allow_sp {
                        has_sp = true;
                        out.push_str(if is_x { "SP" } else { "WSP" });
                    } else {
                        out.push_str(if is_x { "XZR" } else { "WZR" });
                    }
                } else {
                    let _ = write!(out, "{}{number}", if is_x { 'X' } else { 'W' });
                }
            }
            Operand::Extended {
                shift,
                option_shift,
                amount_shift,
            } => {
                let number = (code >> shift) & 0b1_1111;
                let option = (code >> option_shift) & 0b111;
                let amount = (code >> amount_shift) & 0b111;

                let wide = is_x && option & 0b11 == 0b11;
                let _ = write!(out, ", {}{number}", if wide { 'X' } else { 'W' });

                // With SP in play, the UXTW/UXTX option renders as LSL.
                if has_sp && ((is_x && option == 0b011) || (!is_x && option == 0b010)) {
                    if amount != 0 {
                        let _ = write!(out, ", LSL #{amount}");
                    }
                    continue;
                }

                let extensions = [b'B', b'H', b'W', b'X'];
                let _ = write!(
                    out,
                    ", {}XT{}",
                    if option & 0b100 != 0 { 'S' } else { 'U' },
                    char::from(extensions[(option & 0b11) as usize]),
                );
                if amount != 0 {
                    let _ = write!(out, " #{amount}");
                }
            }
            Operand::Imm { width, shift } => {
                let immediate = (code >> shift) & ((1 << width) - 1);
                let _ = write!(out, ", #0x{immediate:X}");
                if (code >> (shift + width)) & 1 != 0 {
                    out.push_str(", LSL #12");
                }
            }
            Operand::Shift {
                kind_shift,
                amount_shift,
                allow_ror,
            } => {
                let kind = (code >> kind_shift) & 0b11;
                let amount = (code >> amount_shift) & 0b11_1111;

                if kind == 0 && amount == 0 {
                    continue;
                }
                if !is_x && amount >= 32 {
                    return None;
                }

                let name = match kind {
                    0b00 => "LSL",
                    0b01 => "LSR",
                    0b10 => "ASR",
                    _ => {
                        if !allow_ror {
                            return None;
                        }
                        "ROR"
                    }
                };
                let _ = write!(out, ", {name} #{amount}");
            }
            Operand::Bitmask => {
                let imms = ((code >> 10) & 0b11_1111) as u8;
                let immr = ((code >> 16) & 0b11_1111) as u8;
                let n = (code >> 22) & 1 != 0;

                if !is_x && n {
                    return None;
                }
                let value = bitmask::decode(n, immr, imms)?;
                let _ = write!(out, ", #0x{value:X}");
            }
            Operand::Label => {
                let low = (code >> 29) & 0b11;
                let high = (code >> 5) & 0x3_FFFF;
                let sign = (code >> 23) & 1;

                let mut displacement = (high << 2 | low) as i32;
                if sign != 0 {
                    displacement -= 1 << 20;
                }

                let address = (index as u32 * 4).wrapping_add(displacement as u32);
                let _ = write!(out, ", 0x{address:X}");
            }
            Operand::SpRequired => {}
        }
    }

    Some(())
}
