//! Instruction form descriptors.
//!
//! Each mnemonic maps to one or more encoding forms; forms with the same
//! mnemonic are contiguous so the assembler can try them in order. The
//! operand list is the structured equivalent of the encoding's operand
//! layout, carrying the bit positions each field is placed at.

/// One operand slot of an instruction form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Operand {
    /// Remember the sf (64-bit) flag position; the first register decides
    /// the width and later registers are cross-checked.
    Sf { bit: u8 },
    /// A general register, zero register allowed, stack pointer not.
    Reg { shift: u8 },
    /// A general register, stack pointer allowed, zero register not.
    RegOrSp { shift: u8 },
    /// An extended register with optional extension and shift amount.
    Extended {
        shift: u8,
        option_shift: u8,
        amount_shift: u8,
    },
    /// An unsigned immediate, optionally followed by `, LSL #0|#12`.
    Imm { width: u8, shift: u8 },
    /// An optional shifted-register suffix (`LSL`/`LSR`/`ASR`, plus
    /// `ROR` when allowed).
    Shift {
        kind_shift: u8,
        amount_shift: u8,
        allow_ror: bool,
    },
    /// A bitmask immediate encoded as `(N, immr, imms)`.
    Bitmask,
    /// A PC-relative label reference with the ADR immlo/immhi split.
    Label,
    /// Post-condition: one of the first two registers must be SP.
    SpRequired,
}

/// Condition under which a decoded instruction renders as its preferred
/// alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AliasCondition {
    /// At least one of the two low register fields is 31.
    LowRegisterSp,
    /// The destination register field is 31.
    DestinationZr,
}

/// Preferred disassembly of a form.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Alias {
    pub target: usize,
    pub condition: AliasCondition,
}

/// An instruction encoding form.
#[derive(Debug)]
pub(crate) struct Form {
    pub mnemonic: &'static str,
    pub operands: &'static [Operand],
    pub base: u32,
    pub mask: u32,
    pub alias: Option<Alias>,
}

const fn form(
    mnemonic: &'static str,
    operands: &'static [Operand],
    base: u32,
    mask: u32,
) -> Form {
    Form {
        mnemonic,
        operands,
        base,
        mask,
        alias: None,
    }
}

const fn aliased(
    mnemonic: &'static str,
    operands: &'static [Operand],
    base: u32,
    mask: u32,
    target: usize,
    condition: AliasCondition,
) -> Form {
    Form {
        mnemonic,
        operands,
        base,
        mask,
        alias: Some(Alias { target, condition }),
    }
}

const SF: Operand = Operand::Sf { bit: 31 };
const RD: Operand = Operand::Reg { shift: 0 };
const RN: Operand = Operand::Reg { shift: 5 };
const RM: Operand = Operand::Reg { shift: 16 };
const RD_SP: Operand = Operand::RegOrSp { shift: 0 };
const RN_SP: Operand = Operand::RegOrSp { shift: 5 };
const EXTENDED: Operand = Operand::Extended {
    shift: 16,
    option_shift: 13,
    amount_shift: 10,
};
const IMM12: Operand = Operand::Imm { width: 12, shift: 10 };
const SHIFT: Operand = Operand::Shift {
    kind_shift: 22,
    amount_shift: 10,
    allow_ror: false,
};
const SHIFT_ROR: Operand = Operand::Shift {
    kind_shift: 22,
    amount_shift: 10,
    allow_ror: true,
};

// Form indices, used by alias targets and tests.
pub(crate) const FORM_ADD_IMMEDIATE: usize = 4;
pub(crate) const FORM_CMN_EXTENDED: usize = 14;
pub(crate) const FORM_CMN_IMMEDIATE: usize = 15;
pub(crate) const FORM_CMN_SHIFTED: usize = 16;
pub(crate) const FORM_MOV: usize = 17;
pub(crate) const FORM_TST_BITMASK: usize = 18;
pub(crate) const FORM_TST_SHIFTED: usize = 19;

/// All instruction forms, sorted by mnemonic.
pub(crate) static FORMS: &[Form] = &[
    form("ABS", &[SF, RD, RN], 0x5AC0_2000, 0x7FFF_FC00),
    form("ADC", &[SF, RD, RN, RM], 0x1A00_0000, 0x7FE0_FC00),
    form("ADCS", &[SF, RD, RN, RM], 0x3A00_0000, 0x7FE0_FC00),
    form("ADD", &[SF, RD_SP, RN_SP, EXTENDED], 0x0B20_0000, 0x7FE0_0000),
    aliased(
        "ADD",
        &[SF, RD_SP, RN_SP, IMM12],
        0x1100_0000,
        0x7F80_0000,
        FORM_MOV,
        AliasCondition::LowRegisterSp,
    ),
    form("ADD", &[SF, RD, RN, RM, SHIFT], 0x0B00_0000, 0x7F20_0000),
    aliased(
        "ADDS",
        &[SF, RD, RN_SP, EXTENDED],
        0x2B20_0000,
        0x7FE0_0000,
        FORM_CMN_EXTENDED,
        AliasCondition::DestinationZr,
    ),
    aliased(
        "ADDS",
        &[SF, RD, RN_SP, IMM12],
        0x3100_0000,
        0x7F80_0000,
        FORM_CMN_IMMEDIATE,
        AliasCondition::DestinationZr,
    ),
    aliased(
        "ADDS",
        &[SF, RD, RN, RM, SHIFT],
        0x2B00_0000,
        0x7F20_0000,
        FORM_CMN_SHIFTED,
        AliasCondition::DestinationZr,
    ),
    form("ADR", &[RD, Operand::Label], 0x1000_0000, 0x9F00_0000),
    form("AND", &[SF, RD_SP, RN, Operand::Bitmask], 0x1200_0000, 0x7F80_0000),
    form("AND", &[SF, RD, RN, RM, SHIFT_ROR], 0x0A00_0000, 0x7F20_0000),
    aliased(
        "ANDS",
        &[SF, RD, RN, Operand::Bitmask],
        0x7200_0000,
        0x7F80_0000,
        FORM_TST_BITMASK,
        AliasCondition::DestinationZr,
    ),
    aliased(
        "ANDS",
        &[SF, RD, RN, RM, SHIFT_ROR],
        0x6A00_0000,
        0x7F20_0000,
        FORM_TST_SHIFTED,
        AliasCondition::DestinationZr,
    ),
    form("CMN", &[SF, RN_SP, EXTENDED], 0x2B20_001F, 0x7FE0_001F),
    form("CMN", &[SF, RN_SP, IMM12], 0x3100_001F, 0x7F80_001F),
    form("CMN", &[SF, RN, RM, SHIFT], 0x2B00_001F, 0x7F20_001F),
    form("MOV", &[SF, RD_SP, RN_SP, Operand::SpRequired], 0x1100_0000, 0x7FFF_FC00),
    form("TST", &[SF, RN, Operand::Bitmask], 0x7200_001F, 0x7F80_001F),
    form("TST", &[SF, RN, RM, SHIFT_ROR], 0x6A00_001F, 0x7F20_001F),
];

/// Finds the contiguous group of forms for a mnemonic.
pub(crate) fn mnemonic_group(mnemonic: &str) -> Option<(usize, usize)> {
    let found = FORMS
        .binary_search_by(|candidate| candidate.mnemonic.cmp(mnemonic))
        .ok()?;

    let mut first = found;
    while first > 0 && FORMS[first - 1].mnemonic == mnemonic {
        first -= 1;
    }
    let mut last = found;
    while last + 1 < FORMS.len() && FORMS[last + 1].mnemonic == mnemonic {
        last += 1;
    }
    Some((first, last))
}
