//! Token-cursor helpers.
//!
//! Sub-parsers share a cursor as `&mut &[Token]`; narrowing it keeps the
//! original slice lifetime by copying the reference out first.

use arcc_lex::Token;

/// Advances the cursor past `count` tokens.
pub(crate) fn advance<'t, 'src>(tokens: &mut &'t [Token<'src>], count: usize) {
    let current = *tokens;
    *tokens = &current[count..];
}

/// A sub-slice of the cursor with the cursor's full lifetime.
pub(crate) fn view<'t, 'src>(
    tokens: &mut &'t [Token<'src>],
    range: std::ops::Range<usize>,
) -> &'t [Token<'src>] {
    let current = *tokens;
    &current[range]
}
