//! Matching-parenthesis search over a token slice.

use arcc_diag::{DiagnosticKind, Diagnostics, Parse};
use arcc_lex::{Token, TokenKind};

/// Scan direction for [`skip_parentheses`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Finds the parenthesis matching the one at `start`.
///
/// Returns the index of the matching parenthesis. No-match if `start` is
/// not an opening parenthesis for the direction; invalid (with an
/// `unmatched-parenthesis` diagnostic) if the slice ends first or the
/// starting token closes instead of opening.
pub fn skip_parentheses<'src>(
    tokens: &[Token<'src>],
    direction: Direction,
    start: usize,
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<usize> {
    let (open, close) = match direction {
        Direction::Forward => (TokenKind::OpenParenthesis, TokenKind::CloseParenthesis),
        Direction::Backward => (TokenKind::CloseParenthesis, TokenKind::OpenParenthesis),
    };

    let kind = tokens[start].kind;
    if kind != open {
        if kind == close {
            diagnostics.push(DiagnosticKind::UnmatchedParenthesis, tokens[start].info);
            return Parse::Invalid;
        }
        return Parse::NoMatch;
    }

    let mut depth = 1usize;
    let mut index = start;
    loop {
        let in_bounds = match direction {
            Direction::Forward => index + 1 < tokens.len(),
            Direction::Backward => index > 0,
        };
        if !in_bounds {
            diagnostics.push(DiagnosticKind::UnmatchedParenthesis, tokens[start].info);
            return Parse::Invalid;
        }

        index = match direction {
            Direction::Forward => index + 1,
            Direction::Backward => index - 1,
        };

        let kind = tokens[index].kind;
        if kind == open {
            depth += 1;
        } else if kind == close {
            depth -= 1;
            if depth == 0 {
                return Parse::Match(index);
            }
        }
    }
}
