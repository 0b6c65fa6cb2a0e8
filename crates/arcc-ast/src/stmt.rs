//! Statement parsing: while loops, returns, declarations, and
//! expression statements.

use arcc_diag::{DiagnosticKind, Diagnostics, Parse};
use arcc_lex::{Token, TokenKind};

use crate::cursor::{advance, view};
use crate::parens::{Direction, skip_parentheses};
use crate::tree::Checkpoint;
use crate::{Node, NodeId, NodeKind, Tree, parse_expression, parse_type};

/// Parses one statement from the front of `tokens`.
///
/// No-match means no statement starts here (no terminating semicolon in
/// the remaining tokens); the cursor is untouched in that case.
pub fn parse_statement<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    let Some(first) = tokens.first().copied() else {
        return Parse::NoMatch;
    };

    if first.kind == TokenKind::While {
        return parse_while(tree, tokens, diagnostics);
    }

    // Everything else ends at a semicolon.
    let Some(semicolon) = tokens.iter().position(|token| token.kind == TokenKind::Semicolon)
    else {
        return Parse::NoMatch;
    };
    if tokens.len() <= 1 {
        return Parse::NoMatch;
    }

    let node = if first.kind == TokenKind::Return {
        let expression = if semicolon == 1 {
            None
        } else {
            let mut slice = view(tokens, 1..semicolon);
            match parse_expression(tree, &mut slice, diagnostics) {
                Parse::Match(id) => Some(id),
                other => return failed(other),
            }
        };
        tree.push(Node::new(NodeKind::Return { expression }, first.info))
    } else {
        // Try a declaration first; fall back to an expression statement.
        let checkpoint = Checkpoint::save(*tokens, tree, diagnostics);
        match parse_declaration(tree, view(tokens, 0..semicolon), diagnostics) {
            Parse::Match(id) => id,
            Parse::Invalid => return Parse::Invalid,
            Parse::NoMatch => {
                checkpoint.restore(tokens, tree, diagnostics);
                let mut slice = view(tokens, 0..semicolon);
                match parse_expression(tree, &mut slice, diagnostics) {
                    Parse::Match(id) => id,
                    other => return failed(other),
                }
            }
        }
    };

    advance(tokens, semicolon + 1);
    Parse::Match(node)
}

/// Parses `while ( expression ) body`.
fn parse_while<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    let while_token = tokens[0];
    advance(tokens, 1);

    if tokens.first().map(|token| token.kind) != Some(TokenKind::OpenParenthesis) {
        diagnostics.push(DiagnosticKind::UnexpectedToken, while_token.info);
        return Parse::Invalid;
    }

    let end = match skip_parentheses(tokens, Direction::Forward, 0, diagnostics) {
        Parse::Match(end) => end,
        _ => return Parse::Invalid,
    };
    if end == 1 {
        diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[1].info);
        return Parse::Invalid;
    }

    let mut condition_slice = view(tokens, 1..end);
    let condition = match parse_expression(tree, &mut condition_slice, diagnostics) {
        Parse::Match(id) => id,
        other => return failed(other),
    };

    advance(tokens, end + 1);
    if tokens.is_empty() {
        diagnostics.push(DiagnosticKind::UnexpectedToken, while_token.info);
        return Parse::Invalid;
    }

    let body = match parse_block(tree, tokens, diagnostics) {
        Parse::Match(body) => body,
        other => return failed(other),
    };

    Parse::Match(tree.push(Node::new(
        NodeKind::While { condition, body },
        while_token.info,
    )))
}

/// Parses a statement body: either a single statement or a
/// brace-delimited block.
pub(crate) fn parse_block<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<Vec<NodeId>> {
    let Some(first) = tokens.first().copied() else {
        return Parse::Invalid;
    };

    if first.kind != TokenKind::OpenBrace {
        return match parse_statement(tree, tokens, diagnostics) {
            Parse::Match(id) => Parse::Match(vec![id]),
            Parse::NoMatch => {
                diagnostics.push(DiagnosticKind::UnexpectedToken, first.info);
                Parse::Invalid
            }
            Parse::Invalid => Parse::Invalid,
        };
    }

    // Find the matching close brace.
    let mut depth = 1usize;
    let mut end = 1;
    while end < tokens.len() {
        match tokens[end].kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        end += 1;
    }
    if end == tokens.len() {
        diagnostics.push(DiagnosticKind::UnexpectedToken, first.info);
        return Parse::Invalid;
    }

    let mut block = view(tokens, 1..end);
    let mut statements = Vec::new();
    while !block.is_empty() {
        match parse_statement(tree, &mut block, diagnostics) {
            Parse::Match(id) => statements.push(id),
            Parse::NoMatch => {
                diagnostics.push(DiagnosticKind::UnexpectedToken, block[0].info);
                return Parse::Invalid;
            }
            Parse::Invalid => return Parse::Invalid,
        }
    }

    advance(tokens, end + 1);
    Parse::Match(statements)
}

/// Parses `<type-specifiers> <identifier> [= <expression>]` out of a
/// slice that excludes the terminating semicolon.
pub(crate) fn parse_declaration<'src>(
    tree: &mut Tree<'src>,
    tokens: &[Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    if !tokens[0].kind.is_keyword() {
        return Parse::NoMatch;
    }

    let equal = tokens
        .iter()
        .position(|token| token.kind == TokenKind::Equal)
        .unwrap_or(tokens.len());
    let has_initializer = equal < tokens.len();

    if has_initializer && equal == tokens.len() - 1 {
        diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[equal].info);
        return Parse::Invalid;
    }
    if equal < 2 {
        diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[0].info);
        return Parse::Invalid;
    }

    let identifier = &tokens[equal - 1];
    if identifier.kind != TokenKind::Identifier {
        diagnostics.push(DiagnosticKind::UnexpectedToken, identifier.info);
        return Parse::Invalid;
    }

    // The tokens before the identifier must look like a type.
    for token in &tokens[..equal - 1] {
        if token.kind != TokenKind::Identifier
            && !token.kind.is_keyword()
            && token.kind != TokenKind::Star
        {
            diagnostics.push(DiagnosticKind::UnexpectedToken, token.info);
            return Parse::Invalid;
        }
    }

    let declaration_type = match parse_type(tree, &tokens[..equal - 1], diagnostics) {
        Parse::Match(id) => id,
        other => return other,
    };

    let identifier_id = tree.push(Node::new(NodeKind::Identifier, identifier.info));

    let initializer = if has_initializer {
        let mut slice = &tokens[equal + 1..];
        match parse_expression(tree, &mut slice, diagnostics) {
            Parse::Match(id) => Some(id),
            other => return other,
        }
    } else {
        None
    };

    Parse::Match(tree.push(Node::new(
        NodeKind::Declaration {
            identifier: identifier_id,
            declaration_type,
            initializer,
        },
        identifier.info,
    )))
}

/// Converts a failed parse to one with a different payload type.
pub(crate) fn failed<T, U>(parse: Parse<T>) -> Parse<U> {
    match parse {
        Parse::Match(_) => unreachable!("only failures are converted"),
        Parse::NoMatch => Parse::NoMatch,
        Parse::Invalid => Parse::Invalid,
    }
}
