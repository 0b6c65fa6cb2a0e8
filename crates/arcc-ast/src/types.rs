//! Type-specifier parsing.

use arcc_diag::{DiagnosticKind, Diagnostics, Parse};
use arcc_lex::{Token, TokenKind};

use crate::{Node, NodeId, NodeKind, Tree, TypeKind};

/// Parses a complete type specifier out of `tokens`.
///
/// The whole slice must form one type. A trailing `*` (with up to two
/// `const`/`restrict` qualifiers after it) wraps the rest as a pointer,
/// recursively; leading `const`/`static` and trailing `const` fold into
/// the base type's flags. Never reports no-match: a type specifier is
/// only tried where the grammar requires one.
pub fn parse_type<'src>(
    tree: &mut Tree<'src>,
    tokens: &[Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    let Some(last) = tokens.last() else {
        return Parse::Invalid;
    };

    // Pointer: a star among the last three tokens, qualifiers after it.
    for pointer_index in (1..tokens.len()).rev().take(3) {
        if tokens[pointer_index].kind != TokenKind::Star {
            continue;
        }

        let mut is_const = false;
        let mut is_restrict = false;
        for qualifier in &tokens[pointer_index + 1..] {
            match qualifier.kind {
                TokenKind::Const => {
                    if is_const {
                        diagnostics.push(DiagnosticKind::MultipleConst, qualifier.info);
                        return Parse::Invalid;
                    }
                    is_const = true;
                }
                TokenKind::Restrict => {
                    if is_restrict {
                        diagnostics.push(DiagnosticKind::MultipleRestrict, qualifier.info);
                        return Parse::Invalid;
                    }
                    is_restrict = true;
                }
                _ => {
                    diagnostics.push(DiagnosticKind::UnexpectedToken, qualifier.info);
                    return Parse::Invalid;
                }
            }
        }

        let pointee = match parse_type(tree, &tokens[..pointer_index], diagnostics) {
            Parse::Match(id) => id,
            other => return other,
        };

        return Parse::Match(tree.push(Node::new(
            NodeKind::Pointer {
                pointee,
                is_const,
                is_restrict,
            },
            tokens[pointer_index].info,
        )));
    }

    let mut invalid = false;
    let mut is_const = false;
    let mut is_static = false;
    let mut tokens = tokens;

    // Leading qualifiers.
    while let Some(first) = tokens.first() {
        match first.kind {
            TokenKind::Static => {
                if is_static {
                    invalid = true;
                    diagnostics.push(DiagnosticKind::MultipleStatic, first.info);
                }
                is_static = true;
            }
            TokenKind::Const => {
                if is_const {
                    invalid = true;
                    diagnostics.push(DiagnosticKind::MultipleConst, first.info);
                }
                is_const = true;
            }
            _ => break,
        }
        tokens = &tokens[1..];
    }
    if tokens.is_empty() {
        diagnostics.push(DiagnosticKind::UnexpectedToken, last.info);
        return Parse::Invalid;
    }

    // Trailing `const` qualifiers.
    while let Some(trailing) = tokens.last() {
        if trailing.kind != TokenKind::Const {
            break;
        }
        if is_const {
            invalid = true;
            diagnostics.push(DiagnosticKind::MultipleConst, trailing.info);
        }
        is_const = true;
        tokens = &tokens[..tokens.len() - 1];
    }
    if tokens.is_empty() {
        diagnostics.push(DiagnosticKind::UnexpectedToken, last.info);
        return Parse::Invalid;
    }

    let Some((kind, info_token)) = base_type(tokens) else {
        diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[0].info);
        return Parse::Invalid;
    };

    let id = tree.push(Node::new(
        NodeKind::Type {
            kind,
            is_const,
            is_static,
        },
        tokens[info_token].info,
    ));
    if invalid { Parse::Invalid } else { Parse::Match(id) }
}

/// Resolves a 1-, 2-, or 3-token base-type combination. Returns the type
/// kind and the index of the token whose info names the type.
fn base_type(tokens: &[Token<'_>]) -> Option<(TypeKind, usize)> {
    let kind = |index: usize| tokens[index].kind;

    match tokens.len() {
        3 => {
            if kind(1) != TokenKind::Long {
                return None;
            }
            let (first, third) = (kind(0), kind(2));
            let info = if third == TokenKind::Long { 2 } else { 1 };
            if (first == TokenKind::Long && third == TokenKind::Unsigned)
                || (third == TokenKind::Long && first == TokenKind::Unsigned)
            {
                return Some((TypeKind::UnsignedLongLong, info));
            }
            if (first == TokenKind::Long && third == TokenKind::Signed)
                || (third == TokenKind::Long && first == TokenKind::Signed)
            {
                return Some((TypeKind::LongLong, info));
            }
            None
        }
        2 => {
            if kind(0) == TokenKind::Long && kind(1) == TokenKind::Long {
                return Some((TypeKind::LongLong, 1));
            }
            if kind(0) == TokenKind::Unsigned || kind(1) == TokenKind::Unsigned {
                let index = usize::from(kind(0) == TokenKind::Unsigned);
                let kind = match kind(index) {
                    TokenKind::Char => TypeKind::UnsignedChar,
                    TokenKind::Short => TypeKind::UnsignedShort,
                    TokenKind::Int => TypeKind::UnsignedInt,
                    TokenKind::Long => TypeKind::UnsignedLong,
                    _ => return None,
                };
                return Some((kind, index));
            }
            if kind(0) == TokenKind::Signed || kind(1) == TokenKind::Signed {
                let index = usize::from(kind(0) == TokenKind::Signed);
                let kind = match kind(index) {
                    TokenKind::Char => TypeKind::SignedChar,
                    TokenKind::Short => TypeKind::Short,
                    TokenKind::Int => TypeKind::Int,
                    TokenKind::Long => TypeKind::Long,
                    _ => return None,
                };
                return Some((kind, index));
            }
            None
        }
        1 => {
            let kind = match kind(0) {
                TokenKind::Char => TypeKind::Char,
                TokenKind::Void => TypeKind::Void,
                TokenKind::Short => TypeKind::Short,
                TokenKind::Int => TypeKind::Int,
                TokenKind::Long => TypeKind::Long,
                TokenKind::Float => TypeKind::Float,
                TokenKind::Double => TypeKind::Double,
                TokenKind::UnderscoreBool | TokenKind::Bool => TypeKind::Bool,
                _ => return None,
            };
            Some((kind, 0))
        }
        _ => None,
    }
}
