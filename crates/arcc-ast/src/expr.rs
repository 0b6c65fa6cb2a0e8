//! Expression parsing by precedence climbing.

use arcc_diag::{DiagnosticKind, Diagnostics, Parse};
use arcc_lex::{Constant, ConstantKind, Token, TokenKind};

use crate::cursor::advance;
use crate::{BinaryOperator, Node, NodeId, NodeKind, Tree, UnaryOperator};

/// Operator associativity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Associativity {
    LeftToRight,
    RightToLeft,
}

struct BinaryMapping {
    token: TokenKind,
    operator: BinaryOperator,
    precedence: u8,
    associativity: Associativity,
}

const fn binary(
    token: TokenKind,
    operator: BinaryOperator,
    precedence: u8,
    associativity: Associativity,
) -> BinaryMapping {
    BinaryMapping {
        token,
        operator,
        precedence,
        associativity,
    }
}

/// Binary operators with their precedence (1 lowest) and associativity.
static BINARY_OPERATORS: &[BinaryMapping] = &[
    binary(TokenKind::Star, BinaryOperator::Multiplication, 11, Associativity::LeftToRight),
    binary(TokenKind::Slash, BinaryOperator::Division, 11, Associativity::LeftToRight),
    binary(TokenKind::Percent, BinaryOperator::Remainder, 11, Associativity::LeftToRight),
    binary(TokenKind::Plus, BinaryOperator::Addition, 10, Associativity::LeftToRight),
    binary(TokenKind::Minus, BinaryOperator::Subtraction, 10, Associativity::LeftToRight),
    binary(TokenKind::LeftShift, BinaryOperator::LeftShift, 9, Associativity::LeftToRight),
    binary(TokenKind::RightShift, BinaryOperator::RightShift, 9, Associativity::LeftToRight),
    binary(TokenKind::Less, BinaryOperator::Less, 8, Associativity::LeftToRight),
    binary(TokenKind::LessEqual, BinaryOperator::LessEqual, 8, Associativity::LeftToRight),
    binary(TokenKind::Greater, BinaryOperator::Greater, 8, Associativity::LeftToRight),
    binary(TokenKind::GreaterEqual, BinaryOperator::GreaterEqual, 8, Associativity::LeftToRight),
    binary(TokenKind::EqualEqual, BinaryOperator::Equal, 7, Associativity::LeftToRight),
    binary(TokenKind::NotEqual, BinaryOperator::NotEqual, 7, Associativity::LeftToRight),
    binary(TokenKind::Ampersand, BinaryOperator::BitwiseAnd, 6, Associativity::LeftToRight),
    binary(TokenKind::Caret, BinaryOperator::BitwiseExclusiveOr, 5, Associativity::LeftToRight),
    binary(TokenKind::Bar, BinaryOperator::BitwiseOr, 4, Associativity::LeftToRight),
    binary(TokenKind::AmpersandAmpersand, BinaryOperator::LogicalAnd, 3, Associativity::LeftToRight),
    binary(TokenKind::BarBar, BinaryOperator::LogicalOr, 2, Associativity::LeftToRight),
    binary(TokenKind::Equal, BinaryOperator::Assignment, 1, Associativity::RightToLeft),
    binary(TokenKind::PlusEqual, BinaryOperator::AdditionAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::MinusEqual, BinaryOperator::SubtractionAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::StarEqual, BinaryOperator::MultiplicationAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::SlashEqual, BinaryOperator::DivisionAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::PercentEqual, BinaryOperator::RemainderAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::LeftShiftEqual, BinaryOperator::LeftShiftAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::RightShiftEqual, BinaryOperator::RightShiftAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::AmpersandEqual, BinaryOperator::BitwiseAndAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::CaretEqual, BinaryOperator::BitwiseExclusiveOrAssignment, 1, Associativity::RightToLeft),
    binary(TokenKind::BarEqual, BinaryOperator::BitwiseOrAssignment, 1, Associativity::RightToLeft),
];

/// Prefix operators, binding tighter than any binary operator.
static UNARY_OPERATORS: &[(TokenKind, UnaryOperator)] = &[
    (TokenKind::Plus, UnaryOperator::Positive),
    (TokenKind::Minus, UnaryOperator::Negative),
    (TokenKind::PlusPlus, UnaryOperator::Increment),
    (TokenKind::MinusMinus, UnaryOperator::Decrement),
    (TokenKind::Tilde, UnaryOperator::BitwiseNot),
    (TokenKind::Exclamation, UnaryOperator::LogicalNot),
    (TokenKind::Ampersand, UnaryOperator::Address),
    (TokenKind::Star, UnaryOperator::Indirection),
];

/// Precedence just above every binary operator, used for unary operands.
const UNARY_PRECEDENCE: u8 = 12;

fn binary_operator(kind: TokenKind) -> Option<&'static BinaryMapping> {
    BINARY_OPERATORS.iter().find(|mapping| mapping.token == kind)
}

fn unary_operator(kind: TokenKind) -> Option<UnaryOperator> {
    UNARY_OPERATORS
        .iter()
        .find(|&&(token, _)| token == kind)
        .map(|&(_, operator)| operator)
}

/// Parses a full expression from the front of `tokens`.
///
/// The cursor is advanced past everything consumed; an unconsumed
/// closing parenthesis is left for the caller.
pub fn parse_expression<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    parse_subexpression(tree, tokens, diagnostics, 0)
}

fn parse_subexpression<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
    minimum_precedence: u8,
) -> Parse<NodeId> {
    let Some(first) = tokens.first().copied() else {
        return Parse::Invalid;
    };

    let mut left = if first.kind == TokenKind::OpenParenthesis {
        advance(tokens, 1);

        if tokens.is_empty() {
            diagnostics.push(DiagnosticKind::UnmatchedParenthesis, first.info);
            return Parse::Invalid;
        }

        let inner = match parse_subexpression(tree, tokens, diagnostics, 0) {
            Parse::Match(id) => id,
            other => return other,
        };

        if tokens.is_empty() {
            diagnostics.push(DiagnosticKind::UnmatchedParenthesis, first.info);
            return Parse::Invalid;
        }
        advance(tokens, 1);

        inner
    } else if let Some(operator) = unary_operator(first.kind) {
        advance(tokens, 1);

        if tokens.is_empty() {
            diagnostics.push(DiagnosticKind::UnexpectedToken, first.info);
            return Parse::Invalid;
        }

        let operand =
            match parse_subexpression(tree, tokens, diagnostics, UNARY_PRECEDENCE) {
                Parse::Match(id) => id,
                other => return other,
            };

        tree.push(Node::new(
            NodeKind::UnaryOperator { operator, operand },
            first.info,
        ))
    } else {
        match first.kind {
            TokenKind::Constant => {
                let constant = first
                    .constant
                    .unwrap_or(Constant::new(ConstantKind::Int, 0));
                let id = tree.push(Node::new(NodeKind::Constant(constant), first.info));
                advance(tokens, 1);
                id
            }
            TokenKind::Identifier => {
                let id = tree.push(Node::new(NodeKind::Identifier, first.info));
                advance(tokens, 1);
                id
            }
            _ => {
                diagnostics.push(DiagnosticKind::UnexpectedToken, first.info);
                return Parse::Invalid;
            }
        }
    };

    while let Some(next) = tokens.first().copied() {
        if next.kind == TokenKind::CloseParenthesis {
            return Parse::Match(left);
        }

        let Some(mapping) = binary_operator(next.kind) else {
            diagnostics.push(DiagnosticKind::UnexpectedToken, next.info);
            return Parse::Invalid;
        };

        if mapping.precedence < minimum_precedence
            || (mapping.associativity == Associativity::LeftToRight
                && mapping.precedence == minimum_precedence)
        {
            return Parse::Match(left);
        }

        advance(tokens, 1);

        if tokens.is_empty() {
            diagnostics.push(DiagnosticKind::UnexpectedToken, next.info);
            return Parse::Invalid;
        }

        let right =
            match parse_subexpression(tree, tokens, diagnostics, mapping.precedence) {
                Parse::Match(id) => id,
                other => return other,
            };

        left = tree.push(Node::new(
            NodeKind::BinaryOperator {
                operator: mapping.operator,
                left,
                right,
            },
            next.info,
        ));
    }

    Parse::Match(left)
}
