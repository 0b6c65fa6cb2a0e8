//! Abstract syntax tree and recursive-descent parser.
//!
//! The parser consumes a read-only token slice and builds nodes in an
//! index-addressed [`Tree`]. Sub-parsers report match, no-match, or
//! invalid; speculative alternatives snapshot the token cursor, the
//! diagnostic count, and the tree high-water mark, and restore all three
//! on no-match.

mod ast;
mod cursor;
mod expr;
mod func;
mod parens;
mod stmt;
mod tree;
mod types;

pub use ast::{
    BinaryOperator, MemberAccessKind, Node, NodeKind, PostfixOperator, TypeKind, UnaryOperator,
};
pub use expr::parse_expression;
pub use func::{parse, parse_function, parse_program};
pub use parens::{Direction, skip_parentheses};
pub use stmt::parse_statement;
pub use tree::{NodeId, Tree};
pub use types::parse_type;
