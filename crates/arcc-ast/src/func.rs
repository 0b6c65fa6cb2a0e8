//! Function and program parsing.

use arcc_diag::{DiagnosticKind, Diagnostics, Parse};
use arcc_lex::{Token, TokenKind};

use crate::cursor::advance;
use crate::stmt::{failed, parse_block};
use crate::{Node, NodeId, NodeKind, Tree, parse_type};

/// True for tokens that can appear in a type specifier before a name.
fn is_specifier(kind: TokenKind) -> bool {
    kind.is_keyword() || kind == TokenKind::Star || kind == TokenKind::Identifier
}

/// Parses `<return-type> <identifier> ( <parameters> ) { <statements> }`.
pub fn parse_function<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    // The name is the identifier right before the opening parenthesis.
    let mut index = 0;
    while index < tokens.len() && is_specifier(tokens[index].kind) {
        index += 1;
    }
    if index == 0
        || index == tokens.len()
        || tokens[index].kind != TokenKind::OpenParenthesis
    {
        return Parse::NoMatch;
    }

    let name = tokens[index - 1];
    if name.kind != TokenKind::Identifier {
        diagnostics.push(DiagnosticKind::UnexpectedToken, name.info);
        return Parse::Invalid;
    }

    let type_count = index - 1;
    if type_count == 0 {
        diagnostics.push(DiagnosticKind::UnexpectedToken, name.info);
        return Parse::Invalid;
    }
    let return_type = match parse_type(tree, &tokens[..type_count], diagnostics) {
        Parse::Match(id) => id,
        _ => return Parse::Invalid,
    };

    // Step past the type, the name, and the opening parenthesis.
    advance(tokens, type_count + 2);
    if tokens.is_empty() {
        diagnostics.push(DiagnosticKind::UnexpectedToken, name.info);
        return Parse::Invalid;
    }

    // Parameters: empty, exactly `void`, or `<type> <identifier>` pairs.
    if tokens.len() >= 2
        && tokens[0].kind == TokenKind::Void
        && tokens[1].kind == TokenKind::CloseParenthesis
    {
        advance(tokens, 1);
    }

    let mut parameters = Vec::new();
    while !tokens.is_empty() && tokens[0].kind != TokenKind::CloseParenthesis {
        let mut index = 0;
        while index < tokens.len() && is_specifier(tokens[index].kind) {
            index += 1;
        }
        if index == 0 || index == tokens.len() {
            diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[0].info);
            return Parse::Invalid;
        }
        if tokens[index].kind != TokenKind::Comma
            && tokens[index].kind != TokenKind::CloseParenthesis
        {
            diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[index].info);
            return Parse::Invalid;
        }

        let parameter_name = tokens[index - 1];
        if parameter_name.kind != TokenKind::Identifier {
            diagnostics.push(DiagnosticKind::UnexpectedToken, parameter_name.info);
            return Parse::Invalid;
        }

        let type_count = index - 1;
        if type_count == 0 {
            diagnostics.push(DiagnosticKind::UnexpectedToken, parameter_name.info);
            return Parse::Invalid;
        }
        let parameter_type = match parse_type(tree, &tokens[..type_count], diagnostics) {
            Parse::Match(id) => id,
            _ => return Parse::Invalid,
        };
        let parameter_name_id = tree.push(Node::new(NodeKind::Identifier, parameter_name.info));
        parameters.push((parameter_type, parameter_name_id));

        let has_comma = tokens[index].kind == TokenKind::Comma;
        advance(tokens, type_count + 1 + usize::from(has_comma));
    }

    if tokens.is_empty() {
        diagnostics.push(DiagnosticKind::UnexpectedToken, name.info);
        return Parse::Invalid;
    }

    // The function type collects the parameter types in order.
    let return_info = tree.node(return_type).info;
    let function_type = tree.push(Node::new(
        NodeKind::FunctionType {
            return_type,
            parameter_types: parameters.iter().map(|&(ty, _)| ty).collect(),
        },
        return_info,
    ));
    let name_id = tree.push(Node::new(NodeKind::Identifier, name.info));

    // Past the closing parenthesis, the body must be a braced block.
    advance(tokens, 1);
    if tokens.first().map(|token| token.kind) != Some(TokenKind::OpenBrace) {
        diagnostics.push(DiagnosticKind::UnexpectedToken, name.info);
        return Parse::Invalid;
    }

    let statements = match parse_block(tree, tokens, diagnostics) {
        Parse::Match(statements) => statements,
        other => return failed(other),
    };

    Parse::Match(tree.push(Node::new(
        NodeKind::Function {
            name: name_id,
            function_type,
            parameters,
            statements,
        },
        name.info,
    )))
}

/// Parses a whole program: functions until the end of input.
pub fn parse_program<'t, 'src>(
    tree: &mut Tree<'src>,
    tokens: &mut &'t [Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> Parse<NodeId> {
    let mut functions = Vec::new();

    while !tokens.is_empty() {
        match parse_function(tree, tokens, diagnostics) {
            Parse::Match(id) => functions.push(id),
            Parse::NoMatch => {
                diagnostics.push(DiagnosticKind::UnexpectedToken, tokens[0].info);
                return Parse::Invalid;
            }
            Parse::Invalid => return Parse::Invalid,
        }
    }

    Parse::Match(tree.push(Node::new(
        NodeKind::Program { functions },
        arcc_diag::DiagnosticInfo::default(),
    )))
}

/// Parses a token list into a tree.
///
/// On a match the whole input has been consumed and the returned id is
/// the program root (also recorded in the tree).
pub fn parse<'src>(
    tokens: &[Token<'src>],
    diagnostics: &mut Diagnostics<'src>,
) -> (Tree<'src>, Parse<NodeId>) {
    let mut tree = Tree::new();
    let mut cursor = tokens;
    let result = parse_program(&mut tree, &mut cursor, diagnostics);
    if let Parse::Match(root) = result {
        tree.set_root(root);
    }
    (tree, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcc_lex::lex;

    fn parse_source(source: &str) -> (Tree<'_>, Parse<NodeId>, Diagnostics<'_>) {
        let mut diagnostics = Diagnostics::new("test.c", 8);
        let (tokens, valid) = lex(source, &mut diagnostics);
        assert!(valid, "{source}");
        let (tree, result) = parse(&tokens, &mut diagnostics);
        (tree, result, diagnostics)
    }

    fn program_functions(source: &str) -> (Tree<'_>, Vec<NodeId>) {
        let (tree, result, diagnostics) = parse_source(source);
        let Parse::Match(root) = result else {
            panic!("{source}: {result:?} {:?}", diagnostics.entries());
        };
        let NodeKind::Program { functions } = tree.kind(root) else {
            panic!("expected program root");
        };
        let functions = functions.clone();
        (tree, functions)
    }

    #[test]
    fn test_empty_program() {
        let (tree, functions) = program_functions("");
        assert!(functions.is_empty());
        assert!(tree.root().is_some());
    }

    #[test]
    fn test_minimal_function() {
        let (tree, functions) = program_functions("int main(void) { return 0; }");
        assert_eq!(functions.len(), 1);
        let NodeKind::Function {
            name,
            function_type,
            parameters,
            statements,
        } = tree.kind(functions[0])
        else {
            panic!("expected function");
        };
        assert_eq!(tree.node(*name).info.hint, "main");
        assert!(parameters.is_empty());
        assert_eq!(statements.len(), 1);
        let NodeKind::FunctionType {
            return_type,
            parameter_types,
        } = tree.kind(*function_type)
        else {
            panic!("expected function type");
        };
        assert!(parameter_types.is_empty());
        assert!(matches!(
            tree.kind(*return_type),
            NodeKind::Type {
                kind: crate::TypeKind::Int,
                ..
            }
        ));
    }

    #[test]
    fn test_function_with_parameters() {
        let (tree, functions) =
            program_functions("long add(int a, unsigned long b) { return a + b; }");
        let NodeKind::Function {
            parameters,
            function_type,
            ..
        } = tree.kind(functions[0])
        else {
            panic!("expected function");
        };
        assert_eq!(parameters.len(), 2);
        let (first_type, first_name) = parameters[0];
        assert!(matches!(
            tree.kind(first_type),
            NodeKind::Type {
                kind: crate::TypeKind::Int,
                ..
            }
        ));
        assert_eq!(tree.node(first_name).info.hint, "a");
        let NodeKind::FunctionType {
            parameter_types, ..
        } = tree.kind(*function_type)
        else {
            panic!("expected function type");
        };
        assert_eq!(parameter_types.len(), 2);
        assert_eq!(parameter_types[0], first_type);
    }

    #[test]
    fn test_pointer_parameters_and_return() {
        let (tree, functions) =
            program_functions("char * copy(const char * restrict source) { return source; }");
        let NodeKind::Function {
            parameters,
            function_type,
            ..
        } = tree.kind(functions[0])
        else {
            panic!("expected function");
        };
        assert_eq!(parameters.len(), 1);
        let NodeKind::FunctionType { return_type, .. } = tree.kind(*function_type) else {
            panic!("expected function type");
        };
        assert!(matches!(tree.kind(*return_type), NodeKind::Pointer { .. }));
    }

    #[test]
    fn test_multiple_functions_in_order() {
        let (tree, functions) = program_functions("void a(void) {} int b(void) { return 1; }");
        assert_eq!(functions.len(), 2);
        let names: Vec<_> = functions
            .iter()
            .map(|&id| {
                let NodeKind::Function { name, .. } = tree.kind(id) else {
                    panic!("expected function");
                };
                tree.node(*name).info.hint
            })
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_function_with_body_statements() {
        let (tree, functions) = program_functions(
            "int count(int limit) { int total = 0; while (total < limit) total += 1; return total; }",
        );
        let NodeKind::Function { statements, .. } = tree.kind(functions[0]) else {
            panic!("expected function");
        };
        assert_eq!(statements.len(), 3);
        assert!(matches!(tree.kind(statements[1]), NodeKind::While { .. }));
    }

    #[test]
    fn test_trailing_tokens_are_invalid() {
        let (_, result, diagnostics) = parse_source("int main(void) { return 0; } 5");
        assert_eq!(result, Parse::Invalid);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_missing_body_is_invalid() {
        let (_, result, _) = parse_source("int main(void);");
        assert_eq!(result, Parse::Invalid);
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let (_, result, _) = parse_source("int (void) { return 0; }");
        assert_eq!(result, Parse::Invalid);
    }

    #[test]
    fn test_invalid_always_diagnoses() {
        for source in [
            "int main(void);",
            "int (void) {}",
            "int main(int) {}",
            "int main(void) { return 0; } 5",
            "5",
        ] {
            let (_, result, diagnostics) = parse_source(source);
            assert_eq!(result, Parse::Invalid, "{source}");
            assert!(!diagnostics.is_empty(), "{source}");
        }
    }
}
