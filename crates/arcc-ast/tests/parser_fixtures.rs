//! Fixture tests for the parser: whole programs in, tree shapes out.

use arcc_ast::{
    BinaryOperator, NodeId, NodeKind, Tree, TypeKind, UnaryOperator, parse,
};
use arcc_diag::{DiagnosticKind, Diagnostics, Parse};
use arcc_lex::lex;

fn parse_program(source: &str) -> (Tree<'_>, Parse<NodeId>, Diagnostics<'_>) {
    let mut diagnostics = Diagnostics::new("fixture.c", 8);
    let (tokens, valid) = lex(source, &mut diagnostics);
    assert!(valid, "{source}: {:?}", diagnostics.entries());
    let (tree, result) = parse(&tokens, &mut diagnostics);
    (tree, result, diagnostics)
}

fn accept(source: &str) -> (Tree<'_>, NodeId) {
    let (tree, result, diagnostics) = parse_program(source);
    let Parse::Match(root) = result else {
        panic!("{source}: {result:?} {:?}", diagnostics.entries());
    };
    assert!(diagnostics.is_empty(), "{source}: {:?}", diagnostics.entries());
    (tree, root)
}

fn reject(source: &str, kind: DiagnosticKind) {
    let (_, result, diagnostics) = parse_program(source);
    assert_eq!(result, Parse::Invalid, "{source}");
    assert!(
        diagnostics.entries().iter().any(|d| d.kind == kind),
        "{source}: {:?}",
        diagnostics.entries()
    );
}

fn functions(tree: &Tree<'_>, root: NodeId) -> Vec<NodeId> {
    let NodeKind::Program { functions } = tree.kind(root) else {
        panic!("expected program");
    };
    functions.clone()
}

fn statements(tree: &Tree<'_>, function: NodeId) -> Vec<NodeId> {
    let NodeKind::Function { statements, .. } = tree.kind(function) else {
        panic!("expected function");
    };
    statements.clone()
}

#[test]
fn minimal_main() {
    let (tree, root) = accept("int main(void) { return 0; }");
    let functions = functions(&tree, root);
    assert_eq!(functions.len(), 1);
    let statements = statements(&tree, functions[0]);
    assert_eq!(statements.len(), 1);
    assert!(matches!(tree.kind(statements[0]), NodeKind::Return { .. }));
}

#[test]
fn returned_expression_shape() {
    // The classic precedence fixture: the root of the returned
    // expression is `+` with a `*` on the left and 37 on the right.
    let (tree, root) =
        accept("int f(void) { return ((5 * (26 + 27 * 28 + 29) + 37)); }");
    let function = functions(&tree, root)[0];
    let statement = statements(&tree, function)[0];
    let NodeKind::Return {
        expression: Some(expression),
    } = tree.kind(statement)
    else {
        panic!("expected return with a value");
    };
    let NodeKind::BinaryOperator {
        operator: BinaryOperator::Addition,
        left,
        right,
    } = tree.kind(*expression)
    else {
        panic!("expected + at the root");
    };
    assert!(matches!(
        tree.kind(*left),
        NodeKind::BinaryOperator {
            operator: BinaryOperator::Multiplication,
            ..
        }
    ));
    let NodeKind::Constant(constant) = tree.kind(*right) else {
        panic!("expected constant on the right");
    };
    assert_eq!(constant.value, 37);
}

#[test]
fn declarations_and_assignments() {
    let (tree, root) = accept(
        "int f(void) {\n\
         \x20   const unsigned long long big = 1;\n\
         \x20   int x;\n\
         \x20   x = 2;\n\
         \x20   x += big;\n\
         \x20   return x;\n\
         }",
    );
    let statements = statements(&tree, functions(&tree, root)[0]);
    assert_eq!(statements.len(), 5);

    let NodeKind::Declaration {
        declaration_type,
        initializer,
        ..
    } = tree.kind(statements[0])
    else {
        panic!("expected declaration");
    };
    assert_eq!(
        *tree.kind(*declaration_type),
        NodeKind::Type {
            kind: TypeKind::UnsignedLongLong,
            is_const: true,
            is_static: false
        }
    );
    assert!(initializer.is_some());

    let NodeKind::Declaration { initializer, .. } = tree.kind(statements[1]) else {
        panic!("expected declaration");
    };
    assert!(initializer.is_none());

    assert!(matches!(
        tree.kind(statements[2]),
        NodeKind::BinaryOperator {
            operator: BinaryOperator::Assignment,
            ..
        }
    ));
    assert!(matches!(
        tree.kind(statements[3]),
        NodeKind::BinaryOperator {
            operator: BinaryOperator::AdditionAssignment,
            ..
        }
    ));
}

#[test]
fn while_bodies() {
    let (tree, root) = accept(
        "int f(int n) { while (n > 0) n -= 1; while (n < 10) { n += 2; n += 3; } return n; }",
    );
    let statements = statements(&tree, functions(&tree, root)[0]);
    assert_eq!(statements.len(), 3);

    let NodeKind::While { condition, body } = tree.kind(statements[0]) else {
        panic!("expected while");
    };
    assert!(matches!(
        tree.kind(*condition),
        NodeKind::BinaryOperator {
            operator: BinaryOperator::Greater,
            ..
        }
    ));
    assert_eq!(body.len(), 1);

    let NodeKind::While { body, .. } = tree.kind(statements[1]) else {
        panic!("expected while");
    };
    assert_eq!(body.len(), 2);
}

#[test]
fn unary_operators_in_context() {
    let (tree, root) = accept("int f(int * p) { return -*p + !*p; }");
    let statement = statements(&tree, functions(&tree, root)[0])[0];
    let NodeKind::Return {
        expression: Some(expression),
    } = tree.kind(statement)
    else {
        panic!("expected return");
    };
    let NodeKind::BinaryOperator { left, right, .. } = tree.kind(*expression) else {
        panic!("expected +");
    };
    assert!(matches!(
        tree.kind(*left),
        NodeKind::UnaryOperator {
            operator: UnaryOperator::Negative,
            ..
        }
    ));
    assert!(matches!(
        tree.kind(*right),
        NodeKind::UnaryOperator {
            operator: UnaryOperator::LogicalNot,
            ..
        }
    ));
}

#[test]
fn parameter_lists() {
    let (tree, root) = accept(
        "void none(void) {} void one(int a) { a; } void three(int a, long b, char c) { c; }",
    );
    let functions = functions(&tree, root);
    assert_eq!(functions.len(), 3);

    let counts: Vec<usize> = functions
        .iter()
        .map(|&function| {
            let NodeKind::Function { parameters, .. } = tree.kind(function) else {
                panic!("expected function");
            };
            parameters.len()
        })
        .collect();
    assert_eq!(counts, [0, 1, 3]);

    let NodeKind::Function { parameters, .. } = tree.kind(functions[2]) else {
        panic!("expected function");
    };
    let names: Vec<&str> = parameters
        .iter()
        .map(|&(_, name)| tree.node(name).info.hint)
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
    let kinds: Vec<TypeKind> = parameters
        .iter()
        .map(|&(parameter_type, _)| {
            let NodeKind::Type { kind, .. } = *tree.kind(parameter_type) else {
                panic!("expected base type");
            };
            kind
        })
        .collect();
    assert_eq!(kinds, [TypeKind::Int, TypeKind::Long, TypeKind::Char]);
}

#[test]
fn pointer_types_in_signatures() {
    let (tree, root) =
        accept("char * const * dup(const char * restrict s) { return s; }");
    let NodeKind::Function { function_type, .. } = tree.kind(functions(&tree, root)[0])
    else {
        panic!("expected function");
    };
    let NodeKind::FunctionType {
        return_type,
        parameter_types,
    } = tree.kind(*function_type)
    else {
        panic!("expected function type");
    };

    // Return type: pointer to const-pointer to char.
    let NodeKind::Pointer { pointee, .. } = *tree.kind(*return_type) else {
        panic!("expected pointer return");
    };
    let NodeKind::Pointer { is_const, .. } = *tree.kind(pointee) else {
        panic!("expected inner pointer");
    };
    assert!(is_const);

    // Parameter: restrict pointer to const char.
    let NodeKind::Pointer {
        pointee,
        is_restrict,
        ..
    } = *tree.kind(parameter_types[0])
    else {
        panic!("expected pointer parameter");
    };
    assert!(is_restrict);
    let NodeKind::Type { kind, is_const, .. } = *tree.kind(pointee) else {
        panic!("expected base type");
    };
    assert_eq!(kind, TypeKind::Char);
    assert!(is_const);
}

#[test]
fn identifier_names_come_from_hints() {
    let (tree, root) = accept("int count(int seed) { return seed; }");
    let NodeKind::Function { name, .. } = tree.kind(functions(&tree, root)[0]) else {
        panic!("expected function");
    };
    assert_eq!(tree.node(*name).info.hint, "count");
    assert_eq!(tree.node(*name).info.position.column, 5);
}

#[test]
fn rejected_programs() {
    reject("int main(void) { return (1; }", DiagnosticKind::UnmatchedParenthesis);
    reject("int main(void) { int 5; }", DiagnosticKind::UnexpectedToken);
    reject("int main(void) { const const int x; }", DiagnosticKind::MultipleConst);
    reject(
        "int main(void) { static static int x; }",
        DiagnosticKind::MultipleStatic,
    );
    reject(
        "int main(void) { int * restrict restrict p; }",
        DiagnosticKind::MultipleRestrict,
    );
    reject("int main(void) { while () x; }", DiagnosticKind::UnexpectedToken);
    reject("5", DiagnosticKind::UnexpectedToken);
    reject("int main(void) { return 0; } extra", DiagnosticKind::UnexpectedToken);
}

#[test]
fn expression_statement_vs_declaration() {
    // `a * b;` is an expression statement because `a` is no keyword;
    // `int * b;` is a pointer declaration.
    let (tree, root) = accept("int f(int a, int b) { a * b; return 0; }");
    let statement = statements(&tree, functions(&tree, root)[0])[0];
    assert!(matches!(
        tree.kind(statement),
        NodeKind::BinaryOperator {
            operator: BinaryOperator::Multiplication,
            ..
        }
    ));

    let (tree, root) = accept("int f(void) { int * b; return 0; }");
    let statement = statements(&tree, functions(&tree, root)[0])[0];
    let NodeKind::Declaration {
        declaration_type, ..
    } = tree.kind(statement)
    else {
        panic!("expected declaration");
    };
    assert!(matches!(
        tree.kind(*declaration_type),
        NodeKind::Pointer { .. }
    ));
}

#[test]
fn diagnostics_point_into_the_source() {
    let source = "int main(void) { int 5; }";
    let (_, result, diagnostics) = parse_program(source);
    assert_eq!(result, Parse::Invalid);
    let diagnostic = diagnostics.entries()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::UnexpectedToken);
    assert_eq!(diagnostic.info.hint, "5");
    assert_eq!(diagnostic.info.line, source);
}

#[test]
fn child_order_is_source_order() {
    let (tree, root) = accept("int a(void) {} int b(void) {} int c(void) {}");
    let names: Vec<&str> = functions(&tree, root)
        .iter()
        .map(|&function| {
            let NodeKind::Function { name, .. } = tree.kind(function) else {
                panic!("expected function");
            };
            tree.node(*name).info.hint
        })
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}
