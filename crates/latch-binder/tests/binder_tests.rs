use crate::{BinderState, DeclarationKind, ScopeKind};
use latch_parser::{NodeArena, NodeData, NodeIndex, ParserState};

fn bind(source: &str) -> (NodeArena, NodeIndex, BinderState) {
    let mut parser = ParserState::new("test.lt".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "parse errors: {:?}",
        parser.get_diagnostics()
    );
    let arena = parser.into_arena();
    let mut binder = BinderState::new("test.lt".to_string());
    binder.bind_source_file(&arena, root);
    (arena, root, binder)
}

fn codes(binder: &BinderState) -> Vec<u32> {
    binder.diagnostics().iter().map(|d| d.code).collect()
}

fn first_statement(arena: &NodeArena, root: NodeIndex) -> NodeIndex {
    arena.statements(root).unwrap().nodes[0]
}

#[test]
fn test_deferred_consts_are_declared_in_textual_order() {
    let (_arena, root, binder) = bind("const a, b;");
    let scope = binder.scope_for_node(root).unwrap();
    assert_eq!(scope.kind, ScopeKind::Script);
    let names: Vec<_> = scope.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    for decl in scope.iter() {
        assert_eq!(decl.kind, DeclarationKind::Const);
        assert!(!decl.has_initializer);
    }
}

#[test]
fn test_initializer_presence_is_recorded_per_declarator() {
    let (_arena, root, binder) = bind("const a = 1, b, [c, d] = [3, 4];");
    let scope = binder.scope_for_node(root).unwrap();
    assert!(scope.get("a").unwrap().has_initializer);
    assert!(!scope.get("b").unwrap().has_initializer);
    assert!(scope.get("c").unwrap().has_initializer);
    assert!(scope.get("d").unwrap().has_initializer);
    assert_eq!(
        scope.get("c").unwrap().declaration,
        scope.get("d").unwrap().declaration
    );
}

#[test]
fn test_redeclared_lexical_binding_reports_2451() {
    let (_arena, root, binder) = bind("let x;\nconst x = 1;");
    assert_eq!(codes(&binder), vec![2451]);
    let diag = &binder.diagnostics()[0];
    assert_eq!(diag.message_text, "Cannot redeclare block-scoped variable 'x'.");
    assert_eq!(diag.related_information.len(), 1);
    assert_eq!(diag.related_information[0].start, 4);
    // The first declaration wins.
    let scope = binder.scope_for_node(root).unwrap();
    assert_eq!(scope.get("x").unwrap().kind, DeclarationKind::Let);
}

#[test]
fn test_function_and_parameter_collisions_report_2300() {
    let (_arena, _root, binder) = bind("function f() {}\nfunction f() {}");
    assert_eq!(codes(&binder), vec![2300]);

    let (_arena, _root, binder) = bind("function g(x) { let x; }");
    assert_eq!(codes(&binder), vec![2300]);

    let (_arena, _root, binder) = bind("function h(a, a) {}");
    assert_eq!(codes(&binder), vec![2300]);
}

#[test]
fn test_catch_binding_conflicts_with_block_declaration() {
    let (_arena, _root, binder) = bind("try { f(); } catch (e) { let e = 1; }");
    assert_eq!(codes(&binder), vec![2451]);
}

#[test]
fn test_shadowing_in_nested_block_is_allowed() {
    let (arena, root, binder) = bind("let x = 1;\n{ const x; x = 2; }");
    assert!(codes(&binder).is_empty());
    let block = arena.statements(root).unwrap().nodes[1];
    let scope = binder.scope_for_node(block).unwrap();
    assert_eq!(scope.kind, ScopeKind::Block);
    assert_eq!(scope.parent, binder.node_scope_ids.get(&root.0).copied());
    assert_eq!(scope.get("x").unwrap().kind, DeclarationKind::Const);
}

#[test]
fn test_blocks_without_declarations_create_no_scope() {
    let (arena, root, binder) = bind("{ print(1); }\nwhile (false) { print(2); }");
    assert_eq!(binder.scopes.len(), 1);
    assert!(binder.scope_for_node(first_statement(&arena, root)).is_none());
}

#[test]
fn test_for_head_and_body_get_separate_scopes() {
    let (arena, root, binder) = bind("for (let i = 0; i < 3; i++) { const v; }");
    let for_node = first_statement(&arena, root);
    let head = binder.scope_for_node(for_node).unwrap();
    assert_eq!(head.kind, ScopeKind::For);
    assert!(head.get("i").is_some());
    assert!(head.get("v").is_none());

    let Some(NodeData::For { body, .. }) = arena.get(for_node).map(|n| n.data.clone()) else {
        panic!("expected for");
    };
    let body_scope = binder.scope_for_node(body).unwrap();
    assert!(body_scope.get("v").is_some());
}

#[test]
fn test_for_of_binding_is_declared_in_head_scope() {
    let (arena, root, binder) = bind("for (const [k, v] of pairs) { print(k, v); }");
    let head = binder.scope_for_node(first_statement(&arena, root)).unwrap();
    let names: Vec<_> = head.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["k", "v"]);
}

#[test]
fn test_function_scope_holds_parameters_then_body_declarations() {
    let (arena, root, binder) = bind("function f(a, b) { const c; function inner() {} }");
    let func = first_statement(&arena, root);
    let scope = binder.scope_for_node(func).unwrap();
    assert_eq!(scope.kind, ScopeKind::Function);
    let kinds: Vec<_> = scope.iter().map(|d| (d.name.as_str(), d.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("a", DeclarationKind::Parameter),
            ("b", DeclarationKind::Parameter),
            ("c", DeclarationKind::Const),
            ("inner", DeclarationKind::Function),
        ]
    );
    // The function's own name lives in the enclosing scope.
    let script = binder.scope_for_node(root).unwrap();
    assert_eq!(script.get("f").unwrap().kind, DeclarationKind::Function);
}

#[test]
fn test_function_expressions_inside_initializers_get_scopes() {
    let (_arena, _root, binder) = bind("const g = function (n) { let m = n; return m; };");
    assert_eq!(binder.scopes.len(), 2);
    assert_eq!(binder.scopes[1].kind, ScopeKind::Function);
    assert!(binder.scopes[1].get("n").is_some());
    assert!(binder.scopes[1].get("m").is_some());
}
