//! End-to-end grammar checks through the public parser API.

use latch_parser::{NodeData, NodeIndex, ParserState};

fn parse_clean(source: &str) -> (ParserState, NodeIndex) {
    let mut parser = ParserState::new("grammar.lt".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "unexpected diagnostics for {source:?}: {:?}",
        parser.get_diagnostics()
    );
    (parser, root)
}

#[test]
fn deferred_const_program() {
    let source = r#"
const v;
print(typeof v);
v = 1;
print(v);
try {
    v = 2;
} catch (e) {
    print(e.name, e.message);
}
"#;
    let (parser, root) = parse_clean(source);
    assert_eq!(parser.get_arena().statements(root).unwrap().len(), 5);
}

#[test]
fn deferred_write_from_a_job() {
    let source = r#"
const late;
function settle() {
    late = "ready";
}
queueMicrotask(settle);
queueMicrotask(function () { print(late); });
"#;
    let (parser, root) = parse_clean(source);
    let arena = parser.get_arena();
    let statements = arena.statements(root).unwrap();
    let func = arena.function(statements.nodes[1]).unwrap();
    assert_eq!(arena.identifier_text(func.name), Some("settle"));
    assert!(func.parameters.is_empty());
}

#[test]
fn closures_in_loops() {
    let source = r#"
let fns = [];
for (let i = 0; i < 3; i++) {
    fns[i] = function () { return i; };
}
for (const f of fns) {
    print(f());
}
"#;
    let (parser, root) = parse_clean(source);
    let arena = parser.get_arena();
    let statements = arena.statements(root).unwrap();
    assert!(matches!(
        arena.get(statements.nodes[1]).map(|n| &n.data),
        Some(NodeData::For { .. })
    ));
    assert!(matches!(
        arena.get(statements.nodes[2]).map(|n| &n.data),
        Some(NodeData::ForOf { .. })
    ));
}

#[test]
fn operators_and_literals() {
    parse_clean(
        "let a = null ?? (1 + 2) * 3 % 4 - -5;\n\
         let b = !true || false && a >= 1 ? 'yes' : \"no\";\n\
         let c = [1, 'two', [3]][2][0];\n\
         let d = void 0 === undefined;\n\
         a -= 1; a *= 2; a /= 3; a++; --a;\n",
    );
}

#[test]
fn keywords_as_property_names() {
    parse_clean("let e = f(); print(e.name, e.message, e.catch, e.typeof);");
}

#[test]
fn malformed_input_reports_location() {
    let mut parser = ParserState::new("bad.lt".to_string(), "let = 5;".to_string());
    parser.parse_source_file();
    let diag = &parser.get_diagnostics()[0];
    assert_eq!(diag.code, 1134);
    assert_eq!(diag.file, "bad.lt");
    assert_eq!(diag.start, 4);
}
