use latch_common::limits::{DEFAULT_MAX_CALL_DEPTH, MAX_CALL_DEPTH_CEILING};

use crate::error::ErrorFamily;
use crate::interpreter::{RunReport, RuntimeOptions};
use crate::program::{Program, ProgramError};

fn compile(source: &str) -> Program {
    let program = Program::compile("test.lt", source);
    assert!(
        program.diagnostics().is_empty(),
        "unexpected diagnostics: {:?}",
        program.diagnostics()
    );
    program
}

fn run_with(source: &str, options: RuntimeOptions) -> RunReport {
    compile(source).run(options).expect("program has no diagnostics")
}

fn run(source: &str) -> RunReport {
    run_with(source, RuntimeOptions::default())
}

fn output(source: &str) -> Vec<String> {
    let report = run(source);
    assert!(
        report.is_success(),
        "uncaught: {:?}",
        report
            .uncaught
            .iter()
            .map(|u| u.message())
            .collect::<Vec<_>>()
    );
    report.output
}

fn uncaught(source: &str) -> (Option<ErrorFamily>, String) {
    let report = run(source);
    let first = report.uncaught.first().expect("expected an uncaught error");
    (first.family(), first.message())
}

// =============================================================================
// Write-once bindings
// =============================================================================

#[test]
fn test_scenario_a_typeof_then_read() {
    let report = run("const v;\nprint(typeof v);\nv;\n");
    assert_eq!(report.output, vec!["undefined"]);
    assert_eq!(report.uncaught.len(), 1);
    assert_eq!(report.uncaught[0].family(), Some(ErrorFamily::ReferenceError));
    assert_eq!(
        report.uncaught[0].message(),
        "Uncaught ReferenceError: Constant 'v' is used before being assigned."
    );
}

#[test]
fn test_scenario_b_second_write_is_reassignment() {
    let out = output(
        "const v;
         v = 1;
         print(v);
         try { v = 2; } catch (e) { print(e.name, e.message); }
         print(v);",
    );
    assert_eq!(
        out,
        vec![
            "1",
            "TypeError Cannot assign to 'v' because it is a constant.",
            "1"
        ]
    );
}

#[test]
fn test_scenario_c_independent_siblings() {
    let out = output(
        "const a, b;
         a = 1;
         print(a);
         try { print(b); } catch (e) { print(e.name); }
         b = 2;
         print(a, b);",
    );
    assert_eq!(out, vec!["1", "ReferenceError", "1 2"]);
}

#[test]
fn test_scenario_d_write_from_job_after_activation_returns() {
    let report = run("let read;
         function start() {
           const result;
           read = function () { return result; };
           queueMicrotask(function () { result = 42; });
         }
         start();
         try { read(); } catch (e) { print(e.name); }
         queueMicrotask(function () { print(read()); });");
    assert!(report.is_success());
    assert_eq!(report.output, vec!["ReferenceError", "42"]);
    assert_eq!(report.jobs_run, 2);
}

#[test]
fn test_typeof_after_write_sees_value() {
    let out = output("const v; print(typeof v); v = 'x'; print(typeof v, v);");
    assert_eq!(out, vec!["undefined", "string x"]);
}

#[test]
fn test_compound_assignment_to_unwritten_const_is_unbound_access() {
    let (family, message) = uncaught("const v; v += 1;");
    assert_eq!(family, Some(ErrorFamily::ReferenceError));
    assert!(message.contains("'v'"), "{message}");
}

#[test]
fn test_update_of_unwritten_const_is_unbound_access() {
    let (family, _) = uncaught("const n; n++;");
    assert_eq!(family, Some(ErrorFamily::ReferenceError));
}

#[test]
fn test_write_once_inside_loop_iterations_is_independent() {
    let out = output(
        "const getters = [];
         for (let i = 0; i < 3; i++) {
           const slot;
           if (i != 1) { slot = i * 10; }
           getters[i] = function () { return slot; };
         }
         print(getters[0](), getters[2]());
         try { getters[1](); } catch (e) { print(e.name); }",
    );
    assert_eq!(out, vec!["0 20", "ReferenceError"]);
}

#[test]
fn test_write_once_in_while_body_block_is_fresh_each_entry() {
    let out = output(
        "let n = 0;
         while (n < 3) {
           const once;
           once = n;
           print(once);
           n++;
         }",
    );
    assert_eq!(out, vec!["0", "1", "2"]);
}

#[test]
fn test_unwritten_loop_entries_do_not_fail_at_loop_exit() {
    let out = output(
        "for (const x of [1, 2, 3]) { const never; }
         print('done');",
    );
    assert_eq!(out, vec!["done"]);
}

// =============================================================================
// Initialized declarations
// =============================================================================

#[test]
fn test_const_with_initializer_is_a_dead_zone_until_initialized() {
    let report = run("print(typeof c);\nconst c = 1;");
    assert!(report.output.is_empty());
    assert_eq!(report.uncaught[0].family(), Some(ErrorFamily::ReferenceError));
    assert_eq!(
        report.uncaught[0].message(),
        "Uncaught ReferenceError: Block-scoped variable 'c' used before its declaration."
    );
}

#[test]
fn test_const_with_initializer_rejects_assignment() {
    let (family, message) = uncaught("const c = 1; c = 2;");
    assert_eq!(family, Some(ErrorFamily::TypeError));
    assert_eq!(
        message,
        "Uncaught TypeError: Cannot assign to 'c' because it is a constant."
    );
}

#[test]
fn test_let_without_initializer_reads_undefined() {
    let out = output("let x; print(x, typeof x); x = 3; x = 4; print(x);");
    assert_eq!(out, vec!["undefined undefined", "4"]);
}

#[test]
fn test_typeof_unresolvable_name_is_undefined() {
    let out = output("print(typeof nothingHere, typeof (nothingHere));");
    assert_eq!(out, vec!["undefined undefined"]);
}

#[test]
fn test_reading_unresolvable_name_is_reference_error() {
    let (family, message) = uncaught("print(ghost);");
    assert_eq!(family, Some(ErrorFamily::ReferenceError));
    assert_eq!(message, "Uncaught ReferenceError: Cannot find name 'ghost'.");
}

#[test]
fn test_assigning_unresolvable_name_is_reference_error() {
    let (family, _) = uncaught("ghost = 1;");
    assert_eq!(family, Some(ErrorFamily::ReferenceError));
}

#[test]
fn test_destructuring_fills_missing_elements_with_undefined() {
    let out = output("const [a, b, c] = [1, 2]; print(a, b, c);");
    assert_eq!(out, vec!["1 2 undefined"]);
}

#[test]
fn test_destructuring_a_string() {
    let out = output("let [first, second] = 'hi'; print(second + first);");
    assert_eq!(out, vec!["ih"]);
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn test_functions_are_hoisted() {
    let out = output("print(twice(4)); function twice(n) { return n * 2; }");
    assert_eq!(out, vec!["8"]);
}

#[test]
fn test_block_shadowing_leaves_outer_binding_alone() {
    let out = output(
        "const x = 'outer';
         { const x; x = 'inner'; print(x); }
         print(x);",
    );
    assert_eq!(out, vec!["inner", "outer"]);
}

#[test]
fn test_script_declarations_shadow_globals() {
    let out = output("const undefined; undefined = 3; print(undefined);");
    assert_eq!(out, vec!["3"]);
}

#[test]
fn test_for_loop_closures_capture_each_iteration() {
    let out = output(
        "const fs = [];
         for (let i = 0; i < 3; i++) { fs[i] = function () { return i; }; }
         print(fs[0](), fs[1](), fs[2]());",
    );
    assert_eq!(out, vec!["0 1 2"]);
}

#[test]
fn test_for_of_const_gets_a_fresh_binding_per_element() {
    let out = output(
        "const fs = [];
         for (const x of ['a', 'b']) { fs[fs.length] = function () { return x; }; }
         print(fs[0]() + fs[1]());",
    );
    assert_eq!(out, vec!["ab"]);
}

#[test]
fn test_for_of_visits_elements_appended_during_iteration() {
    let out = output(
        "const xs = [1];
         for (const x of xs) { if (x < 3) { xs[xs.length] = x + 1; } print(x); }",
    );
    assert_eq!(out, vec!["1", "2", "3"]);
}

#[test]
fn test_catch_parameter_is_scoped_to_the_clause() {
    let out = output(
        "let e = 'outer';
         try { throw 'inner'; } catch (e) { print(e); }
         print(e);",
    );
    assert_eq!(out, vec!["inner", "outer"]);
}

#[test]
fn test_closures_share_their_record() {
    let out = output(
        "function counter() {
           let n = 0;
           return function () { n += 1; return n; };
         }
         const next = counter();
         next(); next();
         print(next());",
    );
    assert_eq!(out, vec!["3"]);
}

#[test]
fn test_nested_declaration_outlives_its_activation() {
    let out = output(
        "function make() {
           let n = 41;
           function inner() { return n + 1; }
           return inner;
         }
         const f = make();
         print(f(), f === f, f.name);",
    );
    assert_eq!(out, vec!["42 true inner"]);
}

#[test]
fn test_recursive_declaration_called_after_its_scope_exits() {
    let out = output(
        "let fact;
         { function go(k) { return k <= 1 ? 1 : k * go(k - 1); } fact = go; }
         print(fact(5));",
    );
    assert_eq!(out, vec!["120"]);
}

// =============================================================================
// Control flow and operators
// =============================================================================

#[test]
fn test_break_and_continue() {
    let out = output(
        "let total = 0;
         for (let i = 0; i < 10; i++) {
           if (i % 2 == 0) continue;
           if (i > 7) break;
           total += i;
         }
         print(total);",
    );
    assert_eq!(out, vec!["16"]);
}

#[test]
fn test_finally_runs_on_return() {
    let out = output(
        "function f() { try { return 1; } finally { print('cleanup'); } }
         print(f());",
    );
    assert_eq!(out, vec!["cleanup", "1"]);
}

#[test]
fn test_operators() {
    let out = output(
        "print(1 + 2 * 3, 7 % 4, 10 / 4);
         print('a' + 1, 1 + true, null ?? 'd', 0 || 'x', 1 && 2);
         print(1 == '1', 1 === '1', null == undefined, 'b' > 'a');
         print(-'3', !0, typeof null, typeof print, void 1);",
    );
    assert_eq!(
        out,
        vec![
            "7 3 2.5",
            "a1 2 d x 2",
            "true false true true",
            "-3 true object function undefined"
        ]
    );
}

#[test]
fn test_string_and_array_properties() {
    let out = output("const xs = [1, 2, 3]; print(xs.length, 'four'.length, xs[1], 'abc'[2]);");
    assert_eq!(out, vec!["3 4 2 c"]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_calling_a_non_function_is_type_error() {
    let (family, message) = uncaught("let x = 1; x();");
    assert_eq!(family, Some(ErrorFamily::TypeError));
    assert_eq!(message, "Uncaught TypeError: x is not a function");
}

#[test]
fn test_reading_property_of_undefined_is_type_error() {
    let (family, _) = uncaught("let x; x.length;");
    assert_eq!(family, Some(ErrorFamily::TypeError));
}

#[test]
fn test_call_depth_limit_is_range_error() {
    let options = RuntimeOptions {
        max_call_depth: 16,
        ..RuntimeOptions::default()
    };
    let report = run_with("function f() { return f(); } f();", options);
    assert_eq!(report.uncaught[0].family(), Some(ErrorFamily::RangeError));
    assert_eq!(
        report.uncaught[0].message(),
        "Uncaught RangeError: Maximum call stack size exceeded"
    );
}

#[test]
fn test_recursion_to_the_default_depth_runs_on_the_calling_thread() {
    let source = format!(
        "let n = 0;
         function f(d) {{ n = d; if (d < {last}) {{ return f(d + 1); }} return d; }}
         print(f(0), n);",
        last = DEFAULT_MAX_CALL_DEPTH - 1
    );
    let expected = format!("{0} {0}", DEFAULT_MAX_CALL_DEPTH - 1);
    assert_eq!(output(&source), vec![expected]);
}

#[test]
fn test_call_depth_ceiling_is_range_error_not_a_crash() {
    let options = RuntimeOptions {
        max_call_depth: MAX_CALL_DEPTH_CEILING,
        ..RuntimeOptions::default()
    };
    let report = run_with(
        "function down(n) { const m = (((n + 1))); return down(m); } down(0);",
        options,
    );
    assert_eq!(report.uncaught[0].family(), Some(ErrorFamily::RangeError));
}

#[test]
fn test_thrown_error_values_keep_their_family() {
    let (family, message) = uncaught("throw Error('boom');");
    assert_eq!(family, Some(ErrorFamily::Error));
    assert_eq!(message, "Uncaught Error: boom");
}

#[test]
fn test_thrown_plain_values_have_no_family() {
    let (family, message) = uncaught("throw 'plain';");
    assert_eq!(family, None);
    assert_eq!(message, "Uncaught plain");
}

#[test]
fn test_uncaught_error_span_points_at_the_faulting_statement() {
    let program = compile("const v;\nprint(1);\nlet w = v;\n");
    let report = program.run(RuntimeOptions::default()).unwrap();
    let span = report.uncaught[0].span.expect("span recorded");
    assert_eq!(span.text(program.source()), "let w = v;");
    let diagnostic = report.uncaught[0].to_diagnostic(program.file_name());
    assert_eq!(diagnostic.code, 9001);
}

#[test]
fn test_caught_error_does_not_leave_a_span_behind() {
    let report = run("try { missing; } catch (e) {}\nthrow 'late';");
    let span = report.uncaught[0].span.unwrap();
    assert_eq!(span.start, 30);
}

#[test]
fn test_programs_with_diagnostics_do_not_run() {
    let program = Program::compile("dup.lt", "let a; let a;");
    assert!(matches!(
        program.run(RuntimeOptions::default()),
        Err(ProgramError::HasDiagnostics { count: 1, .. })
    ));
}

// =============================================================================
// Jobs
// =============================================================================

#[test]
fn test_jobs_run_in_fifo_order_after_the_script() {
    let out = output(
        "queueMicrotask(function () { print('first'); });
         queueMicrotask(function () { print('second'); });
         print('script');",
    );
    assert_eq!(out, vec!["script", "first", "second"]);
}

#[test]
fn test_job_errors_are_reported_and_the_queue_continues() {
    let report = run("queueMicrotask(function () { throw Error('boom'); });
         queueMicrotask(function () { print('after'); });");
    assert_eq!(report.output, vec!["after"]);
    assert_eq!(report.jobs_run, 2);
    assert_eq!(report.uncaught.len(), 1);
    assert_eq!(report.uncaught[0].message(), "Uncaught Error: boom");
}

#[test]
fn test_queue_microtask_requires_a_function() {
    let (family, _) = uncaught("queueMicrotask(3);");
    assert_eq!(family, Some(ErrorFamily::TypeError));
}

#[test]
fn test_jobs_can_be_left_pending() {
    let program = compile("const late; queueMicrotask(function () { late = 1; });");
    let mut interpreter = program.interpreter(RuntimeOptions {
        drain_jobs: false,
        ..RuntimeOptions::default()
    });
    let report = interpreter.run(program.root());
    assert!(report.is_success());
    assert_eq!(report.jobs_run, 0);
    assert_eq!(interpreter.pending_jobs(), 1);
}

#[test]
fn test_self_enqueueing_jobs_run_in_turn() {
    let out = output(
        "let n = 0;
         function tick() { n++; if (n < 3) queueMicrotask(tick); print(n); }
         queueMicrotask(tick);",
    );
    assert_eq!(out, vec!["1", "2", "3"]);
}
