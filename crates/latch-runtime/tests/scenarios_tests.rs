//! End-to-end scripts through the public `Program` API.

use latch_runtime::{ErrorFamily, Program, RunReport, RuntimeOptions};

fn run(source: &str) -> RunReport {
    let program = Program::compile("scenario.lt", source);
    assert!(
        program.diagnostics().is_empty(),
        "diagnostics: {:?}",
        program.diagnostics()
    );
    program
        .run(RuntimeOptions::default())
        .expect("no diagnostics")
}

const DEFERRED_RESULT: &str = r#"
// A result that is settled later by a job.
function fetchLater(value) {
  const settled;
  const probe = function () { return typeof settled; };
  queueMicrotask(function () { settled = value; });
  return [probe, function () { return settled; }];
}

const [probe, read] = fetchLater('ready');
print(probe());
try {
  read();
} catch (err) {
  print(err.name);
}
queueMicrotask(function () {
  print(probe(), read());
});
"#;

#[test]
fn deferred_result_is_settled_by_a_job() {
    let report = run(DEFERRED_RESULT);
    assert!(report.is_success());
    assert_eq!(
        report.output,
        vec!["undefined", "ReferenceError", "string ready"]
    );
    assert_eq!(report.jobs_run, 2);
}

const CONFIG_PICK: &str = r#"
const mode;
const inputs = ['fast', 'safe'];
for (const input of inputs) {
  if (input == 'safe') {
    mode = input;
  }
}
print(mode);
try {
  mode = 'fast';
} catch (e) {
  print(e.name + ': ' + e.message);
}
"#;

#[test]
fn write_once_from_inside_a_loop_body() {
    let report = run(CONFIG_PICK);
    assert!(report.is_success());
    assert_eq!(
        report.output,
        vec![
            "safe",
            "TypeError: Cannot assign to 'mode' because it is a constant."
        ]
    );
}

#[test]
fn second_write_from_a_second_job_fails_but_later_jobs_run() {
    let report = run(r#"
const answer;
queueMicrotask(function () { answer = 1; });
queueMicrotask(function () { answer = 2; });
queueMicrotask(function () { print(answer); });
"#);
    assert_eq!(report.output, vec!["1"]);
    assert_eq!(report.uncaught.len(), 1);
    assert_eq!(report.uncaught[0].family(), Some(ErrorFamily::TypeError));
    assert_eq!(report.jobs_run, 3);
}

#[test]
fn recursion_with_deferred_accumulator() {
    let report = run(r#"
function fib(n) {
  const result;
  if (n < 2) {
    result = n;
  } else {
    result = fib(n - 1) + fib(n - 2);
  }
  return result;
}
print(fib(15));
"#);
    assert!(report.is_success());
    assert_eq!(report.output, vec!["610"]);
}

#[test]
fn uncaught_script_error_stops_the_script_but_not_the_jobs() {
    let report = run(r#"
queueMicrotask(function () { print('job'); });
const v;
print(v);
print('unreachable');
"#);
    assert_eq!(report.output, vec!["job"]);
    assert_eq!(report.uncaught.len(), 1);
    assert_eq!(
        report.uncaught[0].family(),
        Some(ErrorFamily::ReferenceError)
    );
}

#[test]
fn parse_errors_are_reported_not_run() {
    let program = Program::compile("bad.lt", "const [a, b];\nlet = 1;");
    let codes: Vec<u32> = program.diagnostics().iter().map(|d| d.code).collect();
    assert!(codes.contains(&1182), "{codes:?}");
    assert!(program.run(RuntimeOptions::default()).is_err());
}
