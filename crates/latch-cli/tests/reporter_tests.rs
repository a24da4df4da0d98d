use latch_common::diagnostics::{Diagnostic, diagnostic_codes};

use super::reporter::Reporter;

fn reporter_with(file: &str, source: &str) -> Reporter {
    let mut reporter = Reporter::new(false);
    reporter.add_source(file, source);
    reporter
}

#[test]
fn formats_location_code_and_snippet() {
    let source = "const v;\nv = 1;\nv = 2;\n";
    let mut reporter = reporter_with("main.lt", source);
    let diagnostic = Diagnostic::from_code(
        "main.lt",
        16,
        6,
        diagnostic_codes::CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_CONSTANT,
        &["v"],
    );

    let rendered = reporter.format_diagnostic(&diagnostic);
    assert_eq!(
        rendered,
        "main.lt(3,1) - error LT2588: Cannot assign to 'v' because it is a constant.\n    3   v = 2;\n        ~~~~~~"
    );
}

#[test]
fn includes_related_information() {
    let source = "let a;\nlet a;\n";
    let mut reporter = reporter_with("dup.lt", source);
    let diagnostic = Diagnostic::from_code(
        "dup.lt",
        11,
        1,
        diagnostic_codes::CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE,
        &["a"],
    )
    .with_related(
        "dup.lt".to_string(),
        4,
        1,
        "'a' was also declared here.".to_string(),
    );

    let rendered = reporter.format_diagnostic(&diagnostic);
    assert!(rendered.starts_with("dup.lt(2,5) - error LT2451:"), "{rendered}");
    assert!(
        rendered.contains("  Related: dup.lt(1,5) - 'a' was also declared here."),
        "{rendered}"
    );
}

#[test]
fn unknown_files_fall_back_to_the_name() {
    let mut reporter = Reporter::new(false);
    let diagnostic = Diagnostic::from_code(
        "/definitely/not/here.lt",
        0,
        1,
        diagnostic_codes::CANNOT_FIND_NAME,
        &["x"],
    );
    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "/definitely/not/here.lt - error LT2304: Cannot find name 'x'."
    );
}

#[test]
fn uncaught_errors_carry_their_location() {
    let mut reporter = reporter_with("job.lt", "print(1);\nmissing;\n");
    let rendered = reporter.format_uncaught(
        "job.lt",
        "Uncaught ReferenceError: Cannot find name 'missing'.",
        Some(10),
    );
    assert_eq!(
        rendered,
        "Uncaught ReferenceError: Cannot find name 'missing'.\n    at job.lt(2,1)"
    );
}

#[test]
fn render_separates_diagnostics_with_newlines() {
    let mut reporter = reporter_with("a.lt", "x\n");
    let d = Diagnostic::from_code("a.lt", 0, 0, diagnostic_codes::CANNOT_FIND_NAME, &["x"]);
    let rendered = reporter.render(&[d.clone(), d]);
    assert_eq!(rendered.lines().count(), 2);
}
