//! Drives one source file through the front end and the interpreter.

use anyhow::{Context, Result};
use latch_common::diagnostics::Diagnostic;
use latch_runtime::{Program, RuntimeOptions};
use latch_scanner::{ScannerState, SyntaxKind};
use std::path::Path;
use tracing::{debug, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_DIAGNOSTICS: i32 = 1;
pub const EXIT_UNCAUGHT: i32 = 2;

pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

/// Front-end result for `check`.
#[derive(Debug)]
pub struct CheckOutput {
    pub file: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckOutput {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.diagnostics.is_empty() {
            EXIT_SUCCESS
        } else {
            EXIT_DIAGNOSTICS
        }
    }
}

pub fn check(path: &Path) -> Result<CheckOutput> {
    let source = read_source(path)?;
    let file = display_name(path);
    let program = Program::compile(file.clone(), source.clone());
    debug!(file = %file, diagnostics = program.diagnostics().len(), "checked");
    Ok(CheckOutput {
        file,
        source,
        diagnostics: program.diagnostics().to_vec(),
    })
}

/// An uncaught error, detached from runtime values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncaughtSummary {
    pub message: String,
    pub start: Option<u32>,
}

/// Everything `run` produced.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub file: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub output: Vec<String>,
    pub uncaught: Vec<UncaughtSummary>,
    pub jobs_run: usize,
}

impl RunOutput {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if !self.diagnostics.is_empty() {
            EXIT_DIAGNOSTICS
        } else if !self.uncaught.is_empty() {
            EXIT_UNCAUGHT
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Compile and run `path`. Programs with diagnostics are not executed.
pub fn run(path: &Path, options: RuntimeOptions) -> Result<RunOutput> {
    let source = read_source(path)?;
    let file = display_name(path);
    info!(file = %file, max_call_depth = options.max_call_depth, "running");
    Ok(run_source(file, source, options))
}

/// Compile and run already-loaded source.
#[must_use]
pub fn run_source(file: String, source: String, options: RuntimeOptions) -> RunOutput {
    let program = Program::compile(file.clone(), source.clone());
    let mut result = RunOutput {
        file,
        source,
        diagnostics: program.diagnostics().to_vec(),
        ..RunOutput::default()
    };
    let Ok(report) = program.run(options) else {
        return result;
    };
    result.output = report.output;
    result.jobs_run = report.jobs_run;
    result.uncaught = report
        .uncaught
        .iter()
        .map(|u| UncaughtSummary {
            message: u.message(),
            start: u.span.map(|s| s.start),
        })
        .collect();
    result
}

/// One token, for `latch tokens`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLine {
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
    pub value: String,
}

pub fn tokens(path: &Path) -> Result<(Vec<TokenLine>, Vec<Diagnostic>)> {
    let source = read_source(path)?;
    Ok(tokenize(display_name(path), source))
}

#[must_use]
pub fn tokenize(file: String, source: String) -> (Vec<TokenLine>, Vec<Diagnostic>) {
    let mut scanner = ScannerState::new(file, source);
    let mut lines = Vec::new();
    while scanner.scan() != SyntaxKind::EndOfFileToken {
        lines.push(TokenLine {
            kind: scanner.token(),
            start: scanner.token_pos(),
            end: scanner.token_end(),
            value: scanner.token_value().to_string(),
        });
    }
    (lines, scanner.take_diagnostics())
}

/// Scope table dump for `latch ast`: one header per scope, one line per
/// declaration.
#[must_use]
pub fn describe_scopes(program: &Program) -> String {
    let arena = program.arena();
    let mut out = String::new();
    for (id, scope) in program.binder().scopes.iter().enumerate() {
        let span = arena.span(scope.node);
        let parent = scope
            .parent
            .map_or_else(|| "-".to_string(), |p| p.0.to_string());
        out.push_str(&format!(
            "scope {id} {:?} [{}..{}] parent {parent}\n",
            scope.kind, span.start, span.end
        ));
        for decl in scope.iter() {
            let form = match (decl.kind.is_immutable(), decl.has_initializer) {
                (true, false) => " (write-once)",
                (true, true) => " (initialized)",
                _ => "",
            };
            out.push_str(&format!("  {:?} {}{form}\n", decl.kind, decl.name));
        }
    }
    out
}

pub fn scopes_json(program: &Program) -> Result<String> {
    serde_json::to_string_pretty(&program.binder().scopes).context("failed to serialize scopes")
}
