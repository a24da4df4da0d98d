//! A parsed and bound source file, ready to run.

use latch_binder::BinderState;
use latch_common::diagnostics::{Diagnostic, DiagnosticCategory};
use latch_parser::{NodeArena, NodeIndex, ParserState};
use thiserror::Error;
use tracing::info_span;

use crate::interpreter::{Interpreter, RunReport, RuntimeOptions};

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("{file}: {count} error(s) reported before execution")]
    HasDiagnostics { file: String, count: usize },
}

/// Front-end output for one file: arena, root node, scopes and every
/// scan/parse/bind diagnostic in source order.
pub struct Program {
    file_name: String,
    source: String,
    arena: NodeArena,
    root: NodeIndex,
    binder: BinderState,
    diagnostics: Vec<Diagnostic>,
}

impl Program {
    /// Scan, parse and bind `source`. Never fails; problems are collected
    /// as diagnostics.
    #[must_use]
    pub fn compile(file_name: impl Into<String>, source: impl Into<String>) -> Program {
        let file_name = file_name.into();
        let source = source.into();
        let _span = info_span!("compile", file = %file_name).entered();

        let mut parser = ParserState::new(file_name.clone(), source.clone());
        let root = parser.parse_source_file();
        let mut diagnostics = parser.get_diagnostics().to_vec();
        let arena = parser.into_arena();

        let mut binder = BinderState::new(file_name.clone());
        binder.bind_source_file(&arena, root);
        diagnostics.extend(binder.take_diagnostics());
        diagnostics.sort_by_key(|d| (d.start, d.code));

        Program {
            file_name,
            source,
            arena,
            root,
            binder,
            diagnostics,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn arena(&self) -> &NodeArena {
        &self.arena
    }

    #[must_use]
    pub const fn root(&self) -> NodeIndex {
        self.root
    }

    #[must_use]
    pub const fn binder(&self) -> &BinderState {
        &self.binder
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    /// Interpreter over this program, for callers that want to drive the
    /// script and the job queue separately.
    #[must_use]
    pub fn interpreter(&self, options: RuntimeOptions) -> Interpreter<'_> {
        Interpreter::new(&self.arena, &self.binder, options)
    }

    /// Run the script and drain jobs. Refuses to run a program with errors.
    pub fn run(&self, options: RuntimeOptions) -> Result<RunReport, ProgramError> {
        let count = self.error_count();
        if count > 0 {
            return Err(ProgramError::HasDiagnostics {
                file: self.file_name.clone(),
                count,
            });
        }
        Ok(self.interpreter(options).run(self.root))
    }
}
