//! Parser state: token handling, diagnostics and the entry point.

use latch_common::diagnostics::{Diagnostic, diagnostic_codes};
use latch_common::limits::MAX_PARSE_DEPTH;
use latch_common::Span;
use latch_scanner::{ScannerState, SyntaxKind};
use tracing::debug;

use super::node::{NodeArena, NodeData, NodeFlags, NodeIndex, NodeList};

/// Recursive-descent parser producing a [`NodeArena`].
pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub parse_diagnostics: Vec<Diagnostic>,
    /// Start offset of the last reported error; suppresses cascades at one spot.
    last_error_pos: Option<u32>,
    /// End offset of the previously consumed token.
    pub(crate) previous_token_end: u32,
    pub(crate) function_depth: u32,
    pub(crate) loop_depth: u32,
    pub(crate) nesting_depth: u32,
}

impl ParserState {
    #[must_use]
    pub fn new(file_name: String, source: String) -> Self {
        let capacity = source.len() / 4;
        let mut scanner = ScannerState::new(file_name, source);
        scanner.scan();
        ParserState {
            scanner,
            arena: NodeArena::with_capacity(capacity),
            parse_diagnostics: Vec::new(),
            last_error_pos: None,
            previous_token_end: 0,
            function_depth: 0,
            loop_depth: 0,
            nesting_depth: 0,
        }
    }

    /// Parse the whole file and return the `SourceFile` node.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.token_pos() == before && !self.is_token(SyntaxKind::EndOfFileToken) {
                // No progress: drop the offending token.
                self.parse_error_at_current_token(
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                    &[],
                );
                self.next_token();
            }
        }
        let end = self.token_end();
        let scan_diagnostics = self.scanner.take_diagnostics();
        self.parse_diagnostics.extend(scan_diagnostics);
        self.parse_diagnostics.sort_by_key(|d| d.start);
        debug!(
            file = self.scanner.file_name(),
            nodes = self.arena.len(),
            diagnostics = self.parse_diagnostics.len(),
            "parsed source file"
        );
        self.arena.add(
            Span::new(start, end),
            NodeFlags::empty(),
            NodeData::SourceFile {
                statements: NodeList::new(statements),
            },
        )
    }

    #[must_use]
    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Take ownership of the arena once parsing is done.
    #[must_use]
    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    #[must_use]
    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.parse_diagnostics
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        self.scanner.file_name()
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        self.scanner.source()
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.scanner.token() == kind
    }

    /// Current token is the identifier `text` (used for contextual keywords).
    pub(crate) fn is_identifier_text(&self, text: &str) -> bool {
        self.is_token(SyntaxKind::Identifier) && self.scanner.token_value() == text
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.previous_token_end = self.scanner.token_end();
        self.scanner.scan()
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.parse_error_at_current_token(diagnostic_codes::EXPECTED, &[kind.text()]);
        false
    }

    /// Consume a statement terminator, applying automatic semicolon insertion
    /// before `}`, end of file, or a line break.
    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return;
        }
        if self.can_insert_semicolon() {
            return;
        }
        self.parse_error_at_current_token(diagnostic_codes::EXPECTED, &[";"]);
    }

    pub(crate) fn can_insert_semicolon(&self) -> bool {
        self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.scanner.has_preceding_line_break()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn parse_error_at(&mut self, start: u32, length: u32, code: u32, args: &[&str]) {
        if self.last_error_pos == Some(start) {
            return;
        }
        self.last_error_pos = Some(start);
        self.parse_diagnostics.push(Diagnostic::from_code(
            self.scanner.file_name(),
            start,
            length,
            code,
            args,
        ));
    }

    pub(crate) fn parse_error_at_current_token(&mut self, code: u32, args: &[&str]) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.parse_error_at(start, length, code, args);
    }

    // =========================================================================
    // Node helpers
    // =========================================================================

    pub(crate) fn finish_node(&mut self, start: u32, data: NodeData) -> NodeIndex {
        let end = self.previous_token_end.max(start);
        self.arena
            .add(Span::new(start, end), NodeFlags::empty(), data)
    }

    /// Placeholder for a missing expression so parents stay well-formed.
    pub(crate) fn missing_identifier(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.arena.add(
            Span::new(pos, pos),
            NodeFlags::MISSING,
            NodeData::Identifier {
                text: String::new(),
            },
        )
    }

    /// Guard recursive descent; returns `false` (after reporting) when too deep.
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.nesting_depth >= MAX_PARSE_DEPTH {
            self.parse_error_at_current_token(
                diagnostic_codes::MAXIMUM_NESTING_DEPTH_EXCEEDED,
                &[],
            );
            return false;
        }
        self.nesting_depth += 1;
        true
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }
}
