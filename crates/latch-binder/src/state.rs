//! Binder state: the scope table, the scope stack and diagnostics.

use latch_common::Span;
use latch_common::diagnostics::{Diagnostic, diagnostic_codes};
use latch_parser::{NodeArena, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::scopes::{Declaration, DeclarationKind, ScopeId, ScopeInfo, ScopeKind};

/// Walks a parsed file once and records, for every scope-creating node, the
/// names it declares in textual order.
pub struct BinderState {
    file_name: String,
    /// Every scope, indexed by [`ScopeId`]. Parents precede children.
    pub scopes: Vec<ScopeInfo>,
    /// Map from the AST node that creates a scope to its [`ScopeId`].
    pub node_scope_ids: FxHashMap<u32, ScopeId>,
    /// Scopes enclosing the node being bound, innermost last.
    pub(crate) scope_stack: Vec<ScopeId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl BinderState {
    #[must_use]
    pub fn new(file_name: String) -> Self {
        BinderState {
            file_name,
            scopes: Vec::new(),
            node_scope_ids: FxHashMap::default(),
            scope_stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Bind a source file; `root` must be its `SourceFile` node.
    #[tracing::instrument(level = "debug", skip(self, arena), fields(root = root.0))]
    pub fn bind_source_file(&mut self, arena: &NodeArena, root: NodeIndex) {
        self.enter_scope(ScopeKind::Script, root);
        if let Some(statements) = arena.statements(root) {
            for statement in statements.iter() {
                self.bind_node(arena, statement);
            }
        }
        self.exit_scope();
        self.diagnostics.sort_by_key(|d| d.start);
        debug!(
            scopes = self.scopes.len(),
            diagnostics = self.diagnostics.len(),
            "bound source file"
        );
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Scope created by `node`, if it creates one.
    #[must_use]
    pub fn scope_for_node(&self, node: NodeIndex) -> Option<&ScopeInfo> {
        let id = self.node_scope_ids.get(&node.0)?;
        self.scope(*id)
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> Option<&ScopeInfo> {
        self.scopes.get(id.0 as usize)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // =========================================================================
    // Scope stack
    // =========================================================================

    pub(crate) fn enter_scope(&mut self, kind: ScopeKind, node: NodeIndex) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let parent = self.scope_stack.last().copied();
        self.scopes.push(ScopeInfo::new(kind, node, parent));
        self.node_scope_ids.insert(node.0, id);
        self.scope_stack.push(id);
        id
    }

    pub(crate) fn exit_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Add a name to the innermost scope. A name already declared there is
    /// reported and the first declaration kept.
    pub(crate) fn declare(
        &mut self,
        name: &str,
        kind: DeclarationKind,
        node: NodeIndex,
        declaration: NodeIndex,
        has_initializer: bool,
        span: Span,
    ) {
        let Some(&scope_id) = self.scope_stack.last() else {
            return;
        };
        let scope = &mut self.scopes[scope_id.0 as usize];
        if let Some(existing) = scope.declarations.get(name) {
            let code = if existing.kind.is_lexical() && kind.is_lexical() {
                diagnostic_codes::CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE
            } else {
                diagnostic_codes::DUPLICATE_IDENTIFIER
            };
            let first = existing.span;
            debug!(binding = name, code, "duplicate declaration");
            let diag = Diagnostic::from_code(&self.file_name, span.start, span.len(), code, &[name])
                .with_related(
                    self.file_name.clone(),
                    first.start,
                    first.len(),
                    format!("'{name}' was also declared here."),
                );
            self.diagnostics.push(diag);
            return;
        }
        scope.declarations.insert(
            name.to_string(),
            Declaration {
                name: name.to_string(),
                kind,
                node,
                declaration,
                has_initializer,
                span,
            },
        );
    }
}
