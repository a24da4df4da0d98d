//! AST walk: declaration collection per scope.

use latch_parser::{FunctionData, NodeArena, NodeData, NodeIndex, NodeList, VariableKind};

use crate::scopes::{DeclarationKind, ScopeKind};
use crate::state::BinderState;

impl BinderState {
    pub(crate) fn bind_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        match &node.data {
            NodeData::VariableStatement { kind, declarations } => {
                self.bind_variable_declarations(arena, *kind, declarations);
            }
            NodeData::FunctionDeclaration(func) => {
                if let Some(name) = arena.identifier_text(func.name) {
                    self.declare(
                        name,
                        DeclarationKind::Function,
                        func.name,
                        idx,
                        true,
                        arena.span(func.name),
                    );
                }
                self.bind_function(arena, idx, func);
            }
            NodeData::FunctionExpression(func) => self.bind_function(arena, idx, func),
            NodeData::Block { statements } => {
                let creates_scope = Self::declares_names(arena, statements);
                if creates_scope {
                    self.enter_scope(ScopeKind::Block, idx);
                }
                self.bind_statements(arena, statements);
                if creates_scope {
                    self.exit_scope();
                }
            }
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            } => {
                self.bind_node(arena, *condition);
                self.bind_node(arena, *then_statement);
                self.bind_node(arena, *else_statement);
            }
            NodeData::While { condition, body } => {
                self.bind_node(arena, *condition);
                self.bind_node(arena, *body);
            }
            NodeData::For {
                initializer,
                condition,
                incrementor,
                body,
            } => {
                let has_declarations = matches!(
                    arena.get(*initializer).map(|n| &n.data),
                    Some(NodeData::VariableStatement { .. })
                );
                if has_declarations {
                    self.enter_scope(ScopeKind::For, idx);
                }
                self.bind_node(arena, *initializer);
                self.bind_node(arena, *condition);
                self.bind_node(arena, *incrementor);
                self.bind_node(arena, *body);
                if has_declarations {
                    self.exit_scope();
                }
            }
            NodeData::ForOf {
                kind,
                binding,
                expression,
                body,
            } => {
                // The iterable is evaluated outside the per-iteration scope.
                self.bind_node(arena, *expression);
                self.enter_scope(ScopeKind::For, idx);
                self.declare_binding_target(arena, *kind, *binding, *binding, true);
                self.bind_node(arena, *body);
                self.exit_scope();
            }
            NodeData::Try {
                try_block,
                catch_clause,
                finally_block,
            } => {
                self.bind_node(arena, *try_block);
                self.bind_node(arena, *catch_clause);
                self.bind_node(arena, *finally_block);
            }
            NodeData::CatchClause { binding, block } => {
                self.bind_catch_clause(arena, idx, *binding, *block);
            }
            NodeData::Return { expression }
            | NodeData::Throw { expression }
            | NodeData::ExpressionStatement { expression }
            | NodeData::Parenthesized { expression } => self.bind_node(arena, *expression),
            NodeData::ArrayLiteral { elements } => self.bind_list(arena, elements),
            NodeData::Call { callee, arguments } => {
                self.bind_node(arena, *callee);
                self.bind_list(arena, arguments);
            }
            NodeData::ElementAccess { object, index } => {
                self.bind_node(arena, *object);
                self.bind_node(arena, *index);
            }
            NodeData::PropertyAccess { object, .. } => self.bind_node(arena, *object),
            NodeData::Unary { operand, .. } | NodeData::Update { operand, .. } => {
                self.bind_node(arena, *operand);
            }
            NodeData::Binary { left, right, .. } => {
                self.bind_node(arena, *left);
                self.bind_node(arena, *right);
            }
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.bind_node(arena, *condition);
                self.bind_node(arena, *when_true);
                self.bind_node(arena, *when_false);
            }
            NodeData::Assignment { target, value, .. } => {
                self.bind_node(arena, *target);
                self.bind_node(arena, *value);
            }
            NodeData::SourceFile { .. }
            | NodeData::VariableDeclaration { .. }
            | NodeData::ArrayBindingPattern { .. }
            | NodeData::Break
            | NodeData::Continue
            | NodeData::Empty
            | NodeData::Identifier { .. }
            | NodeData::NumericLiteral { .. }
            | NodeData::StringLiteral { .. }
            | NodeData::BooleanLiteral { .. }
            | NodeData::NullLiteral => {}
        }
    }

    fn bind_statements(&mut self, arena: &NodeArena, statements: &NodeList) {
        for statement in statements.iter() {
            self.bind_node(arena, statement);
        }
    }

    fn bind_list(&mut self, arena: &NodeArena, list: &NodeList) {
        for element in list.iter() {
            self.bind_node(arena, element);
        }
    }

    /// Declare every name of a `let`/`const` list left to right, binding each
    /// initializer after its own declarator.
    fn bind_variable_declarations(
        &mut self,
        arena: &NodeArena,
        kind: VariableKind,
        declarations: &NodeList,
    ) {
        for decl in declarations.iter() {
            let Some(NodeData::VariableDeclaration { name, initializer }) =
                arena.get(decl).map(|n| &n.data)
            else {
                continue;
            };
            self.declare_binding_target(arena, kind, *name, decl, initializer.is_some());
            self.bind_node(arena, *initializer);
        }
    }

    fn declare_binding_target(
        &mut self,
        arena: &NodeArena,
        kind: VariableKind,
        target: NodeIndex,
        declaration: NodeIndex,
        has_initializer: bool,
    ) {
        let declaration_kind = match kind {
            VariableKind::Let => DeclarationKind::Let,
            VariableKind::Const => DeclarationKind::Const,
        };
        let mut names = Vec::new();
        arena.collect_binding_identifiers(target, &mut names);
        for ident in names {
            // Missing identifiers from error recovery have empty text.
            if let Some(text) = arena.identifier_text(ident)
                && !text.is_empty()
            {
                self.declare(
                    text,
                    declaration_kind,
                    ident,
                    declaration,
                    has_initializer,
                    arena.span(ident),
                );
            }
        }
    }

    /// Parameters and the body's top-level declarations share one scope, so
    /// `function f(x) { let x; }` is a duplicate.
    #[tracing::instrument(level = "debug", skip(self, arena, func), fields(function_idx = idx.0))]
    fn bind_function(&mut self, arena: &NodeArena, idx: NodeIndex, func: &FunctionData) {
        self.enter_scope(ScopeKind::Function, idx);
        for param in func.parameters.iter() {
            if let Some(name) = arena.identifier_text(param)
                && !name.is_empty()
            {
                self.declare(
                    name,
                    DeclarationKind::Parameter,
                    param,
                    param,
                    true,
                    arena.span(param),
                );
            }
        }
        if let Some(statements) = arena.statements(func.body) {
            self.bind_statements(arena, statements);
        }
        self.exit_scope();
    }

    fn bind_catch_clause(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        binding: NodeIndex,
        block: NodeIndex,
    ) {
        let statements = arena.statements(block);
        let creates_scope =
            binding.is_some() || statements.is_some_and(|s| Self::declares_names(arena, s));
        if creates_scope {
            self.enter_scope(ScopeKind::Catch, idx);
        }
        if let Some(name) = arena.identifier_text(binding)
            && !name.is_empty()
        {
            self.declare(
                name,
                DeclarationKind::CatchParameter,
                binding,
                binding,
                true,
                arena.span(binding),
            );
        }
        if let Some(statements) = statements {
            self.bind_statements(arena, statements);
        }
        if creates_scope {
            self.exit_scope();
        }
    }

    /// Whether a statement list declares anything directly.
    pub(crate) fn declares_names(arena: &NodeArena, statements: &NodeList) -> bool {
        statements.iter().any(|statement| {
            matches!(
                arena.get(statement).map(|n| &n.data),
                Some(NodeData::VariableStatement { .. } | NodeData::FunctionDeclaration(_))
            )
        })
    }
}
