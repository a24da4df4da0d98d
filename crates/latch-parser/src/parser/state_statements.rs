//! Statement and declaration parsing.

use latch_common::diagnostics::diagnostic_codes;
use latch_scanner::SyntaxKind;

use super::node::{FunctionData, NodeData, NodeIndex, NodeList, VariableKind};
use super::state::ParserState;

/// Where a variable declaration list appears; decides initializer rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeclarationContext {
    Statement,
    /// Inside `for (...)`; initializer checks wait until we know whether this
    /// is a C-style loop or a `for-of`.
    ForHead,
}

impl ParserState {
    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_nesting() {
            self.next_token();
            return NodeIndex::NONE;
        }
        let statement = match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => self.parse_variable_statement(),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                self.parse_break_or_continue_statement()
            }
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::SemicolonToken => {
                let start = self.token_pos();
                self.next_token();
                self.finish_node(start, NodeData::Empty)
            }
            _ => self.parse_expression_statement(),
        };
        self.leave_nesting();
        statement
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.token_pos() == before {
                self.parse_error_at_current_token(
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                    &[],
                );
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(
            start,
            NodeData::Block {
                statements: NodeList::new(statements),
            },
        )
    }

    // =========================================================================
    // Variable declarations
    // =========================================================================

    fn parse_variable_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let (kind, declarations) = self.parse_variable_declaration_list(DeclarationContext::Statement);
        self.parse_semicolon();
        self.finish_node(start, NodeData::VariableStatement { kind, declarations })
    }

    fn parse_variable_declaration_list(
        &mut self,
        context: DeclarationContext,
    ) -> (VariableKind, NodeList) {
        let kind = if self.is_token(SyntaxKind::ConstKeyword) {
            VariableKind::Const
        } else {
            VariableKind::Let
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            let can_start_decl = self.is_token(SyntaxKind::Identifier)
                || self.is_token(SyntaxKind::OpenBracketToken);
            if !can_start_decl {
                self.parse_error_at_current_token(
                    diagnostic_codes::VARIABLE_DECLARATION_EXPECTED,
                    &[],
                );
                break;
            }
            declarations.push(self.parse_variable_declaration(kind, context));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        (kind, NodeList::new(declarations))
    }

    fn parse_variable_declaration(
        &mut self,
        kind: VariableKind,
        context: DeclarationContext,
    ) -> NodeIndex {
        let start = self.token_pos();
        let name = self.parse_binding_target();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        let decl = self.finish_node(start, NodeData::VariableDeclaration { name, initializer });
        self.arena.nodes[decl.0 as usize].flags |= kind.flags();
        if context == DeclarationContext::Statement {
            self.check_declaration_initializer(kind, decl, false);
        }
        decl
    }

    /// Plain-name `const` may omit its initializer (a write-once binding).
    /// Destructuring patterns always need one, and so does `const` in a
    /// C-style `for` head.
    fn check_declaration_initializer(&mut self, kind: VariableKind, decl: NodeIndex, in_for_head: bool) {
        let Some(NodeData::VariableDeclaration { name, initializer }) =
            self.arena.get(decl).map(|node| node.data.clone())
        else {
            return;
        };
        if initializer.is_some() {
            return;
        }
        let name_span = self.arena.span(name);
        let is_pattern = matches!(
            self.arena.get(name).map(|node| &node.data),
            Some(NodeData::ArrayBindingPattern { .. })
        );
        if is_pattern {
            self.parse_error_at(
                name_span.start,
                name_span.len(),
                diagnostic_codes::DESTRUCTURING_DECLARATION_MUST_HAVE_AN_INITIALIZER,
                &[],
            );
        } else if in_for_head && kind == VariableKind::Const {
            self.parse_error_at(
                name_span.start,
                name_span.len(),
                diagnostic_codes::DECLARATIONS_MUST_BE_INITIALIZED,
                &["const"],
            );
        }
    }

    /// Identifier or `[a, b, ...]` pattern.
    fn parse_binding_target(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBracketToken) {
            let start = self.token_pos();
            self.next_token();
            let mut elements = Vec::new();
            while !self.is_token(SyntaxKind::CloseBracketToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                elements.push(self.parse_binding_target());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBracketToken);
            return self.finish_node(
                start,
                NodeData::ArrayBindingPattern {
                    elements: NodeList::new(elements),
                },
            );
        }
        self.parse_binding_identifier()
    }

    pub(crate) fn parse_binding_identifier(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::Identifier) {
            let start = self.token_pos();
            let text = self.scanner.token_value().to_string();
            self.next_token();
            return self.finish_node(start, NodeData::Identifier { text });
        }
        self.parse_error_at_current_token(diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
        self.missing_identifier()
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function_declaration(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let name = self.parse_binding_identifier();
        let func = self.parse_function_rest(name);
        self.finish_node(start, NodeData::FunctionDeclaration(func))
    }

    /// Parameters and body, after the optional name.
    pub(crate) fn parse_function_rest(&mut self, name: NodeIndex) -> FunctionData {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            parameters.push(self.parse_binding_identifier());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);

        let saved_loop_depth = self.loop_depth;
        self.loop_depth = 0;
        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;
        self.loop_depth = saved_loop_depth;

        FunctionData {
            name,
            parameters: NodeList::new(parameters),
            body,
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let then_statement = self.parse_embedded_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_embedded_statement()
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            start,
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            },
        )
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let body = self.parse_loop_body();
        self.finish_node(start, NodeData::While { condition, body })
    }

    fn parse_loop_body(&mut self) -> NodeIndex {
        self.loop_depth += 1;
        let body = self.parse_embedded_statement();
        self.loop_depth -= 1;
        body
    }

    /// Body of `if`/`else`/loops. A bare `let`/`const` there would declare
    /// into the enclosing scope once but run on every pass.
    fn parse_embedded_statement(&mut self) -> NodeIndex {
        let keyword = match self.token() {
            SyntaxKind::LetKeyword => Some("let"),
            SyntaxKind::ConstKeyword => Some("const"),
            _ => None,
        };
        if let Some(keyword) = keyword {
            self.parse_error_at_current_token(
                diagnostic_codes::DECLARATIONS_ONLY_INSIDE_A_BLOCK,
                &[keyword],
            );
        }
        self.parse_statement()
    }

    fn parse_for_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        let mut initializer = NodeIndex::NONE;
        if self.is_token(SyntaxKind::LetKeyword) || self.is_token(SyntaxKind::ConstKeyword) {
            let decl_start = self.token_pos();
            let (kind, declarations) =
                self.parse_variable_declaration_list(DeclarationContext::ForHead);

            if self.is_identifier_text("of") {
                return self.parse_for_of_rest(start, kind, &declarations);
            }

            for decl in declarations.iter() {
                self.check_declaration_initializer(kind, decl, true);
            }
            initializer =
                self.finish_node(decl_start, NodeData::VariableStatement { kind, declarations });
        } else if !self.is_token(SyntaxKind::SemicolonToken) {
            initializer = self.parse_expression();
        }
        self.parse_expected(SyntaxKind::SemicolonToken);

        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);

        let incrementor = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::CloseParenToken);

        let body = self.parse_loop_body();
        self.finish_node(
            start,
            NodeData::For {
                initializer,
                condition,
                incrementor,
                body,
            },
        )
    }

    /// `for (let|const <binding> of <expr>) <body>`; the `of` is current.
    fn parse_for_of_rest(
        &mut self,
        start: u32,
        kind: VariableKind,
        declarations: &NodeList,
    ) -> NodeIndex {
        let mut binding = NodeIndex::NONE;
        if let Some(&first) = declarations.nodes.first()
            && let Some(NodeData::VariableDeclaration { name, initializer }) =
                self.arena.get(first).map(|node| node.data.clone())
        {
            binding = name;
            if initializer.is_some() || declarations.len() > 1 {
                let span = self.arena.span(first);
                self.parse_error_at(span.start, span.len(), diagnostic_codes::EXPECTED, &[";"]);
            }
        }
        self.next_token(); // of
        let expression = self.parse_assignment_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let body = self.parse_loop_body();
        self.finish_node(
            start,
            NodeData::ForOf {
                kind,
                binding,
                expression,
                body,
            },
        )
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if self.function_depth == 0 {
            self.parse_error_at_current_token(diagnostic_codes::RETURN_OUTSIDE_FUNCTION, &[]);
        }
        self.next_token();
        let expression = if self.is_token(SyntaxKind::SemicolonToken) || self.can_insert_semicolon()
        {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_semicolon();
        self.finish_node(start, NodeData::Return { expression })
    }

    fn parse_break_or_continue_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let is_break = self.is_token(SyntaxKind::BreakKeyword);
        if self.loop_depth == 0 {
            let code = if is_break {
                diagnostic_codes::BREAK_OUTSIDE_ITERATION
            } else {
                diagnostic_codes::CONTINUE_OUTSIDE_ITERATION
            };
            self.parse_error_at_current_token(code, &[]);
        }
        self.next_token();
        self.parse_semicolon();
        let data = if is_break {
            NodeData::Break
        } else {
            NodeData::Continue
        };
        self.finish_node(start, data)
    }

    fn parse_throw_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let expression = self.parse_expression();
        self.parse_semicolon();
        self.finish_node(start, NodeData::Throw { expression })
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let try_block = self.parse_block();

        let mut catch_clause = NodeIndex::NONE;
        if self.is_token(SyntaxKind::CatchKeyword) {
            let catch_start = self.token_pos();
            self.next_token();
            let binding = if self.parse_optional(SyntaxKind::OpenParenToken) {
                let binding = self.parse_binding_identifier();
                self.parse_expected(SyntaxKind::CloseParenToken);
                binding
            } else {
                NodeIndex::NONE
            };
            let block = self.parse_block();
            catch_clause = self.finish_node(catch_start, NodeData::CatchClause { binding, block });
        }

        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };

        if catch_clause.is_none() && finally_block.is_none() {
            self.parse_error_at_current_token(diagnostic_codes::EXPECTED, &["catch"]);
        }

        self.finish_node(
            start,
            NodeData::Try {
                try_block,
                catch_clause,
                finally_block,
            },
        )
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let expression = self.parse_expression();
        self.parse_semicolon();
        self.finish_node(start, NodeData::ExpressionStatement { expression })
    }
}
