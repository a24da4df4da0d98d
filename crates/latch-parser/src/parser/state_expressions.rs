//! Expression parsing.
//!
//! Binary operators use precedence climbing; everything else is plain
//! recursive descent. There is no comma operator.

use latch_common::diagnostics::diagnostic_codes;
use latch_scanner::SyntaxKind;

use super::node::{NodeData, NodeIndex, NodeList};
use super::state::ParserState;

/// Binding power of a binary operator, or 0 if `kind` is not one.
const fn binary_precedence(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::QuestionQuestionToken => 1,
        SyntaxKind::BarBarToken => 2,
        SyntaxKind::AmpersandAmpersandToken => 3,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => 4,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken => 5,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => 6,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 7,
        _ => 0,
    }
}

impl ParserState {
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        self.parse_assignment_expression()
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> NodeIndex {
        if !self.enter_nesting() {
            return self.missing_identifier();
        }
        let expression = self.parse_assignment_expression_worker();
        self.leave_nesting();
        expression
    }

    fn parse_assignment_expression_worker(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let target = self.parse_conditional_expression();
        let operator = self.token();
        if !operator.is_assignment_operator() {
            return target;
        }
        self.check_assignment_target(target);
        self.next_token();
        let value = self.parse_assignment_expression();
        self.finish_node(
            start,
            NodeData::Assignment {
                target,
                operator,
                value,
            },
        )
    }

    /// Only identifiers and element accesses can be assigned or updated.
    fn check_assignment_target(&mut self, target: NodeIndex) {
        let Some(node) = self.arena.get(target) else {
            return;
        };
        let valid = matches!(
            node.data,
            NodeData::Identifier { .. } | NodeData::ElementAccess { .. }
        );
        if !valid {
            let span = node.span;
            self.parse_error_at(
                span.start,
                span.len(),
                diagnostic_codes::INVALID_ASSIGNMENT_TARGET,
                &[],
            );
        }
    }

    fn parse_conditional_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let condition = self.parse_binary_expression(0);
        if !self.parse_optional(SyntaxKind::QuestionToken) {
            return condition;
        }
        let when_true = self.parse_assignment_expression();
        self.parse_expected(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression();
        self.finish_node(
            start,
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            },
        )
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start = self.token_pos();
        let mut left = self.parse_unary_expression();
        loop {
            let operator = self.token();
            let precedence = binary_precedence(operator);
            if precedence == 0 || precedence <= min_precedence {
                break;
            }
            self.next_token();
            let right = self.parse_binary_expression(precedence);
            left = self.finish_node(
                start,
                NodeData::Binary {
                    left,
                    operator,
                    right,
                },
            );
        }
        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let operator = self.token();
        match operator {
            SyntaxKind::ExclamationToken
            | SyntaxKind::MinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword => {
                self.next_token();
                if !self.enter_nesting() {
                    return self.missing_identifier();
                }
                let operand = self.parse_unary_expression();
                self.leave_nesting();
                self.finish_node(start, NodeData::Unary { operator, operand })
            }
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                self.next_token();
                if !self.enter_nesting() {
                    return self.missing_identifier();
                }
                let operand = self.parse_unary_expression();
                self.leave_nesting();
                self.check_assignment_target(operand);
                self.finish_node(
                    start,
                    NodeData::Update {
                        operator,
                        prefix: true,
                        operand,
                    },
                )
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let operand = self.parse_call_or_member_expression();
        let operator = self.token();
        let is_update = matches!(
            operator,
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
        );
        // `a\n++b` is two statements.
        if !is_update || self.scanner.has_preceding_line_break() {
            return operand;
        }
        self.check_assignment_target(operand);
        self.next_token();
        self.finish_node(
            start,
            NodeData::Update {
                operator,
                prefix: false,
                operand,
            },
        )
    }

    fn parse_call_or_member_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut expression = self.parse_primary_expression();
        loop {
            match self.token() {
                SyntaxKind::OpenParenToken => {
                    self.next_token();
                    let arguments = self.parse_expression_list(SyntaxKind::CloseParenToken);
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    expression = self.finish_node(
                        start,
                        NodeData::Call {
                            callee: expression,
                            arguments,
                        },
                    );
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let index = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expression = self.finish_node(
                        start,
                        NodeData::ElementAccess {
                            object: expression,
                            index,
                        },
                    );
                }
                SyntaxKind::DotToken => {
                    self.next_token();
                    // Keywords are valid property names.
                    let name = if self.is_token(SyntaxKind::Identifier) || self.token().is_keyword()
                    {
                        let name = self.scanner.token_value().to_string();
                        self.next_token();
                        name
                    } else {
                        self.parse_error_at_current_token(
                            diagnostic_codes::IDENTIFIER_EXPECTED,
                            &[],
                        );
                        String::new()
                    };
                    expression = self.finish_node(
                        start,
                        NodeData::PropertyAccess {
                            object: expression,
                            name,
                        },
                    );
                }
                _ => return expression,
            }
        }
    }

    /// Comma-separated expressions up to (not including) `close`. A trailing
    /// comma is allowed.
    fn parse_expression_list(&mut self, close: SyntaxKind) -> NodeList {
        let mut elements = Vec::new();
        while !self.is_token(close) && !self.is_token(SyntaxKind::EndOfFileToken) {
            elements.push(self.parse_assignment_expression());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        NodeList::new(elements)
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::NumericLiteral => {
                let value = self.scanner.token_value().parse::<f64>().unwrap_or(f64::NAN);
                self.next_token();
                self.finish_node(start, NodeData::NumericLiteral { value })
            }
            SyntaxKind::StringLiteral => {
                let value = self.scanner.token_value().to_string();
                self.next_token();
                self.finish_node(start, NodeData::StringLiteral { value })
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let value = self.is_token(SyntaxKind::TrueKeyword);
                self.next_token();
                self.finish_node(start, NodeData::BooleanLiteral { value })
            }
            SyntaxKind::NullKeyword => {
                self.next_token();
                self.finish_node(start, NodeData::NullLiteral)
            }
            SyntaxKind::Identifier => {
                let text = self.scanner.token_value().to_string();
                self.next_token();
                self.finish_node(start, NodeData::Identifier { text })
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.finish_node(start, NodeData::Parenthesized { expression })
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let elements = self.parse_expression_list(SyntaxKind::CloseBracketToken);
                self.parse_expected(SyntaxKind::CloseBracketToken);
                self.finish_node(start, NodeData::ArrayLiteral { elements })
            }
            SyntaxKind::FunctionKeyword => {
                self.next_token();
                let name = if self.is_token(SyntaxKind::Identifier) {
                    self.parse_binding_identifier()
                } else {
                    NodeIndex::NONE
                };
                let func = self.parse_function_rest(name);
                self.finish_node(start, NodeData::FunctionExpression(func))
            }
            _ => {
                self.parse_error_at_current_token(diagnostic_codes::EXPRESSION_EXPECTED, &[]);
                self.missing_identifier()
            }
        }
    }
}
