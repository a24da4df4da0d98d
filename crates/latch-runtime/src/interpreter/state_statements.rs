//! Statement execution.

use latch_common::limits::{STACK_GROW_SIZE, STACK_RED_ZONE};
use latch_parser::{NodeData, NodeIndex, NodeList};
use tracing::debug;

use crate::environment::Env;
use crate::error::RuntimeError;
use crate::value::Value;

use super::state::{Completion, Interpreter};

impl Interpreter<'_> {
    pub(crate) fn exec_statements(
        &mut self,
        statements: &NodeList,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        for statement in statements.iter() {
            match self.exec_statement(statement, env)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    pub(crate) fn exec_statement(
        &mut self,
        idx: NodeIndex,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.exec_statement_worker(idx, env)
        });
        if result.is_err() && self.fault_span.is_none() {
            self.fault_span = Some(self.arena.span(idx));
        }
        result
    }

    fn exec_statement_worker(
        &mut self,
        idx: NodeIndex,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return Ok(Completion::Normal);
        };
        match &node.data {
            NodeData::VariableStatement { declarations, .. } => {
                for decl in declarations.iter() {
                    self.exec_variable_declaration(decl, env)?;
                }
                Ok(Completion::Normal)
            }
            // Installed at scope entry.
            NodeData::FunctionDeclaration(_) | NodeData::Empty => Ok(Completion::Normal),
            NodeData::Block { statements } => {
                let block_env = self.enter_scope(idx, env, &[])?;
                self.exec_statements(statements, &block_env)
            }
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            } => {
                if self.eval(*condition, env)?.is_truthy() {
                    self.exec_statement(*then_statement, env)
                } else if else_statement.is_some() {
                    self.exec_statement(*else_statement, env)
                } else {
                    Ok(Completion::Normal)
                }
            }
            NodeData::While { condition, body } => {
                while self.eval(*condition, env)?.is_truthy() {
                    match self.exec_statement(*body, env)? {
                        Completion::Break => break,
                        Completion::Return(value) => return Ok(Completion::Return(value)),
                        Completion::Continue | Completion::Normal => {}
                    }
                }
                Ok(Completion::Normal)
            }
            NodeData::For {
                initializer,
                condition,
                incrementor,
                body,
            } => self.exec_for(idx, *initializer, *condition, *incrementor, *body, env),
            NodeData::ForOf {
                binding,
                expression,
                body,
                ..
            } => self.exec_for_of(idx, *binding, *expression, *body, env),
            NodeData::Return { expression } => {
                let value = if expression.is_some() {
                    self.eval(*expression, env)?
                } else {
                    Value::Undefined
                };
                Ok(Completion::Return(value))
            }
            NodeData::Break => Ok(Completion::Break),
            NodeData::Continue => Ok(Completion::Continue),
            NodeData::Throw { expression } => {
                let value = self.eval(*expression, env)?;
                Err(RuntimeError::Thrown(value))
            }
            NodeData::Try {
                try_block,
                catch_clause,
                finally_block,
            } => self.exec_try(*try_block, *catch_clause, *finally_block, env),
            NodeData::ExpressionStatement { expression } => {
                self.eval(*expression, env)?;
                Ok(Completion::Normal)
            }
            _ => {
                self.eval(idx, env)?;
                Ok(Completion::Normal)
            }
        }
    }

    /// Run one declarator. Entries already exist; only an inline
    /// initializer does anything here.
    fn exec_variable_declaration(&mut self, decl: NodeIndex, env: &Env) -> Result<(), RuntimeError> {
        let Some(NodeData::VariableDeclaration { name, initializer }) =
            self.arena.get(decl).map(|n| &n.data)
        else {
            return Ok(());
        };
        if initializer.is_none() {
            return Ok(());
        }
        let (name, initializer) = (*name, *initializer);
        let value = self.eval(initializer, env)?;
        self.initialize_target(name, value, env)
    }

    /// `InitializeBinding` for an identifier, or for each identifier of an
    /// array pattern with the matching element.
    pub(crate) fn initialize_target(
        &mut self,
        target: NodeIndex,
        value: Value,
        env: &Env,
    ) -> Result<(), RuntimeError> {
        let arena = self.arena;
        match arena.get(target).map(|n| &n.data) {
            Some(NodeData::Identifier { text }) => {
                env.initialize_binding(text, value)?;
                Ok(())
            }
            Some(NodeData::ArrayBindingPattern { elements }) => {
                let items = Self::iterate(&value)?;
                for (i, element) in elements.iter().enumerate() {
                    let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                    self.initialize_target(element, item, env)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Elements of an array, or characters of a string.
    pub(crate) fn iterate(value: &Value) -> Result<Vec<Value>, RuntimeError> {
        match value {
            Value::Array(elements) => Ok(elements.borrow().clone()),
            Value::String(s) => Ok(s
                .chars()
                .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
                .collect()),
            other => Err(RuntimeError::type_error(format!(
                "{} is not iterable",
                other.to_display_string()
            ))),
        }
    }

    /// C-style `for`. With `let`/`const` in the head, every iteration runs
    /// in its own copy of the head record, so closures created in the body
    /// keep that iteration's values.
    fn exec_for(
        &mut self,
        idx: NodeIndex,
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        body: NodeIndex,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        let per_iteration = self.binder.scope_for_node(idx).is_some();
        let head_env = self.enter_scope(idx, env, &[])?;
        if initializer.is_some() {
            let is_declaration = matches!(
                self.arena.get(initializer).map(|n| &n.data),
                Some(NodeData::VariableStatement { .. })
            );
            if is_declaration {
                self.exec_statement(initializer, &head_env)?;
            } else {
                self.eval(initializer, &head_env)?;
            }
        }

        let mut iteration_env = if per_iteration {
            head_env.copy_for_iteration()
        } else {
            head_env
        };
        loop {
            if condition.is_some() && !self.eval(condition, &iteration_env)?.is_truthy() {
                break;
            }
            match self.exec_statement(body, &iteration_env)? {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Continue | Completion::Normal => {}
            }
            if per_iteration {
                iteration_env = iteration_env.copy_for_iteration();
            }
            if incrementor.is_some() {
                self.eval(incrementor, &iteration_env)?;
            }
        }
        Ok(Completion::Normal)
    }

    /// `for (let|const x of e)`: a fresh record per element. Arrays are read
    /// by index, so elements appended by the body are visited.
    fn exec_for_of(
        &mut self,
        idx: NodeIndex,
        binding: NodeIndex,
        expression: NodeIndex,
        body: NodeIndex,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        let iterable = self.eval(expression, env)?;
        let snapshot = match &iterable {
            Value::Array(_) => None,
            other => Some(Self::iterate(other)?),
        };
        let mut index = 0;
        loop {
            let item = match (&iterable, &snapshot) {
                (Value::Array(elements), _) => elements.borrow().get(index).cloned(),
                (_, Some(items)) => items.get(index).cloned(),
                _ => None,
            };
            let Some(item) = item else {
                break;
            };
            index += 1;
            let iteration_env = self.enter_scope(idx, env, &[])?;
            self.initialize_target(binding, item, &iteration_env)?;
            match self.exec_statement(body, &iteration_env)? {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Continue | Completion::Normal => {}
            }
        }
        Ok(Completion::Normal)
    }

    fn exec_try(
        &mut self,
        try_block: NodeIndex,
        catch_clause: NodeIndex,
        finally_block: NodeIndex,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        let result = match self.exec_statement(try_block, env) {
            Err(error) if catch_clause.is_some() => {
                debug!(error = %error, "caught");
                self.fault_span = None;
                self.exec_catch(catch_clause, error, env)
            }
            other => other,
        };
        if finally_block.is_none() {
            return result;
        }
        let pending_fault = self.fault_span.take();
        match self.exec_statement(finally_block, env)? {
            Completion::Normal => {}
            abrupt => return Ok(abrupt),
        }
        self.fault_span = pending_fault;
        result
    }

    fn exec_catch(
        &mut self,
        clause: NodeIndex,
        error: RuntimeError,
        env: &Env,
    ) -> Result<Completion, RuntimeError> {
        let arena = self.arena;
        let Some(NodeData::CatchClause { binding, block }) = arena.get(clause).map(|n| &n.data)
        else {
            return Err(error);
        };
        let catch_env = self.enter_scope(clause, env, &[])?;
        if binding.is_some() {
            self.initialize_target(*binding, error.into_value(), &catch_env)?;
        }
        match arena.statements(*block) {
            Some(statements) => self.exec_statements(statements, &catch_env),
            None => Ok(Completion::Normal),
        }
    }
}
