//! Expression evaluation.
//!
//! Identifier reads, `typeof`, assignments and updates are the access sites
//! that drive binding entries: reads call `get_binding_value`, assignments
//! resolve their target before evaluating the right-hand side and then call
//! `set_mutable_binding`, which is where write-once entries commit.

use std::cell::RefCell;
use std::rc::Rc;

use latch_common::limits::{MAX_ARRAY_LENGTH, STACK_GROW_SIZE, STACK_RED_ZONE};
use latch_parser::{NodeData, NodeIndex};
use latch_scanner::SyntaxKind;
use smallvec::SmallVec;
use tracing::trace;

use crate::environment::Env;
use crate::error::{BindingError, RuntimeError};
use crate::resolver::{resolve, try_resolve};
use crate::value::Value;

use super::state::Interpreter;

/// Assignable location.
enum Reference<'n> {
    /// A name and the record that declares it, if any.
    Binding { name: &'n str, record: Option<Env> },
    Element {
        elements: Rc<RefCell<Vec<Value>>>,
        index: usize,
    },
}

impl<'a> Interpreter<'a> {
    /// Evaluate an expression. Nested expressions recurse here, so the
    /// native stack grows on demand.
    pub(crate) fn eval(&mut self, idx: NodeIndex, env: &Env) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_worker(idx, env))
    }

    fn eval_worker(&mut self, idx: NodeIndex, env: &Env) -> Result<Value, RuntimeError> {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return Ok(Value::Undefined);
        };
        match &node.data {
            NodeData::Identifier { text } => {
                let record = resolve(env, text)?;
                Ok(record.get_binding_value(text, false)?)
            }
            NodeData::NumericLiteral { value } => Ok(Value::Number(*value)),
            NodeData::StringLiteral { value } => Ok(Value::string(value)),
            NodeData::BooleanLiteral { value } => Ok(Value::Boolean(*value)),
            NodeData::NullLiteral => Ok(Value::Null),
            NodeData::ArrayLiteral { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    values.push(self.eval(element, env)?);
                }
                Ok(Value::array(values))
            }
            NodeData::FunctionExpression(func) => Ok(Value::closure(
                idx,
                env,
                arena.identifier_text(func.name).map(Rc::from),
            )),
            NodeData::Parenthesized { expression } => self.eval(*expression, env),
            NodeData::Call { callee, arguments } => {
                let function = self.eval(*callee, env)?;
                let mut values: SmallVec<[Value; 4]> = SmallVec::new();
                for argument in arguments.iter() {
                    values.push(self.eval(argument, env)?);
                }
                if !function.is_callable() {
                    return Err(RuntimeError::type_error(format!(
                        "{} is not a function",
                        self.describe_callee(*callee, &function)
                    )));
                }
                self.call_value(&function, &values)
            }
            NodeData::ElementAccess { object, index } => {
                let object = self.eval(*object, env)?;
                let index = self.eval(*index, env)?;
                get_element(&object, &index)
            }
            NodeData::PropertyAccess { object, name } => {
                let object = self.eval(*object, env)?;
                get_property(&object, name)
            }
            NodeData::Unary { operator, operand } => self.eval_unary(*operator, *operand, env),
            NodeData::Update {
                operator,
                prefix,
                operand,
            } => {
                let reference = self.reference(*operand, env)?;
                let old = get_reference_value(&reference)?.to_number();
                let new = if *operator == SyntaxKind::PlusPlusToken {
                    old + 1.0
                } else {
                    old - 1.0
                };
                put_value(&reference, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            NodeData::Binary {
                left,
                operator,
                right,
            } => self.eval_binary(*left, *operator, *right, env),
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                if self.eval(*condition, env)?.is_truthy() {
                    self.eval(*when_true, env)
                } else {
                    self.eval(*when_false, env)
                }
            }
            NodeData::Assignment {
                target,
                operator,
                value,
            } => self.eval_assignment(*target, *operator, *value, env),
            _ => Err(RuntimeError::type_error("unsupported expression")),
        }
    }

    /// `typeof` asks the entry with `for_typeof` set, so an unwritten
    /// write-once `const` reads as `undefined`. A name nothing declares is
    /// also `undefined`.
    fn eval_typeof(&mut self, operand: NodeIndex, env: &Env) -> Result<Value, RuntimeError> {
        let target = self.strip_parentheses(operand);
        if let Some(name) = self.arena.identifier_text(target) {
            let Some(record) = try_resolve(env, name) else {
                return Ok(Value::string("undefined"));
            };
            let value = record.get_binding_value(name, true)?;
            return Ok(Value::string(value.type_of()));
        }
        let value = self.eval(target, env)?;
        Ok(Value::string(value.type_of()))
    }

    fn strip_parentheses(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(NodeData::Parenthesized { expression }) = self.arena.get(idx).map(|n| &n.data)
        {
            idx = *expression;
        }
        idx
    }

    fn eval_unary(
        &mut self,
        operator: SyntaxKind,
        operand: NodeIndex,
        env: &Env,
    ) -> Result<Value, RuntimeError> {
        if operator == SyntaxKind::TypeOfKeyword {
            return self.eval_typeof(operand, env);
        }
        let value = self.eval(operand, env)?;
        Ok(match operator {
            SyntaxKind::ExclamationToken => Value::Boolean(!value.is_truthy()),
            SyntaxKind::MinusToken => Value::Number(-value.to_number()),
            SyntaxKind::PlusToken => Value::Number(value.to_number()),
            _ => Value::Undefined,
        })
    }

    fn eval_binary(
        &mut self,
        left: NodeIndex,
        operator: SyntaxKind,
        right: NodeIndex,
        env: &Env,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.eval(left, env)?;
        match operator {
            SyntaxKind::AmpersandAmpersandToken => {
                return if lhs.is_truthy() { self.eval(right, env) } else { Ok(lhs) };
            }
            SyntaxKind::BarBarToken => {
                return if lhs.is_truthy() { Ok(lhs) } else { self.eval(right, env) };
            }
            SyntaxKind::QuestionQuestionToken => {
                return if lhs.is_nullish() { self.eval(right, env) } else { Ok(lhs) };
            }
            _ => {}
        }
        let rhs = self.eval(right, env)?;
        apply_binary(operator, &lhs, &rhs)
    }

    /// Resolve the target, then evaluate the value, then write. A compound
    /// operator reads the target first, so it fails on an unwritten entry.
    fn eval_assignment(
        &mut self,
        target: NodeIndex,
        operator: SyntaxKind,
        value: NodeIndex,
        env: &Env,
    ) -> Result<Value, RuntimeError> {
        let reference = self.reference(target, env)?;
        let result = match compound_operator(operator) {
            None => self.eval(value, env)?,
            Some(binary) => {
                let current = get_reference_value(&reference)?;
                let rhs = self.eval(value, env)?;
                apply_binary(binary, &current, &rhs)?
            }
        };
        put_value(&reference, result.clone())?;
        Ok(result)
    }

    fn reference(&mut self, target: NodeIndex, env: &Env) -> Result<Reference<'a>, RuntimeError> {
        let arena = self.arena;
        let target = self.strip_parentheses(target);
        match arena.get(target).map(|n| &n.data) {
            Some(NodeData::Identifier { text }) => Ok(Reference::Binding {
                name: text,
                record: try_resolve(env, text),
            }),
            Some(NodeData::ElementAccess { object, index }) => {
                let object = self.eval(*object, env)?;
                let index = self.eval(*index, env)?;
                let Value::Array(elements) = object else {
                    return Err(RuntimeError::type_error(format!(
                        "Cannot assign to an element of {}",
                        object.type_of()
                    )));
                };
                let Some(index) = array_index(&index) else {
                    return Err(RuntimeError::type_error(format!(
                        "Invalid array index {}",
                        index.to_display_string()
                    )));
                };
                Ok(Reference::Element { elements, index })
            }
            _ => Err(RuntimeError::type_error("Invalid assignment target")),
        }
    }

    /// Source-ish name of a callee for "is not a function" messages.
    fn describe_callee(&self, callee: NodeIndex, value: &Value) -> String {
        match self.arena.get(callee).map(|n| &n.data) {
            Some(NodeData::Identifier { text }) => text.clone(),
            Some(NodeData::PropertyAccess { object, name }) => {
                match self.arena.identifier_text(*object) {
                    Some(object) => format!("{object}.{name}"),
                    None => name.clone(),
                }
            }
            _ => value.to_display_string(),
        }
    }
}

fn get_reference_value(reference: &Reference<'_>) -> Result<Value, RuntimeError> {
    match reference {
        Reference::Binding { name, record } => {
            let record = record.as_ref().ok_or_else(|| unresolved(name))?;
            Ok(record.get_binding_value(name, false)?)
        }
        Reference::Element { elements, index } => {
            Ok(elements.borrow().get(*index).cloned().unwrap_or(Value::Undefined))
        }
    }
}

fn put_value(reference: &Reference<'_>, value: Value) -> Result<(), RuntimeError> {
    match reference {
        Reference::Binding { name, record } => {
            let record = record.as_ref().ok_or_else(|| unresolved(name))?;
            record.set_mutable_binding(name, value)?;
        }
        Reference::Element { elements, index } => {
            let mut elements = elements.borrow_mut();
            if *index >= elements.len() {
                trace!(from = elements.len(), to = index + 1, "array grown");
                elements.resize(index + 1, Value::Undefined);
            }
            elements[*index] = value;
        }
    }
    Ok(())
}

fn unresolved(name: &str) -> RuntimeError {
    RuntimeError::Binding(BindingError::UnresolvedReference {
        name: name.to_string(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn array_index(value: &Value) -> Option<usize> {
    let n = value.to_number();
    (n >= 0.0 && n.fract() == 0.0 && n < MAX_ARRAY_LENGTH as f64).then_some(n as usize)
}

fn compound_operator(operator: SyntaxKind) -> Option<SyntaxKind> {
    match operator {
        SyntaxKind::PlusEqualsToken => Some(SyntaxKind::PlusToken),
        SyntaxKind::MinusEqualsToken => Some(SyntaxKind::MinusToken),
        SyntaxKind::AsteriskEqualsToken => Some(SyntaxKind::AsteriskToken),
        SyntaxKind::SlashEqualsToken => Some(SyntaxKind::SlashToken),
        _ => None,
    }
}

fn apply_binary(operator: SyntaxKind, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let concatenates = |v: &Value| matches!(v, Value::String(_) | Value::Array(_) | Value::Error(_));
    Ok(match operator {
        SyntaxKind::PlusToken if concatenates(lhs) || concatenates(rhs) => {
            let mut text = lhs.to_display_string();
            text.push_str(&rhs.to_display_string());
            Value::String(Rc::from(text))
        }
        SyntaxKind::PlusToken => Value::Number(lhs.to_number() + rhs.to_number()),
        SyntaxKind::MinusToken => Value::Number(lhs.to_number() - rhs.to_number()),
        SyntaxKind::AsteriskToken => Value::Number(lhs.to_number() * rhs.to_number()),
        SyntaxKind::SlashToken => Value::Number(lhs.to_number() / rhs.to_number()),
        SyntaxKind::PercentToken => Value::Number(lhs.to_number() % rhs.to_number()),
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken => Value::Boolean(compare(operator, lhs, rhs)),
        SyntaxKind::EqualsEqualsToken => Value::Boolean(lhs.loose_equals(rhs)),
        SyntaxKind::ExclamationEqualsToken => Value::Boolean(!lhs.loose_equals(rhs)),
        SyntaxKind::EqualsEqualsEqualsToken => Value::Boolean(lhs.strict_equals(rhs)),
        SyntaxKind::ExclamationEqualsEqualsToken => Value::Boolean(!lhs.strict_equals(rhs)),
        other => {
            return Err(RuntimeError::type_error(format!(
                "Operator '{}' cannot be applied here",
                other.text()
            )));
        }
    })
}

/// Strings compare by code point, everything else numerically; `NaN`
/// compares false.
fn compare(operator: SyntaxKind, lhs: &Value, rhs: &Value) -> bool {
    let ordering = match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match operator {
        SyntaxKind::LessThanToken => ordering.is_lt(),
        SyntaxKind::GreaterThanToken => ordering.is_gt(),
        SyntaxKind::LessThanEqualsToken => ordering.is_le(),
        _ => ordering.is_ge(),
    }
}

fn get_element(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match object {
        Value::Array(elements) => Ok(array_index(index)
            .and_then(|i| elements.borrow().get(i).cloned())
            .unwrap_or(Value::Undefined)),
        Value::String(s) => Ok(array_index(index)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
            .unwrap_or(Value::Undefined)),
        other if other.is_nullish() => Err(RuntimeError::type_error(format!(
            "Cannot read properties of {} (reading '{}')",
            other.to_display_string(),
            index.to_display_string()
        ))),
        _ => Ok(Value::Undefined),
    }
}

#[allow(clippy::cast_precision_loss)]
fn get_property(object: &Value, name: &str) -> Result<Value, RuntimeError> {
    Ok(match (object, name) {
        (Value::Array(elements), "length") => Value::Number(elements.borrow().len() as f64),
        (Value::String(s), "length") => Value::Number(s.encode_utf16().count() as f64),
        (Value::Error(err), "name") => Value::string(err.family.name()),
        (Value::Error(err), "message") => Value::string(&err.message),
        (Value::Function(function), "name") => Value::string(function.name().unwrap_or_default()),
        (Value::Native(native), "name") => Value::string(native.name()),
        (other, _) if other.is_nullish() => {
            return Err(RuntimeError::type_error(format!(
                "Cannot read properties of {} (reading '{name}')",
                other.to_display_string()
            )));
        }
        _ => Value::Undefined,
    })
}
