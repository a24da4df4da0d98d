//! Script values.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use latch_parser::NodeIndex;

use crate::environment::{Env, EnvironmentRecord};
use crate::error::ErrorFamily;

/// A runtime value. Arrays, closures and errors are shared by reference.
#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Function(FunctionValue),
    Native(NativeFunction),
    Error(Rc<ErrorValue>),
}

/// The function node plus the record it closes over.
///
/// The record is held weakly. What keeps it alive is the [`FunctionValue`]
/// handles that carry a strong anchor, so a closure stored in a binding of
/// its own record (every function declaration) does not keep that record
/// alive by itself.
pub struct Closure {
    /// `FunctionDeclaration` or `FunctionExpression` node.
    pub function: NodeIndex,
    pub name: Option<Rc<str>>,
    env: Weak<EnvironmentRecord>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("function", &self.function)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A handle on a closure.
///
/// Handles anchor the captured record, except the copy stored in a binding
/// of that very record: reading it back out re-anchors it, and the record is
/// necessarily alive while it is being read.
#[derive(Clone)]
pub struct FunctionValue {
    closure: Rc<Closure>,
    anchor: Option<Env>,
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("closure", &self.closure)
            .field("anchored", &self.anchor.is_some())
            .finish()
    }
}

impl FunctionValue {
    #[must_use]
    pub fn new(function: NodeIndex, env: &Env, name: Option<Rc<str>>) -> Self {
        FunctionValue {
            closure: Rc::new(Closure {
                function,
                name,
                env: Rc::downgrade(env),
            }),
            anchor: Some(Rc::clone(env)),
        }
    }

    #[must_use]
    pub fn closure(&self) -> &Rc<Closure> {
        &self.closure
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.closure.name.as_deref()
    }

    /// The captured record; `None` once nothing keeps it alive.
    #[must_use]
    pub fn env(&self) -> Option<Env> {
        self.anchor
            .clone()
            .or_else(|| self.closure.env.upgrade())
    }

    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &FunctionValue) -> bool {
        Rc::ptr_eq(&self.closure, &other.closure)
    }

    fn captures(&self, record: &EnvironmentRecord) -> bool {
        std::ptr::eq(self.closure.env.as_ptr(), record)
    }
}

/// Host functions installed in the global record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeFunction {
    Print,
    QueueMicrotask,
    Error,
}

impl NativeFunction {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            NativeFunction::Print => "print",
            NativeFunction::QueueMicrotask => "queueMicrotask",
            NativeFunction::Error => "Error",
        }
    }
}

/// An error object as scripts see it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorValue {
    pub family: ErrorFamily,
    pub message: String,
}

impl Value {
    #[must_use]
    pub fn string(text: &str) -> Value {
        Value::String(Rc::from(text))
    }

    #[must_use]
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    #[must_use]
    pub fn error(family: ErrorFamily, message: String) -> Value {
        Value::Error(Rc::new(ErrorValue { family, message }))
    }

    /// A new closure over `env`.
    #[must_use]
    pub fn closure(function: NodeIndex, env: &Env, name: Option<Rc<str>>) -> Value {
        Value::Function(FunctionValue::new(function, env, name))
    }

    /// Form stored in a binding of `record`: a closure over `record` drops
    /// its strong anchor so the record does not own itself.
    pub(crate) fn detach_from(self, record: &EnvironmentRecord) -> Value {
        match self {
            Value::Function(function) if function.captures(record) => {
                Value::Function(FunctionValue {
                    anchor: None,
                    ..function
                })
            }
            other => other,
        }
    }

    /// Form handed out of a binding: strong again.
    pub(crate) fn anchored(self) -> Value {
        match self {
            Value::Function(function) if function.anchor.is_none() => {
                let anchor = function.closure.env.upgrade();
                Value::Function(FunctionValue { anchor, ..function })
            }
            other => other,
        }
    }

    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    /// Result of the `typeof` operator.
    #[must_use]
    pub const fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Error(_) => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Function(_) | Value::Native(_) | Value::Error(_) => true,
        }
    }

    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Function(_) | Value::Native(_) | Value::Error(_) => f64::NAN,
        }
    }

    /// String conversion used by `print`, `+` and template-free formatting.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(elements) => elements
                .borrow()
                .iter()
                .map(|v| if v.is_nullish() { String::new() } else { v.to_display_string() })
                .collect::<Vec<_>>()
                .join(","),
            Value::Function(function) => {
                format!("function {}() {{ [code] }}", function.name().unwrap_or(""))
            }
            Value::Native(native) => format!("function {}() {{ [native code] }}", native.name()),
            Value::Error(err) => format!("{}: {}", err.family.name(), err.message),
        }
    }

    /// `===`
    #[must_use]
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`: nullish values equal each other; primitives compare numerically.
    #[must_use]
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::Number(_), Value::String(_))
            | (Value::String(_), Value::Number(_))
            | (Value::Boolean(_), _)
            | (_, Value::Boolean(_)) => self.to_number() == other.to_number(),
            _ => self.strict_equals(other),
        }
    }
}

/// Number formatting close to the host language: integers print without a
/// fraction, non-finite values by name.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{n:.0}");
    }
    format!("{n}")
}
