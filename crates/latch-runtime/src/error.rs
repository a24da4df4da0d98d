//! Runtime error taxonomy.
//!
//! Binding operations fail with [`BindingError`]; evaluation fails with
//! [`RuntimeError`]. Every error maps onto an [`ErrorFamily`], the name
//! scripts observe through `e.name` and uncaught reports print.

use latch_common::diagnostics::{diagnostic_codes, format_message, get_message_template};
use thiserror::Error;

use crate::value::Value;

/// Externally observable error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorFamily {
    Error,
    ReferenceError,
    TypeError,
    SyntaxError,
    RangeError,
}

impl ErrorFamily {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ErrorFamily::Error => "Error",
            ErrorFamily::ReferenceError => "ReferenceError",
            ErrorFamily::TypeError => "TypeError",
            ErrorFamily::SyntaxError => "SyntaxError",
            ErrorFamily::RangeError => "RangeError",
        }
    }
}

/// Fill the registered template for `code` with a binding name.
fn binding_message(code: u32, name: &str) -> String {
    format_message(get_message_template(code).unwrap_or("{0}"), &[name])
}

/// Why an `Unset` entry refused an access. Both surface as the same
/// `ReferenceError`; only the message differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnboundReason {
    /// A `const` declared without an initializer that nothing has assigned.
    Unassigned,
    /// A declaration whose initializer has not run yet.
    BeforeDeclaration,
}

impl UnboundReason {
    const fn code(self) -> u32 {
        match self {
            UnboundReason::Unassigned => diagnostic_codes::CONSTANT_USED_BEFORE_BEING_ASSIGNED,
            UnboundReason::BeforeDeclaration => {
                diagnostic_codes::BLOCK_SCOPED_VARIABLE_USED_BEFORE_ITS_DECLARATION
            }
        }
    }
}

/// Failure of one binding operation on an environment record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Two entries in one record share a name.
    #[error("{}", binding_message(diagnostic_codes::CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE, .name))]
    DuplicateName { name: String },
    /// Ordinary access to an entry that has no value yet.
    #[error("{}", binding_message(.reason.code(), .name))]
    UnboundAccess { name: String, reason: UnboundReason },
    /// Write to an immutable entry that already holds a value.
    #[error("{}", binding_message(diagnostic_codes::CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_CONSTANT, .name))]
    Reassignment { name: String },
    /// No record on the chain declares the name.
    #[error("{}", binding_message(diagnostic_codes::CANNOT_FIND_NAME, .name))]
    UnresolvedReference { name: String },
    /// `InitializeBinding` ran twice on one entry. Never reachable from a
    /// script when the declaration installer is correct.
    #[error("internal error: binding '{name}' initialized twice")]
    AlreadyInitialized { name: String },
    /// A record operation named an entry the record does not hold.
    #[error("internal error: no binding '{name}' in this environment record")]
    MissingBinding { name: String },
}

impl BindingError {
    #[must_use]
    pub const fn family(&self) -> ErrorFamily {
        match self {
            BindingError::DuplicateName { .. } => ErrorFamily::SyntaxError,
            BindingError::UnboundAccess { .. } | BindingError::UnresolvedReference { .. } => {
                ErrorFamily::ReferenceError
            }
            BindingError::Reassignment { .. } => ErrorFamily::TypeError,
            BindingError::AlreadyInitialized { .. } | BindingError::MissingBinding { .. } => {
                ErrorFamily::Error
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            BindingError::DuplicateName { name }
            | BindingError::UnboundAccess { name, .. }
            | BindingError::Reassignment { name }
            | BindingError::UnresolvedReference { name }
            | BindingError::AlreadyInitialized { name }
            | BindingError::MissingBinding { name } => name,
        }
    }
}

/// Abrupt completion of evaluation.
#[derive(Clone, Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    /// Value raised by a `throw` statement.
    #[error("{}", .0.to_display_string())]
    Thrown(Value),
    /// Bad operand or callee.
    #[error("{0}")]
    Type(String),
    #[error("Maximum call stack size exceeded")]
    CallDepthExceeded { limit: u32 },
    #[error("Job queue limit of {limit} exceeded")]
    JobQueueLimit { limit: usize },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::Type(message.into())
    }

    /// Family of the error; `None` for thrown values that are not error
    /// objects.
    #[must_use]
    pub fn family(&self) -> Option<ErrorFamily> {
        match self {
            RuntimeError::Binding(err) => Some(err.family()),
            RuntimeError::Thrown(Value::Error(err)) => Some(err.family),
            RuntimeError::Thrown(_) => None,
            RuntimeError::Type(_) => Some(ErrorFamily::TypeError),
            RuntimeError::CallDepthExceeded { .. } | RuntimeError::JobQueueLimit { .. } => {
                Some(ErrorFamily::RangeError)
            }
        }
    }

    /// The value a `catch` clause binds.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            RuntimeError::Thrown(value) => value,
            other => {
                let family = other.family().unwrap_or(ErrorFamily::Error);
                Value::error(family, other.to_string())
            }
        }
    }

    /// `Family: message` for error values, the plain value otherwise.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self, self.family()) {
            (RuntimeError::Thrown(Value::Error(err)), _) => {
                format!("{}: {}", err.family.name(), err.message)
            }
            (_, Some(family)) => format!("{}: {self}", family.name()),
            (_, None) => self.to_string(),
        }
    }
}
