//! Binding entries and their state machine.
//!
//! An entry is a declared kind plus a state, `Unset` or `Set(value)`.
//! Mutable entries are always `Set`. Immutable entries start `Unset` and
//! reach `Set` exactly once, either through `InitializeBinding` (inline
//! initializer) or through the write-once path of `SetMutableBinding` (no
//! initializer). After that they never change.

use crate::error::{BindingError, UnboundReason};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Mutable,
    Immutable,
}

#[derive(Clone, Debug)]
pub enum BindingState {
    Unset,
    Set(Value),
}

impl BindingState {
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, BindingState::Set(_))
    }
}

/// How an `Unset` immutable entry may leave that state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    /// Declared without an initializer: one assignment may set it, and
    /// `typeof` reads it as `undefined` until then.
    WriteOnce,
    /// Declared with an initializer that has not run yet. Every access
    /// fails until `InitializeBinding`.
    AwaitingInitializer,
}

/// State of one declared name in one environment record.
#[derive(Clone, Debug)]
pub struct BindingEntry {
    kind: BindingKind,
    state: BindingState,
    pending: Option<Pending>,
    initialized: bool,
}

impl BindingEntry {
    /// `let`, functions and parameters: `Set` to `undefined` from the start.
    #[must_use]
    pub const fn mutable() -> Self {
        BindingEntry {
            kind: BindingKind::Mutable,
            state: BindingState::Set(Value::Undefined),
            pending: None,
            initialized: false,
        }
    }

    /// `const` without an initializer.
    #[must_use]
    pub const fn write_once() -> Self {
        BindingEntry {
            kind: BindingKind::Immutable,
            state: BindingState::Unset,
            pending: Some(Pending::WriteOnce),
            initialized: false,
        }
    }

    /// `const` with an initializer, before the initializer has run.
    #[must_use]
    pub const fn awaiting_initializer() -> Self {
        BindingEntry {
            kind: BindingKind::Immutable,
            state: BindingState::Unset,
            pending: Some(Pending::AwaitingInitializer),
            initialized: false,
        }
    }

    /// An entry that is `Set` and initialized from the start.
    #[must_use]
    pub const fn with_value(kind: BindingKind, value: Value) -> Self {
        BindingEntry {
            kind,
            state: BindingState::Set(value),
            pending: None,
            initialized: true,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> BindingKind {
        self.kind
    }

    #[must_use]
    pub const fn state(&self) -> &BindingState {
        &self.state
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.state.is_set()
    }

    /// Immutable entry created without an initializer.
    #[must_use]
    pub fn is_write_once(&self) -> bool {
        self.pending == Some(Pending::WriteOnce)
    }

    fn unbound(&self, name: &str) -> BindingError {
        let reason = if self.is_write_once() {
            UnboundReason::Unassigned
        } else {
            UnboundReason::BeforeDeclaration
        };
        BindingError::UnboundAccess {
            name: name.to_string(),
            reason,
        }
    }

    /// Clone for a copied record. Closures over the source record keep it
    /// alive from the copy.
    pub(crate) fn anchored_copy(&self) -> Self {
        let state = match &self.state {
            BindingState::Set(value) => BindingState::Set(value.clone().anchored()),
            BindingState::Unset => BindingState::Unset,
        };
        BindingEntry { state, ..*self }
    }

    pub(crate) fn initialize(&mut self, name: &str, value: Value) -> Result<(), BindingError> {
        let frozen = self.kind == BindingKind::Immutable && self.state.is_set();
        if self.initialized || frozen {
            return Err(BindingError::AlreadyInitialized {
                name: name.to_string(),
            });
        }
        self.initialized = true;
        self.state = BindingState::Set(value);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str, for_typeof: bool) -> Result<Value, BindingError> {
        match &self.state {
            BindingState::Set(value) => Ok(value.clone().anchored()),
            BindingState::Unset if for_typeof && self.is_write_once() => Ok(Value::Undefined),
            BindingState::Unset => Err(self.unbound(name)),
        }
    }

    pub(crate) fn set(&mut self, name: &str, value: Value) -> Result<(), BindingError> {
        match (self.kind, &self.state) {
            (BindingKind::Mutable, _) => {
                self.state = BindingState::Set(value);
                Ok(())
            }
            (BindingKind::Immutable, BindingState::Unset) if self.is_write_once() => {
                self.state = BindingState::Set(value);
                Ok(())
            }
            (BindingKind::Immutable, BindingState::Unset) => Err(self.unbound(name)),
            (BindingKind::Immutable, BindingState::Set(_)) => Err(BindingError::Reassignment {
                name: name.to_string(),
            }),
        }
    }
}
