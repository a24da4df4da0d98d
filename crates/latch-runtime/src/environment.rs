//! Environment records.
//!
//! One record holds the bindings of one scope instance and points at the
//! record of the enclosing scope. Records are shared through [`Env`]
//! (`Rc<EnvironmentRecord>`) by the frames executing in them and by every
//! closure handle created inside them. Parent links only point outward, and
//! a closure stored in a binding of the record it captured holds that record
//! weakly (see [`FunctionValue`](crate::value::FunctionValue)), so a record
//! is freed once its frames and escaped closures are gone.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::binding::{BindingEntry, BindingKind};
use crate::error::BindingError;
use crate::value::Value;

/// Shared handle to an environment record.
pub type Env = Rc<EnvironmentRecord>;

pub struct EnvironmentRecord {
    bindings: RefCell<FxHashMap<String, BindingEntry>>,
    outer: Option<Env>,
}

impl fmt::Debug for EnvironmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentRecord")
            .field("bindings", &self.binding_names())
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

impl EnvironmentRecord {
    /// The outermost record.
    #[must_use]
    pub fn new_global() -> Env {
        Rc::new(EnvironmentRecord {
            bindings: RefCell::new(FxHashMap::default()),
            outer: None,
        })
    }

    /// A fresh, empty record nested in `outer`.
    #[must_use]
    pub fn new_declarative(outer: &Env) -> Env {
        Rc::new(EnvironmentRecord {
            bindings: RefCell::new(FxHashMap::default()),
            outer: Some(Rc::clone(outer)),
        })
    }

    #[must_use]
    pub fn outer(&self) -> Option<&Env> {
        self.outer.as_ref()
    }

    #[must_use]
    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Declared names, sorted.
    #[must_use]
    pub fn binding_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn binding_kind(&self, name: &str) -> Option<BindingKind> {
        self.bindings.borrow().get(name).map(BindingEntry::kind)
    }

    /// Whether the entry holds a value; `None` if the name is absent.
    #[must_use]
    pub fn is_set(&self, name: &str) -> Option<bool> {
        self.bindings.borrow().get(name).map(BindingEntry::is_set)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn create(&self, name: &str, entry: BindingEntry) -> Result<(), BindingError> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(BindingError::DuplicateName {
                name: name.to_string(),
            });
        }
        trace!(binding = name, kind = ?entry.kind(), set = entry.is_set(), "create binding");
        bindings.insert(name.to_string(), entry);
        Ok(())
    }

    /// New mutable entry, `Set` to `undefined`.
    pub fn create_mutable_binding(&self, name: &str) -> Result<(), BindingError> {
        self.create(name, BindingEntry::mutable())
    }

    /// New immutable entry in state `Unset` that accepts exactly one write
    /// through [`set_mutable_binding`](Self::set_mutable_binding).
    pub fn create_immutable_binding(&self, name: &str) -> Result<(), BindingError> {
        self.create(name, BindingEntry::write_once())
    }

    /// New immutable entry whose value comes from an inline initializer.
    /// Until [`initialize_binding`](Self::initialize_binding) runs, reads
    /// and writes fail with `UnboundAccess`.
    pub fn create_immutable_binding_awaiting_initializer(
        &self,
        name: &str,
    ) -> Result<(), BindingError> {
        self.create(name, BindingEntry::awaiting_initializer())
    }

    /// Insert an entry that already holds `value`, replacing any previous
    /// entry of that name. Used for host-provided globals.
    pub fn define(&self, name: &str, kind: BindingKind, value: Value) {
        let entry = BindingEntry::with_value(kind, value.detach_from(self));
        self.bindings.borrow_mut().insert(name.to_string(), entry);
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Store the value of an inline initializer. At most once per entry.
    pub fn initialize_binding(&self, name: &str, value: Value) -> Result<(), BindingError> {
        let mut bindings = self.bindings.borrow_mut();
        let entry = bindings
            .get_mut(name)
            .ok_or_else(|| BindingError::MissingBinding {
                name: name.to_string(),
            })?;
        let result = entry.initialize(name, value.detach_from(self));
        debug_assert!(result.is_ok(), "binding '{name}' initialized twice");
        trace!(binding = name, "initialize binding");
        result
    }

    /// Read an entry. With `for_typeof`, an unwritten write-once entry reads
    /// as `undefined` instead of failing.
    pub fn get_binding_value(&self, name: &str, for_typeof: bool) -> Result<Value, BindingError> {
        let bindings = self.bindings.borrow();
        let entry = bindings
            .get(name)
            .ok_or_else(|| BindingError::MissingBinding {
                name: name.to_string(),
            })?;
        entry.get(name, for_typeof)
    }

    /// Assign to an entry: replaces a mutable value, commits the single write
    /// of a write-once entry, and rejects everything else.
    pub fn set_mutable_binding(&self, name: &str, value: Value) -> Result<(), BindingError> {
        let mut bindings = self.bindings.borrow_mut();
        let entry = bindings
            .get_mut(name)
            .ok_or_else(|| BindingError::MissingBinding {
                name: name.to_string(),
            })?;
        let committing_write_once = entry.is_write_once() && !entry.is_set();
        match entry.set(name, value.detach_from(self)) {
            Ok(()) => {
                if committing_write_once {
                    debug!(binding = name, "write-once binding committed");
                }
                Ok(())
            }
            Err(err) => {
                debug!(binding = name, error = %err, "binding write rejected");
                Err(err)
            }
        }
    }

    /// Copy of this record for the next loop iteration: same outer record,
    /// same entries, independent storage.
    #[must_use]
    pub fn copy_for_iteration(&self) -> Env {
        let bindings = self
            .bindings
            .borrow()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.anchored_copy()))
            .collect();
        Rc::new(EnvironmentRecord {
            bindings: RefCell::new(bindings),
            outer: self.outer.clone(),
        })
    }
}
