//! Environment records and the latch interpreter.
//!
//! The binding core is small:
//!
//! - [`binding`] - one entry's kind, state and transitions
//! - [`environment`] - records of entries and the five binding operations
//! - [`resolver`] - outward lookup along a record chain
//! - [`error`] - binding and runtime errors and their families
//!
//! Around it sit the pieces that drive it from source text:
//! [`installer`] replays binder scopes into fresh records, [`interpreter`]
//! evaluates statements and expressions, and [`program`] ties parsing,
//! binding and execution together.
//!
//! ```text
//! const settled;
//! print(typeof settled);          // undefined
//! queueMicrotask(function () { settled = 42; });
//! ```

pub mod binding;
pub mod environment;
pub mod error;
pub mod installer;
pub mod interpreter;
pub mod program;
pub mod resolver;
pub mod value;

pub use binding::{BindingEntry, BindingKind, BindingState};
pub use environment::{Env, EnvironmentRecord};
pub use error::{BindingError, ErrorFamily, RuntimeError, UnboundReason};
pub use interpreter::{Interpreter, RunReport, RuntimeOptions, UncaughtError};
pub use program::{Program, ProgramError};
pub use value::{Closure, ErrorValue, FunctionValue, NativeFunction, Value};

#[cfg(test)]
#[path = "../tests/binding_tests.rs"]
mod binding_tests;

#[cfg(test)]
#[path = "../tests/environment_tests.rs"]
mod environment_tests;

#[cfg(test)]
#[path = "../tests/interpreter_tests.rs"]
mod interpreter_tests;
